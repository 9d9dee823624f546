//! lostfound/crates/services/src/lib.rs
//!
//! Application services: the claim lifecycle, the item catalogue and the
//! expiration sweep. Everything here talks to storage and email only through
//! the ports in `domains`.

pub mod atomic;
pub mod claims;
pub mod delivery;
pub mod items;
pub mod metrics;
pub mod scheduler;
pub mod sweep;

pub use claims::{ClaimReceipt, ClaimService};
pub use delivery::DeliveryService;
pub use items::{ItemService, RECENT_LIMIT};
pub use metrics::SweepMetrics;
pub use scheduler::{ExpirationScheduler, SchedulerHandle, DEFAULT_INTERVAL};
pub use sweep::{ExpirationSweeper, SweepReport};
