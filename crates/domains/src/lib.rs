//! lostfound/crates/domains/src/lib.rs
//!
//! Domain types, lifecycle rules and ports for the lost-and-found portal.

pub mod clock;
pub mod error;
pub mod identity;
pub mod models;
pub mod notification;
pub mod traits;
pub mod validation;
pub mod window;

// Re-exporting for easier access in other crates
pub use clock::*;
pub use error::*;
pub use identity::*;
pub use models::*;
pub use notification::*;
pub use traits::*;
pub use window::*;
