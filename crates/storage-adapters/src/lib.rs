//! lostfound/crates/storage-adapters/src/lib.rs
//!
//! `ItemRepository` implementations. The in-memory store is always built;
//! PostgreSQL is behind the `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::InMemoryItemRepository;
#[cfg(feature = "db-postgres")]
pub use postgres::PgItemRepository;
