//! # Storage Module
//!
//! Persistence for the portal: profiles, sessions, characters, the payment
//! log and news. The domain layer talks to the payment log through the
//! `PaymentStore` trait so the ledger can prefer a store's atomic procedures
//! and fall back to plain queries when they are missing. The remaining
//! repositories are concrete SQLite types.
//!
//! ## Current Implementation
//!
//! - **Primary Storage**: SQLite through SQLx, schema created on startup
//! - **Referential integrity**: deleting a profile cascades to its sessions,
//!   characters and their payment rows
//! - **Timestamps**: fixed-width RFC 3339 UTC text, so SQL range filters
//!   compare correctly as strings

pub mod connection;
pub mod repositories;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{
    CharacterRepository, NewsRepository, PaymentRepository, ProfileRepository, SessionRepository,
};
pub use traits::{AtomicIncrement, PaymentStore, StoreError};
