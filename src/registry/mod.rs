//! # Registry Infrastructure
//!
//! Shared directories consulted while loads are in flight.
//!
//! - [`QueryRegistry`]: load id → live coordinator handle, for status
//!   queries and cancellation by external observers

pub mod query_registry;

pub use query_registry::{QueryRegistry, RegistrationGuard, RegistryStats};
