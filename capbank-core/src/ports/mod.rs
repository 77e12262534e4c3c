//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod gateway;
mod session_store;

pub use gateway::{AccountGateway, AuthGateway, BankGateway, TransactionGateway, UserGateway};
pub use session_store::SessionStore;
