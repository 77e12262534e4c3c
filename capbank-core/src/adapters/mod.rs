//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the gateway ports
//! - JSON file and in-memory stores for the SessionStore port
//! - A mock CapBank server for adapter tests

pub mod http;
pub mod memory;
pub mod session_file;

#[cfg(test)]
pub mod mock_bank;
