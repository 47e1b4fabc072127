//! Shared types and rules for the retail stock service
//!
//! This crate contains the inventory domain shared between the backend,
//! the dashboard (via WASM), and the test suites.

pub mod codes;
pub mod models;
pub mod requests;
pub mod stock;
pub mod validation;

pub use codes::*;
pub use models::*;
pub use requests::*;
pub use stock::*;
pub use validation::*;
