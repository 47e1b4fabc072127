//! HTTP request handlers

pub mod codes;
pub mod health;
pub mod inventory;
pub mod sales;

pub use codes::*;
pub use health::*;
pub use inventory::*;
pub use sales::*;
