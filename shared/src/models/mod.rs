//! Domain models for the retail stock service

mod inventory;
mod movement;
mod sale;

pub use inventory::*;
pub use movement::*;
pub use sale::*;
