//! Business logic services for the retail stock service

pub mod code_generator;
pub mod inventory;
pub mod sales;

pub use code_generator::CodeGenerator;
pub use inventory::InventoryService;
pub use sales::SalesService;
