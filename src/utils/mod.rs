//! Utility modules

pub mod json_storage;
pub mod memory_storage;

pub use json_storage::*;
pub use memory_storage::*;
