//! Rule engine: field validation and search pattern compilation

pub mod search;
pub mod validation;

pub use search::*;
pub use validation::*;
