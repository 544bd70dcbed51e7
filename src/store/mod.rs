//! Store module: the reactive container and its derived computations

pub mod core;
pub mod stats;
pub mod view;

pub use core::*;
pub use stats::*;
pub use view::*;
