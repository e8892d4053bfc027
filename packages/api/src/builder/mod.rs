//! Request builder modules
//!
//! The fluent API for building and executing resource queries.

pub mod core;
pub mod execute;
pub mod methods;

pub use self::core::*;
pub use self::execute::*;
