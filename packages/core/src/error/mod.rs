//! Query engine error handling module
//!
//! Error types, constructor functions and conversions for every stage of the
//! request pipeline: filter parsing, schema checks, predicate evaluation,
//! document flattening and tree assembly.

pub mod constructors;
mod conversions;
mod types;

pub use constructors::{
    depth_exceeded_error, document_parse_error, evaluation_type_error, invalid_query_error,
    invalid_tree_error, provider_error, unknown_property_error,
};
pub use types::{ErrorKind, ResqError, ResqResult};
