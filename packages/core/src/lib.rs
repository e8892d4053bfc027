//! # resq core
//!
//! Predicate-based resource query engine. A textual filter expression is
//! parsed into a [`predicate::Predicate`], evaluated against flattened
//! resource property maps, and matching resources are assembled into a
//! generic [`tree::TreeNode`] result tree that post-processors annotate.
//!
//! ## Features
//!
//! - **Filter expressions** with `AND`, `OR`, `NOT`, parentheses, relational
//!   operators and `IN` lists, parsed by operator precedence
//! - **Fluent predicate builder** producing the same shapes as the parser
//! - **Document flattening** of nested JSON into `PropertyId -> value` maps
//! - **Partial responses** through field-list projections routed to
//!   sub-resources
//! - **Bounded recursion** in the parser, the flattener and tree assembly
//!
//! ## Usage
//!
//! ```
//! use resq_core::parser::parse;
//! use resq_core::property::flatten_str;
//!
//! let predicate = parse("Services/state=STARTED AND Services/version IN (2.1,2.2)").unwrap();
//! let properties = flatten_str(r#"{"Services": {"state": "STARTED", "version": "2.2"}}"#).unwrap();
//! assert!(predicate.evaluate(&properties).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod parser;
pub mod predicate;
pub mod prelude;
pub mod property;
pub mod query;
pub mod resource;
pub mod stats;
pub mod tokenizer;
pub mod tokens;
pub mod tree;

pub use error::{ErrorKind, ResqError, ResqResult};
