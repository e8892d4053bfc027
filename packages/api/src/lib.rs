//! resq public API
//!
//! Fluent request pipeline over the `resq_core` query engine. A request is
//! built against a [`ResourceDefinition`], optionally filtered, projected and
//! paged, then executed against a [`ResourceProvider`]:
//!
//! ```
//! use std::sync::Arc;
//! use resq::{InMemoryProvider, Resource, ResourceDefinition, ResourceSchema, Resq};
//!
//! let schema = ResourceSchema::builder("service")
//!     .key_property("ServiceInfo/service_name")
//!     .property("ServiceInfo/state")
//!     .build();
//! let services = ResourceDefinition::new(Arc::new(schema), "services", "service");
//! let provider = InMemoryProvider::new()
//!     .with(Resource::new("service").with("ServiceInfo/service_name", "HDFS").with("ServiceInfo/state", "STARTED"))
//!     .with(Resource::new("service").with("ServiceInfo/service_name", "YARN").with("ServiceInfo/state", "INSTALLED"));
//!
//! let response = Resq::request(&services)
//!     .href("http://localhost:8080/api/v1/services")
//!     .fields("ServiceInfo/state")
//!     .filter("ServiceInfo/state=STARTED")
//!     .execute(&provider)
//!     .unwrap();
//!
//! assert_eq!(response.resources().len(), 1);
//! assert_eq!(
//!     response.resources()[0].get_property("href").as_deref(),
//!     Some("http://localhost:8080/api/v1/services/HDFS")
//! );
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::{PredicateNotSet, PredicateSet, RequestBuilder, Response, Stage};

// Engine modules and the canonical types
pub use resq_core::prelude::*;
pub use resq_core::{config, error, parser, predicate, property, query, resource, stats, tree};

/// Main resq entry point
pub struct Resq;

impl Resq {
    /// Start a request against `definition` with the default configuration.
    #[must_use]
    pub fn request(definition: &ResourceDefinition) -> RequestBuilder<'_> {
        RequestBuilder::new(definition)
    }
}

/// Start a request against `definition`
///
/// Shorthand for `Resq::request(definition)`
#[must_use]
pub fn request(definition: &ResourceDefinition) -> RequestBuilder<'_> {
    RequestBuilder::new(definition)
}
