//! Predicate selection
//!
//! A request carries at most one user predicate, given either as filter text
//! (parsed against the resource schema when the request executes) or as a
//! predicate built in code.

use resq_core::predicate::Predicate;

use crate::builder::core::{PredicateNotSet, PredicateSet, PredicateSource, RequestBuilder};

impl<'d> RequestBuilder<'d, PredicateNotSet> {
    /// Filter matching resources with a filter expression
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use resq::{ResourceDefinition, ResourceSchema, Resq};
    ///
    /// let schema = ResourceSchema::builder("host").key_property("Hosts/host_name").build();
    /// let hosts = ResourceDefinition::new(Arc::new(schema), "hosts", "host");
    /// let builder = Resq::request(&hosts).filter("Hosts/host_name IN (h1,h2)");
    /// ```
    #[must_use]
    pub fn filter(self, filter: &str) -> RequestBuilder<'d, PredicateSet> {
        if self.debug_enabled {
            log::debug!("resq: filter {filter}");
        }
        self.with_state(PredicateSet {
            source: PredicateSource::Filter(filter.to_string()),
        })
    }

    /// Filter matching resources with a predicate built in code.
    ///
    /// The request records the predicate's filter form.
    #[must_use]
    pub fn predicate(self, predicate: Predicate) -> RequestBuilder<'d, PredicateSet> {
        if self.debug_enabled {
            log::debug!("resq: predicate {predicate}");
        }
        self.with_state(PredicateSet {
            source: PredicateSource::Built(predicate),
        })
    }
}
