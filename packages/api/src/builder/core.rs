//! Core `RequestBuilder` structures and base functionality
//!
//! Contains the builder struct, its predicate state markers and the setters
//! shared by every state.

use std::fmt;

use resq_core::config::EngineConfig;
use resq_core::predicate::Predicate;
use resq_core::query::PageRequest;
use resq_core::resource::ResourceDefinition;

/// State marker indicating no filter or predicate has been set
#[derive(Debug, Clone, Copy)]
pub struct PredicateNotSet;

/// State marker holding the filter text or built predicate
#[derive(Debug, Clone)]
pub struct PredicateSet {
    pub(crate) source: PredicateSource,
}

#[derive(Debug, Clone)]
pub(crate) enum PredicateSource {
    Filter(String),
    Built(Predicate),
}

/// Request builder over one resource definition
///
/// Type parameter `S` tracks the predicate state:
/// - `PredicateNotSet`: Default state, `filter()` and `predicate()` available
/// - `PredicateSet`: A predicate has been chosen, only setters and execution remain
#[derive(Clone)]
pub struct RequestBuilder<'d, S = PredicateNotSet> {
    pub(crate) definition: &'d ResourceDefinition,
    pub(crate) config: EngineConfig,
    pub(crate) base_href: String,
    pub(crate) fields: Vec<String>,
    pub(crate) page: Option<PageRequest>,
    pub(crate) minimal: bool,
    pub(crate) debug_enabled: bool,
    pub(crate) state: S,
}

impl<'d> RequestBuilder<'d, PredicateNotSet> {
    /// Start building a request; the base href defaults to `/<plural name>`.
    #[must_use]
    pub fn new(definition: &'d ResourceDefinition) -> Self {
        Self {
            definition,
            config: EngineConfig::default(),
            base_href: format!("/{}", definition.plural_name()),
            fields: Vec::new(),
            page: None,
            minimal: false,
            debug_enabled: false,
            state: PredicateNotSet,
        }
    }
}

impl<'d, S> RequestBuilder<'d, S> {
    /// Log each pipeline stage at debug level.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Engine limits for this request; checked when the request executes.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Base href the result tree's hrefs are derived from.
    #[must_use]
    pub fn href(mut self, base_href: &str) -> Self {
        self.base_href = base_href.to_string();
        self
    }

    /// Append a comma-separated partial-response field list.
    #[must_use]
    pub fn fields(mut self, fields: &str) -> Self {
        if !fields.trim().is_empty() {
            self.fields.push(fields.to_string());
        }
        self
    }

    #[must_use]
    pub fn page(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.page = Some(PageRequest::new(offset, limit));
        self
    }

    /// Only the first `limit` matching resources.
    #[must_use]
    pub fn first(mut self, limit: usize) -> Self {
        self.page = Some(PageRequest::first(limit));
        self
    }

    /// Leave foreign keys out of the projection.
    #[must_use]
    pub fn minimal(mut self) -> Self {
        self.minimal = true;
        self
    }

    #[must_use]
    pub fn definition(&self) -> &'d ResourceDefinition {
        self.definition
    }

    pub(crate) fn with_state<T>(self, state: T) -> RequestBuilder<'d, T> {
        RequestBuilder {
            definition: self.definition,
            config: self.config,
            base_href: self.base_href,
            fields: self.fields,
            page: self.page,
            minimal: self.minimal,
            debug_enabled: self.debug_enabled,
            state,
        }
    }
}

impl<S> fmt::Debug for RequestBuilder<'_, S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("resource_type", &self.definition.resource_type())
            .field("config", &self.config)
            .field("base_href", &self.base_href)
            .field("fields", &self.fields)
            .field("page", &self.page)
            .field("minimal", &self.minimal)
            .field("debug_enabled", &self.debug_enabled)
            .field("state", &self.state)
            .finish()
    }
}
