//! Request execution
//!
//! Runs the linear pipeline `Parse -> Query Execute -> Tree Assembly ->
//! PostProcess`. Any failure aborts the remaining stages; nothing is retried.

use std::fmt;
use std::time::Instant;

use resq_core::config::Validator;
use resq_core::error::ResqResult;
use resq_core::query::{Query, ResourceProvider};
use resq_core::resource::{IS_COLLECTION_PROPERTY, Request, Resource, ResultPostProcessor};
use resq_core::stats::QueryStatsSnapshot;
use resq_core::tree::TreeNode;

use crate::builder::core::{PredicateNotSet, PredicateSet, PredicateSource, RequestBuilder};

/// Pipeline stage, used in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    QueryExecute,
    TreeAssembly,
    PostProcess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Parse => "Parse",
            Stage::QueryExecute => "Query Execute",
            Stage::TreeAssembly => "Tree Assembly",
            Stage::PostProcess => "PostProcess",
        })
    }
}

/// Post-processed result of an executed request
#[derive(Debug)]
pub struct Response {
    pub request: Request,
    pub tree: TreeNode<Resource>,
    pub stats: QueryStatsSnapshot,
}

impl Response {
    /// Whether the request addressed a collection rather than one instance.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.tree
            .get_property(IS_COLLECTION_PROPERTY)
            .is_none_or(|value| value != "false")
    }

    /// Result nodes of the matching resources, in result order
    #[must_use]
    pub fn resources(&self) -> Vec<TreeNode<Resource>> {
        self.tree.children()
    }
}

impl RequestBuilder<'_, PredicateNotSet> {
    /// Execute without a user predicate.
    ///
    /// # Errors
    ///
    /// Returns configuration and field-list errors from the parse stage,
    /// provider and evaluation errors from query execution and
    /// post-processor errors.
    pub fn execute(self, provider: &dyn ResourceProvider) -> ResqResult<Response> {
        self.run(None, provider)
    }
}

impl RequestBuilder<'_, PredicateSet> {
    /// Execute with the chosen filter or predicate.
    ///
    /// # Errors
    ///
    /// Returns invalid-query, unknown-property and depth errors for the
    /// filter, plus everything [`RequestBuilder::execute`] can return
    /// without a predicate.
    pub fn execute(self, provider: &dyn ResourceProvider) -> ResqResult<Response> {
        self.run(Some(&self.state.source), provider)
    }
}

impl<S> RequestBuilder<'_, S> {
    fn run(
        &self,
        source: Option<&PredicateSource>,
        provider: &dyn ResourceProvider,
    ) -> ResqResult<Response> {
        let mut request = Request::new(self.base_href.as_str());
        if !self.fields.is_empty() {
            request = request.with_fields(self.fields.join(","));
        }

        let query = self.stage(Stage::Parse, || {
            self.config.validate()?;
            let mut query = Query::new(self.definition, self.config.clone());
            match source {
                Some(PredicateSource::Filter(filter)) => query.set_filter(filter)?,
                Some(PredicateSource::Built(predicate)) => query.set_predicate(predicate.clone())?,
                None => {}
            }
            for fields in &self.fields {
                query.add_fields(fields)?;
            }
            if let Some(page) = self.page {
                query.set_page(page);
            }
            query.set_minimal(self.minimal);
            Ok(query)
        })?;
        if let Some(predicate) = query.user_predicate() {
            request = request.with_filter(predicate.to_string());
        }

        let fetched = self.stage(Stage::QueryExecute, || query.fetch(provider))?;

        let result = self.stage(Stage::TreeAssembly, || {
            let result = fetched.assemble()?;
            if self.debug_enabled {
                log::debug!(
                    "resq: {} {} resource(s), {} scanned, {} sub-queries",
                    self.definition.plural_name(),
                    result.tree.child_count(),
                    result.stats.resources_scanned,
                    result.stats.sub_queries
                );
            }
            Ok(result)
        })?;

        self.stage(Stage::PostProcess, || {
            ResultPostProcessor::new(&request, self.definition).process(&result.tree)
        })?;

        Ok(Response {
            request,
            tree: result.tree,
            stats: result.stats,
        })
    }

    fn stage<T>(&self, stage: Stage, run: impl FnOnce() -> ResqResult<T>) -> ResqResult<T> {
        let started = Instant::now();
        let outcome = run();
        match &outcome {
            Ok(_) if self.debug_enabled => {
                log::debug!("resq: {stage} completed in {:?}", started.elapsed());
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!(
                    "resq: {stage} failed for {}: {error}",
                    self.definition.resource_type()
                );
            }
        }
        outcome
    }
}
