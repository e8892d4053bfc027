//! Query construction and execution
//!
//! A [`Query`] binds a user predicate and a projection to a resource
//! definition. Fetching asks the provider for candidates, re-evaluates the
//! full predicate on each and recurses into the requested sub-resources.
//! Assembly then turns the fetched results into a result tree: a root node
//! marked `isCollection`, one `<type>:<n>` child per matching resource, and
//! beneath each resource the result trees of its sub-resources.

use std::collections::BTreeMap;

use super::join;
use super::page::PageRequest;
use super::projection::Projection;
use super::provider::{ProviderRequest, ResourceProvider};
use super::result::{FetchedResults, QueryResult, ResultEntry, ResultSet};
use crate::config::{EngineConfig, Validator};
use crate::error::{
    ResqResult, depth_exceeded_error, invalid_query_error, unknown_property_error,
};
use crate::parser::PredicateParser;
use crate::predicate::Predicate;
use crate::property::{CATEGORY_SEPARATOR, PATH_SEPARATOR, PropertyId, is_valid_property_path, split_field_list};
use crate::resource::{Resource, ResourceDefinition};
use crate::stats::QueryStats;

/// Selects every property and every sub-resource
const ALL_FIELDS: &str = "*";

struct ExecutionContext<'p> {
    provider: &'p dyn ResourceProvider,
    stats: &'p QueryStats,
}

/// Query over one resource definition
#[derive(Debug, Clone)]
pub struct Query<'d> {
    definition: &'d ResourceDefinition,
    config: EngineConfig,
    user_predicate: Option<Predicate>,
    /// Sub-resources the user predicate references
    joined_sub_resources: Vec<String>,
    projection: Projection,
    explicit_projection: bool,
    sub_queries: Vec<(String, Query<'d>)>,
    page: Option<PageRequest>,
    minimal: bool,
}

/// Sub-resource of `definition` that `id` refers to, or `None` for a
/// property of the definition's own schema.
fn owning_sub_resource<'a>(
    definition: &'a ResourceDefinition,
    id: &PropertyId,
) -> ResqResult<Option<&'a str>> {
    let schema = definition.schema();
    if schema.contains(id) {
        return Ok(None);
    }
    for (name, sub_definition) in definition.sub_resources() {
        if let Some(stripped) = id.strip_prefix(name) {
            if owning_sub_resource(sub_definition, &stripped).is_ok() {
                return Ok(Some(name.as_str()));
            }
        }
    }
    Err(unknown_property_error(id, schema.resource_type()))
}

impl<'d> Query<'d> {
    #[must_use]
    pub fn new(definition: &'d ResourceDefinition, config: EngineConfig) -> Self {
        Self {
            definition,
            config,
            user_predicate: None,
            joined_sub_resources: Vec::new(),
            projection: Projection::default(),
            explicit_projection: false,
            sub_queries: Vec::new(),
            page: None,
            minimal: false,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &'d ResourceDefinition {
        self.definition
    }

    /// Parse `filter` and use it as the user predicate.
    ///
    /// # Errors
    ///
    /// Returns the parser's invalid-query, depth or configuration errors,
    /// and the unknown-property errors of [`Self::set_predicate`].
    pub fn set_filter(&mut self, filter: &str) -> ResqResult<()> {
        let predicate = PredicateParser::new(&self.config).parse(filter)?;
        self.set_predicate(predicate)
    }

    /// Use `predicate` as the user predicate.
    ///
    /// A property prefixed with a sub-resource name, such as
    /// `components/ServiceComponentInfo/state`, refers to that sub-resource.
    /// The sub-resource is added to the query, the part of the predicate
    /// that only constrains it narrows its results, and a resource matches
    /// when the predicate holds for it joined with any of its sub-resource
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns an unknown-property error for a property that is neither in
    /// the schema nor in a sub-resource's schema.
    pub fn set_predicate(&mut self, predicate: Predicate) -> ResqResult<()> {
        let definition = self.definition;
        let mut joined: Vec<String> = Vec::new();
        for id in join::leaf_ids(&predicate) {
            if let Some(name) = owning_sub_resource(definition, id)? {
                if !joined.iter().any(|existing| existing == name) {
                    joined.push(name.to_string());
                }
            }
        }

        for name in &joined {
            let Some(sub_definition) = definition.sub_resource(name) else {
                continue;
            };
            let sub_predicate = join::sub_resource_predicate(&predicate, name);
            let sub_query = self.sub_query_entry(name, sub_definition);
            if let Some(sub_predicate) = sub_predicate {
                sub_query.set_predicate(sub_predicate)?;
            }
        }

        self.joined_sub_resources = joined;
        self.user_predicate = Some(predicate);
        Ok(())
    }

    #[must_use]
    pub fn user_predicate(&self) -> Option<&Predicate> {
        self.user_predicate.as_ref()
    }

    pub fn set_page(&mut self, page: PageRequest) {
        self.page = Some(page);
    }

    /// In minimal mode foreign keys are not added to the projection.
    pub fn set_minimal(&mut self, minimal: bool) {
        self.minimal = minimal;
        for (_, sub_query) in &mut self.sub_queries {
            sub_query.set_minimal(minimal);
        }
    }

    /// Add every entry of a comma-separated field list.
    ///
    /// # Errors
    ///
    /// See [`Self::add_property`].
    pub fn add_fields(&mut self, fields: &str) -> ResqResult<()> {
        for field in split_field_list(fields) {
            self.add_property(field)?;
        }
        Ok(())
    }

    /// Add one partial-response field.
    ///
    /// `*` selects all properties and all sub-resources, `category/*` selects
    /// a category, and a path whose first segment names a sub-resource is
    /// routed to that sub-resource's query. Anything else must name a
    /// property or category of the schema.
    ///
    /// # Errors
    ///
    /// Returns an invalid-query error for malformed paths and an
    /// unknown-property error for paths the schema does not define.
    pub fn add_property(&mut self, path: &str) -> ResqResult<()> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(());
        }

        if path == ALL_FIELDS {
            self.explicit_projection = true;
            self.projection.set_all_properties();
            let definition = self.definition;
            for (name, sub_definition) in definition.sub_resources() {
                self.sub_query_entry(name, sub_definition);
            }
            return Ok(());
        }

        let (first, rest) = match path.split_once(PATH_SEPARATOR) {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };
        let definition = self.definition;
        if let Some(sub_definition) = definition.sub_resource(first) {
            let sub_query = self.sub_query_entry(first, sub_definition);
            if let Some(rest) = rest {
                sub_query.add_property(rest)?;
            }
            return Ok(());
        }

        let schema = definition.schema();
        if let Some(category_path) = path.strip_suffix("/*") {
            if !is_valid_property_path(category_path) {
                return Err(invalid_query_error(path, "invalid field path", None));
            }
            let category = category_path.replace(PATH_SEPARATOR, &CATEGORY_SEPARATOR.to_string());
            if !schema.has_category(&category) {
                return Err(unknown_property_error(category_path, schema.resource_type()));
            }
            self.explicit_projection = true;
            self.projection.add_category(category);
            return Ok(());
        }

        if !is_valid_property_path(path) {
            return Err(invalid_query_error(path, "invalid field path", None));
        }

        let id = PropertyId::from_path(path);
        self.explicit_projection = true;
        if schema.contains(&id) {
            self.projection.add_property(id);
            return Ok(());
        }

        // A bare path may also name a whole category.
        let category = path.replace(PATH_SEPARATOR, &CATEGORY_SEPARATOR.to_string());
        if schema.has_category(&category) {
            self.projection.add_category(category);
            return Ok(());
        }

        Err(unknown_property_error(path, schema.resource_type()))
    }

    fn sub_query_entry(&mut self, name: &str, definition: &'d ResourceDefinition) -> &mut Query<'d> {
        let index = match self.sub_queries.iter().position(|(existing, _)| existing == name) {
            Some(index) => index,
            None => {
                let sub_query = self.key_only_sub_query(definition);
                self.sub_queries.push((name.to_string(), sub_query));
                self.sub_queries.len() - 1
            }
        };
        &mut self.sub_queries[index].1
    }

    /// Sub-resource query returning only keys until fields are added to it.
    fn key_only_sub_query(&self, definition: &'d ResourceDefinition) -> Query<'d> {
        let mut sub_query = Query::new(definition, self.config.clone());
        sub_query.minimal = self.minimal;
        sub_query.explicit_projection = true;
        sub_query
    }

    /// An instance request without fields expands every sub-resource with
    /// its keys.
    fn expands_sub_resources(&self) -> bool {
        !self.explicit_projection && self.sub_queries.is_empty() && !self.definition.is_collection()
    }

    fn default_sub_queries(&self) -> Vec<(String, Query<'d>)> {
        let definition = self.definition;
        definition
            .sub_resources()
            .iter()
            .map(|(name, sub_definition)| (name.clone(), self.key_only_sub_query(sub_definition)))
            .collect()
    }

    /// Sub-resource query requested under `name`
    #[must_use]
    pub fn sub_query(&self, name: &str) -> Option<&Query<'d>> {
        self.sub_queries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, query)| query)
    }

    /// Names of the requested sub-resources, in request order
    pub fn sub_query_names(&self) -> impl Iterator<Item = &str> {
        self.sub_queries.iter().map(|(name, _)| name.as_str())
    }

    /// The projection execution uses.
    ///
    /// Without requested fields an instance request returns all properties
    /// and a collection request only key properties. The own key is always
    /// included, foreign keys unless in minimal mode.
    #[must_use]
    pub fn effective_projection(&self) -> Projection {
        let mut projection = if self.explicit_projection {
            self.projection.clone()
        } else if self.definition.is_collection() {
            Projection::default()
        } else {
            Projection::all()
        };

        let schema = self.definition.schema();
        if let Some(key) = schema.own_key() {
            projection.add_property(key.clone());
        }
        if !self.minimal {
            for (_, id) in schema.foreign_keys() {
                projection.add_property(id.clone());
            }
        }
        projection
    }

    /// Full predicate of this query: identity and parent key EQUALS leaves
    /// AND-ed with the user predicate.
    #[must_use]
    pub fn internal_predicate(&self, inherited_keys: &BTreeMap<String, String>) -> Option<Predicate> {
        let mut leaves = self.key_leaves(inherited_keys);
        if let Some(user) = &self.user_predicate {
            leaves.push(user.clone());
        }
        conjunction(leaves)
    }

    fn key_leaves(&self, inherited_keys: &BTreeMap<String, String>) -> Vec<Predicate> {
        let schema = self.definition.schema();
        let mut leaves: Vec<Predicate> = self
            .definition
            .identity()
            .iter()
            .map(|(id, value)| Predicate::equals(id.clone(), value.clone()))
            .collect();

        for (parent_type, value) in self.parent_keys(inherited_keys) {
            match schema.key_property_id(&parent_type) {
                Some(id) => leaves.push(Predicate::equals(id.clone(), value)),
                None => tracing::trace!(
                    target: "resq::query",
                    resource_type = schema.resource_type(),
                    parent_type = %parent_type,
                    "no foreign key for parent type"
                ),
            }
        }
        leaves
    }

    fn parent_keys(&self, inherited_keys: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut keys = self.definition.parent_keys().clone();
        keys.extend(
            inherited_keys
                .iter()
                .map(|(parent_type, value)| (parent_type.clone(), value.clone())),
        );
        keys
    }

    /// Execute against `provider` and assemble the result tree.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch`] and [`FetchedResults::assemble`].
    pub fn execute(&self, provider: &dyn ResourceProvider) -> ResqResult<QueryResult> {
        self.fetch(provider)?.assemble()
    }

    /// Fetch the matching resources and their sub-resources from `provider`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid configuration, provider
    /// errors, evaluation type errors raised while re-applying the
    /// predicate, and a depth error when sub-resources nest beyond the
    /// configured bound.
    pub fn fetch(&self, provider: &dyn ResourceProvider) -> ResqResult<FetchedResults> {
        self.config.validate()?;
        let stats = QueryStats::new();
        let context = ExecutionContext {
            provider,
            stats: &stats,
        };
        let results = self.fetch_at(&context, &BTreeMap::new(), 0)?;
        Ok(FetchedResults {
            results,
            stats: stats.snapshot(),
        })
    }

    fn fetch_at(
        &self,
        context: &ExecutionContext<'_>,
        inherited_keys: &BTreeMap<String, String>,
        depth: usize,
    ) -> ResqResult<ResultSet> {
        if depth > self.config.max_tree_depth {
            return Err(depth_exceeded_error("result tree nesting", self.config.max_tree_depth));
        }

        let resource_type = self.definition.resource_type();
        let predicate = self.internal_predicate(inherited_keys);
        let projection = self.effective_projection();

        // Sub-resource leaves cannot be evaluated on the provider's records.
        let key_predicate;
        let provider_predicate = if self.joined_sub_resources.is_empty() {
            predicate.as_ref()
        } else {
            key_predicate = conjunction(self.key_leaves(inherited_keys));
            key_predicate.as_ref()
        };
        let candidates = context.provider.get_resources(&ProviderRequest {
            resource_type,
            predicate: provider_predicate,
            projection: &projection,
        })?;

        let defaults;
        let sub_queries = if self.expands_sub_resources() {
            defaults = self.default_sub_queries();
            defaults.as_slice()
        } else {
            self.sub_queries.as_slice()
        };
        let parent_keys = self.parent_keys(inherited_keys);

        let mut matched = Vec::new();
        for resource in candidates {
            context.stats.record_scanned();
            let sub_results = if self.joined_sub_resources.is_empty() {
                None
            } else {
                Some(self.fetch_sub_resources(context, sub_queries, &resource, &parent_keys, depth)?)
            };

            let outcome = match (&predicate, &sub_results) {
                (None, _) => Ok(true),
                (Some(predicate), None) => predicate.evaluate(&resource),
                (Some(predicate), Some(sub_results)) => {
                    let rows = join::joined_rows(sub_results, &self.joined_sub_resources);
                    join::matches_any_row(predicate, &resource, &rows)
                }
            };
            if outcome.inspect_err(|_| context.stats.record_evaluation_error())? {
                context.stats.record_matched();
                matched.push((resource, sub_results));
            }
        }
        let matched = match self.page {
            Some(page) => page.apply(matched),
            None => matched,
        };

        let mut entries = Vec::with_capacity(matched.len());
        for (resource, sub_results) in matched {
            let sub_results = match sub_results {
                Some(sub_results) => sub_results,
                None => self.fetch_sub_resources(context, sub_queries, &resource, &parent_keys, depth)?,
            };
            entries.push(ResultEntry {
                resource,
                sub_results,
            });
        }

        tracing::debug!(
            target: "resq::query",
            resource_type,
            depth,
            matched = entries.len(),
            "fetched resources"
        );
        Ok(ResultSet::new(
            resource_type,
            self.definition.is_collection(),
            projection,
            self.joined_sub_resources.clone(),
            entries,
        ))
    }

    fn fetch_sub_resources(
        &self,
        context: &ExecutionContext<'_>,
        sub_queries: &[(String, Query<'d>)],
        resource: &Resource,
        parent_keys: &BTreeMap<String, String>,
        depth: usize,
    ) -> ResqResult<Vec<(String, ResultSet)>> {
        if sub_queries.is_empty() {
            return Ok(Vec::new());
        }

        let resource_type = self.definition.resource_type();
        let key_value = self
            .definition
            .schema()
            .own_key()
            .and_then(|key| resource.get_property(key));
        let Some(value) = key_value else {
            tracing::warn!(
                target: "resq::query",
                resource_type,
                "resource has no key value, skipping sub-resources"
            );
            return Ok(Vec::new());
        };

        let mut keys = parent_keys.clone();
        keys.insert(resource_type.to_string(), value.to_string());

        let mut results = Vec::with_capacity(sub_queries.len());
        for (name, sub_query) in sub_queries {
            context.stats.record_sub_query();
            results.push((name.clone(), sub_query.fetch_at(context, &keys, depth + 1)?));
        }
        Ok(results)
    }
}

fn conjunction(leaves: Vec<Predicate>) -> Option<Predicate> {
    if leaves.is_empty() {
        None
    } else {
        Some(Predicate::and(leaves))
    }
}
