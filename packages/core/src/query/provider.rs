//! Resource provider seam
//!
//! The query engine does not know where resources come from. A provider is
//! handed the resource type, the full predicate and the projection, and
//! returns candidate records; the engine re-applies the predicate to every
//! record it gets back, so providers may pre-filter as much or as little as
//! they like.

use hashbrown::HashMap;

use super::projection::Projection;
use crate::error::ResqResult;
use crate::predicate::Predicate;
use crate::resource::Resource;

/// What a query asks a provider for
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub resource_type: &'a str,
    pub predicate: Option<&'a Predicate>,
    pub projection: &'a Projection,
}

/// Source of resource records
pub trait ResourceProvider {
    /// Candidate resources of `request.resource_type`.
    ///
    /// # Errors
    ///
    /// Implementations report backend failures as provider errors.
    fn get_resources(&self, request: &ProviderRequest<'_>) -> ResqResult<Vec<Resource>>;
}

/// Provider over records held in memory, in insertion order per type
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    resources: HashMap<String, Vec<Resource>>,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Resource) {
        self.resources
            .entry(resource.resource_type().to_string())
            .or_default()
            .push(resource);
    }

    #[must_use]
    pub fn with(mut self, resource: Resource) -> Self {
        self.insert(resource);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryProvider {
    fn get_resources(&self, request: &ProviderRequest<'_>) -> ResqResult<Vec<Resource>> {
        let Some(resources) = self.resources.get(request.resource_type) else {
            return Ok(Vec::new());
        };

        // Records the predicate cannot be evaluated on are passed through so
        // the engine reports the type error.
        Ok(resources
            .iter()
            .filter(|resource| {
                request
                    .predicate
                    .is_none_or(|predicate| predicate.evaluate(*resource).unwrap_or(true))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_in_memory_prefilters_by_type_and_predicate() {
        let provider = InMemoryProvider::new()
            .with(Resource::new("host").with("Hosts/host_name", "h1"))
            .with(Resource::new("host").with("Hosts/host_name", "h2"))
            .with(Resource::new("cluster").with("Clusters/cluster_name", "c1"));
        assert_eq!(provider.len(), 3);

        let predicate = parse("Hosts/host_name=h2").unwrap();
        let projection = Projection::all();
        let found = provider
            .get_resources(&ProviderRequest {
                resource_type: "host",
                predicate: Some(&predicate),
                projection: &projection,
            })
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = provider
            .get_resources(&ProviderRequest {
                resource_type: "service",
                predicate: None,
                projection: &projection,
            })
            .unwrap();
        assert!(none.is_empty());
    }
}
