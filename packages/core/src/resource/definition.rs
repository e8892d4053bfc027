//! Resource definitions
//!
//! A definition binds a static schema to the key values of one request: the
//! identity of the addressed instance (empty for collection requests), the
//! keys of the parent resources it is nested under, the sub-resources that may
//! be expanded beneath each instance and the post-processors that annotate
//! result nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::post_process::{PostProcessor, href_post_processor};
use super::schema::ResourceSchema;
use crate::config::EngineConfig;
use crate::property::PropertyId;
use crate::query::Query;

/// Schema plus per-request key values for one resource type
#[derive(Clone)]
pub struct ResourceDefinition {
    schema: Arc<ResourceSchema>,
    plural_name: String,
    singular_name: String,
    identity: BTreeMap<PropertyId, String>,
    parent_keys: BTreeMap<String, String>,
    sub_resources: Vec<(String, ResourceDefinition)>,
    post_processors: Vec<PostProcessor>,
}

impl ResourceDefinition {
    /// New definition with the `href` post-processor registered.
    #[must_use]
    pub fn new(
        schema: Arc<ResourceSchema>,
        plural_name: impl Into<String>,
        singular_name: impl Into<String>,
    ) -> Self {
        Self {
            schema,
            plural_name: plural_name.into(),
            singular_name: singular_name.into(),
            identity: BTreeMap::new(),
            parent_keys: BTreeMap::new(),
            sub_resources: Vec::new(),
            post_processors: vec![href_post_processor()],
        }
    }

    /// Address a single instance by its own key value.
    ///
    /// Ignored when the schema declares no own key.
    #[must_use]
    pub fn with_id(mut self, value: impl Into<String>) -> Self {
        if let Some(key) = self.schema.own_key().cloned() {
            self.identity.insert(key, value.into());
        }
        self
    }

    /// Add an identity entry for an arbitrary property.
    #[must_use]
    pub fn with_identity(mut self, id: PropertyId, value: impl Into<String>) -> Self {
        self.identity.insert(id, value.into());
        self
    }

    /// Record the key value of the parent resource of `parent_type`.
    #[must_use]
    pub fn with_parent_key(mut self, parent_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.parent_keys.insert(parent_type.into(), value.into());
        self
    }

    /// Register a sub-resource under `name`; registration order is kept.
    #[must_use]
    pub fn with_sub_resource(mut self, name: impl Into<String>, definition: ResourceDefinition) -> Self {
        let name = name.into();
        self.sub_resources.retain(|(existing, _)| *existing != name);
        self.sub_resources.push((name, definition));
        self
    }

    /// Append a post-processor to the chain.
    #[must_use]
    pub fn with_post_processor(mut self, processor: PostProcessor) -> Self {
        self.post_processors.push(processor);
        self
    }

    /// Drop every registered post-processor, including the default `href` one.
    #[must_use]
    pub fn without_post_processors(mut self) -> Self {
        self.post_processors.clear();
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<ResourceSchema> {
        &self.schema
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.schema.resource_type()
    }

    #[must_use]
    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    #[must_use]
    pub fn singular_name(&self) -> &str {
        &self.singular_name
    }

    #[must_use]
    pub fn identity(&self) -> &BTreeMap<PropertyId, String> {
        &self.identity
    }

    #[must_use]
    pub fn parent_keys(&self) -> &BTreeMap<String, String> {
        &self.parent_keys
    }

    /// A definition with no identity addresses the whole collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.identity.is_empty()
    }

    #[must_use]
    pub fn sub_resources(&self) -> &[(String, ResourceDefinition)] {
        &self.sub_resources
    }

    #[must_use]
    pub fn sub_resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.sub_resources
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, definition)| definition)
    }

    /// Post-processors in registration order
    #[must_use]
    pub fn post_processors(&self) -> &[PostProcessor] {
        &self.post_processors
    }

    /// Fresh query over this definition.
    #[must_use]
    pub fn query(&self, config: &EngineConfig) -> Query<'_> {
        Query::new(self, config.clone())
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("resource_type", &self.resource_type())
            .field("plural_name", &self.plural_name)
            .field("identity", &self.identity)
            .field("parent_keys", &self.parent_keys)
            .field(
                "sub_resources",
                &self.sub_resources.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("post_processors", &self.post_processors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_definition() -> ResourceDefinition {
        let schema = Arc::new(
            ResourceSchema::builder("service")
                .key_property("ServiceInfo/service_name")
                .parent_key("cluster", "ServiceInfo/cluster_name")
                .build(),
        );
        let components = Arc::new(
            ResourceSchema::builder("component")
                .key_property("ServiceComponentInfo/component_name")
                .build(),
        );
        ResourceDefinition::new(schema, "services", "service")
            .with_parent_key("cluster", "c1")
            .with_sub_resource("components", ResourceDefinition::new(components, "components", "component"))
    }

    #[test]
    fn test_collection_versus_instance() {
        let services = service_definition();
        assert!(services.is_collection());

        let hdfs = services.with_id("HDFS");
        assert!(!hdfs.is_collection());
        assert_eq!(
            hdfs.identity().get(&PropertyId::from_path("ServiceInfo/service_name")),
            Some(&"HDFS".to_string())
        );
    }

    #[test]
    fn test_sub_resources_keep_registration_order() {
        let schema = Arc::new(ResourceSchema::builder("x").build());
        let definition = service_definition()
            .with_sub_resource("alerts", ResourceDefinition::new(schema.clone(), "alerts", "alert"))
            .with_sub_resource("configs", ResourceDefinition::new(schema, "configs", "config"));
        let names: Vec<&str> = definition.sub_resources().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["components", "alerts", "configs"]);
        assert_eq!(definition.sub_resource("alerts").unwrap().singular_name(), "alert");
    }

    #[test]
    fn test_default_post_processor_chain() {
        let definition = service_definition();
        assert_eq!(definition.post_processors().len(), 1);
        assert!(definition.without_post_processors().post_processors().is_empty());
    }
}
