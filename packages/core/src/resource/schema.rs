//! Resource type schemas and the schema catalog
//!
//! A schema lists the property ids a resource type exposes and which of them
//! are key properties: the type's own key plus one foreign key per parent
//! type. Schemas are built once at startup and shared read-only.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use crate::property::{CATEGORY_SEPARATOR, PropertyId};

/// Property catalog of one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    resource_type: String,
    key_property_ids: BTreeMap<String, PropertyId>,
    property_ids: HashSet<PropertyId>,
    categories: HashSet<String>,
}

impl ResourceSchema {
    #[must_use]
    pub fn builder(resource_type: impl Into<String>) -> ResourceSchemaBuilder {
        ResourceSchemaBuilder {
            resource_type: resource_type.into(),
            key_property_ids: BTreeMap::new(),
            property_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Key property id identifying resources of `resource_type`: the own key
    /// for this schema's type, a foreign key for a parent type.
    #[must_use]
    pub fn key_property_id(&self, resource_type: &str) -> Option<&PropertyId> {
        self.key_property_ids.get(resource_type)
    }

    #[must_use]
    pub fn own_key(&self) -> Option<&PropertyId> {
        self.key_property_id(&self.resource_type)
    }

    /// Foreign keys as `(parent type, property id)` pairs
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &PropertyId)> {
        self.key_property_ids
            .iter()
            .filter(|(resource_type, _)| **resource_type != self.resource_type)
            .map(|(resource_type, id)| (resource_type.as_str(), id))
    }

    /// All key property ids, own key first
    #[must_use]
    pub fn key_property_ids(&self) -> Vec<&PropertyId> {
        self.own_key()
            .into_iter()
            .chain(self.foreign_keys().map(|(_, id)| id))
            .collect()
    }

    #[must_use]
    pub fn property_ids(&self) -> &HashSet<PropertyId> {
        &self.property_ids
    }

    #[must_use]
    pub fn contains(&self, id: &PropertyId) -> bool {
        self.property_ids.contains(id)
    }

    /// Whether some property lives in `category` (dot-separated form).
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Property ids in `category` or its sub-categories
    #[must_use]
    pub fn properties_in_category(&self, category: &str) -> Vec<&PropertyId> {
        self.property_ids
            .iter()
            .filter(|id| id.in_category(category))
            .collect()
    }
}

/// Builder for [`ResourceSchema`]; paths use the slash form
#[derive(Debug)]
pub struct ResourceSchemaBuilder {
    resource_type: String,
    key_property_ids: BTreeMap<String, PropertyId>,
    property_ids: HashSet<PropertyId>,
}

impl ResourceSchemaBuilder {
    /// Own key property of the resource type.
    #[must_use]
    pub fn key_property(mut self, path: &str) -> Self {
        let id = PropertyId::from_path(path);
        self.property_ids.insert(id.clone());
        self.key_property_ids.insert(self.resource_type.clone(), id);
        self
    }

    /// Foreign key property referencing a resource of `parent_type`.
    #[must_use]
    pub fn parent_key(mut self, parent_type: impl Into<String>, path: &str) -> Self {
        let id = PropertyId::from_path(path);
        self.property_ids.insert(id.clone());
        self.key_property_ids.insert(parent_type.into(), id);
        self
    }

    #[must_use]
    pub fn property(mut self, path: &str) -> Self {
        self.property_ids.insert(PropertyId::from_path(path));
        self
    }

    #[must_use]
    pub fn properties<'p>(mut self, paths: impl IntoIterator<Item = &'p str>) -> Self {
        self.property_ids
            .extend(paths.into_iter().map(PropertyId::from_path));
        self
    }

    #[must_use]
    pub fn build(self) -> ResourceSchema {
        let mut categories = HashSet::new();
        for id in &self.property_ids {
            if let Some(category) = id.category() {
                // Register every prefix: "a.b.c" yields "a", "a.b" and "a.b.c".
                for (index, c) in category.char_indices() {
                    if c == CATEGORY_SEPARATOR {
                        categories.insert(category[..index].to_string());
                    }
                }
                categories.insert(category.to_string());
            }
        }

        ResourceSchema {
            resource_type: self.resource_type,
            key_property_ids: self.key_property_ids,
            property_ids: self.property_ids,
            categories,
        }
    }
}

/// Build-once registry of resource schemas keyed by resource type
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: HashMap<String, Arc<ResourceSchema>>,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new(schemas: impl IntoIterator<Item = ResourceSchema>) -> Self {
        let schemas = schemas
            .into_iter()
            .map(|schema| (schema.resource_type.clone(), Arc::new(schema)))
            .collect();
        Self { schemas }
    }

    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<Arc<ResourceSchema>> {
        self.schemas.get(resource_type).cloned()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component_schema() -> ResourceSchema {
        ResourceSchema::builder("component")
            .key_property("ServiceComponentInfo/component_name")
            .parent_key("cluster", "ServiceComponentInfo/cluster_name")
            .parent_key("service", "ServiceComponentInfo/service_name")
            .properties(["ServiceComponentInfo/state", "metrics/cpu/user"])
            .build()
    }

    #[test]
    fn test_keys() {
        let schema = component_schema();
        assert_eq!(
            schema.own_key(),
            Some(&PropertyId::new("component_name", Some("ServiceComponentInfo")))
        );
        let parents: Vec<&str> = schema.foreign_keys().map(|(t, _)| t).collect();
        assert_eq!(parents, vec!["cluster", "service"]);
        assert_eq!(schema.key_property_ids().len(), 3);
        assert!(schema.contains(&PropertyId::from_path("ServiceComponentInfo/cluster_name")));
    }

    #[test]
    fn test_category_prefixes() {
        let schema = component_schema();
        assert!(schema.has_category("metrics"));
        assert!(schema.has_category("metrics.cpu"));
        assert!(!schema.has_category("metrics.cp"));
        assert_eq!(schema.properties_in_category("metrics").len(), 1);
    }

    #[test]
    fn test_catalog_shares_schemas() {
        let catalog = SchemaCatalog::new([component_schema()]);
        let a = catalog.get("component").unwrap();
        let b = catalog.get("component").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(catalog.get("host").is_none());
        assert_eq!(catalog.len(), 1);
    }
}
