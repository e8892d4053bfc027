//! Raw resource records returned by providers

use crate::predicate::PropertySource;
use crate::property::{PropertyId, PropertyMap};

/// One resource instance: its type and flattened property values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    resource_type: String,
    properties: PropertyMap,
}

impl Resource {
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: PropertyMap::new(),
        }
    }

    #[must_use]
    pub fn with_properties(resource_type: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
        }
    }

    /// Set a property by slash path, builder style.
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<String>) -> Self {
        self.set_property(PropertyId::from_path(path), value);
        self
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[must_use]
    pub fn get_property(&self, id: &PropertyId) -> Option<&str> {
        self.properties.get(id).map(String::as_str)
    }

    pub fn set_property(&mut self, id: PropertyId, value: impl Into<String>) {
        self.properties.insert(id, value.into());
    }

    /// Copy of this resource keeping only the properties `keep` accepts.
    #[must_use]
    pub fn retain_clone(&self, keep: impl Fn(&PropertyId) -> bool) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            properties: self
                .properties
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        }
    }
}

impl PropertySource for Resource {
    fn property(&self, id: &PropertyId) -> Option<&str> {
        self.get_property(id)
    }
}
