//! Partial-response projections

use std::collections::BTreeSet;

use crate::property::PropertyId;

/// The properties a caller asked to see
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    all_properties: bool,
    property_ids: BTreeSet<PropertyId>,
    categories: BTreeSet<String>,
}

impl Projection {
    /// Projection selecting every property
    #[must_use]
    pub fn all() -> Self {
        Self {
            all_properties: true,
            ..Self::default()
        }
    }

    pub fn set_all_properties(&mut self) {
        self.all_properties = true;
    }

    pub fn add_property(&mut self, id: PropertyId) {
        self.property_ids.insert(id);
    }

    /// Select every property in `category` (dot-separated form) and below.
    pub fn add_category(&mut self, category: impl Into<String>) {
        self.categories.insert(category.into());
    }

    #[must_use]
    pub fn all_properties(&self) -> bool {
        self.all_properties
    }

    #[must_use]
    pub fn property_ids(&self) -> &BTreeSet<PropertyId> {
        &self.property_ids
    }

    #[must_use]
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.all_properties && self.property_ids.is_empty() && self.categories.is_empty()
    }

    /// Whether `id` is selected
    #[must_use]
    pub fn includes(&self, id: &PropertyId) -> bool {
        self.all_properties
            || self.property_ids.contains(id)
            || self
                .categories
                .iter()
                .any(|category| id.in_category(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes() {
        let mut projection = Projection::default();
        assert!(projection.is_empty());

        projection.add_property(PropertyId::from_path("Hosts/host_name"));
        projection.add_category("metrics.cpu");

        assert!(projection.includes(&PropertyId::from_path("Hosts/host_name")));
        assert!(projection.includes(&PropertyId::from_path("metrics/cpu/user")));
        assert!(projection.includes(&PropertyId::from_path("metrics/cpu/load/one")));
        assert!(!projection.includes(&PropertyId::from_path("metrics/memory/free")));
        assert!(Projection::all().includes(&PropertyId::new("anything", None)));
    }
}
