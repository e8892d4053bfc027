//! Property identifiers
//!
//! A [`PropertyId`] names one attribute of a resource: a property name plus an
//! optional dot-separated category path. Identifiers are immutable values with
//! shared string storage, so cloning one is a reference-count bump.

use std::fmt;
use std::sync::Arc;

/// Separator between category segments in the stored form
pub const CATEGORY_SEPARATOR: char = '.';

/// Separator between path segments in filter expressions and field lists
pub const PATH_SEPARATOR: char = '/';

/// Identifier of a resource attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId {
    category: Option<Arc<str>>,
    name: Arc<str>,
}

impl PropertyId {
    /// Create a property id. A `None` category means the property sits at the
    /// top level, which is distinct from an empty-named category.
    pub fn new(name: impl AsRef<str>, category: Option<&str>) -> Self {
        Self {
            category: category.map(Arc::from),
            name: Arc::from(name.as_ref()),
        }
    }

    /// Returns a value-equal identifier for `(name, category)`.
    ///
    /// Identity is purely value based: two interned ids for the same pair
    /// compare and hash equal whether or not they share storage.
    pub fn intern(name: &str, category: Option<&str>) -> Self {
        Self::new(name, category)
    }

    /// Build an id from a slash-delimited path such as `Services/attributes/runnable`.
    ///
    /// The path is split on the last `/`; the leading segments become the
    /// category with `/` normalized to `.`.
    ///
    /// ```
    /// use resq_core::property::PropertyId;
    ///
    /// let id = PropertyId::from_path("Services/attributes/runnable");
    /// assert_eq!(id.name(), "runnable");
    /// assert_eq!(id.category(), Some("Services.attributes"));
    /// assert_eq!(PropertyId::from_path("state").category(), None);
    /// ```
    pub fn from_path(path: &str) -> Self {
        match path.rfind(PATH_SEPARATOR) {
            Some(index) => {
                let category = path[..index].replace(PATH_SEPARATOR, ".");
                Self::new(&path[index + 1..], Some(&category))
            }
            None => Self::new(path, None),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Render the id back to its slash-delimited path form.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self.category() {
            Some(category) => format!(
                "{}{PATH_SEPARATOR}{}",
                category.replace(CATEGORY_SEPARATOR, "/"),
                self.name
            ),
            None => self.name.to_string(),
        }
    }

    /// Whether this property lives in `category` or one of its sub-categories.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        match self.category() {
            Some(own) => {
                own == category
                    || (own.starts_with(category)
                        && own[category.len()..].starts_with(CATEGORY_SEPARATOR))
            }
            None => false,
        }
    }

    /// The same property nested one level deeper, under `prefix`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let category = match self.category() {
            Some(category) => format!("{prefix}{CATEGORY_SEPARATOR}{category}"),
            None => prefix.to_string(),
        };
        Self {
            category: Some(Arc::from(category)),
            name: Arc::clone(&self.name),
        }
    }

    /// Inverse of [`Self::with_prefix`]; `None` when the id is not under `prefix`.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &str) -> Option<Self> {
        let category = self.category()?;
        if category == prefix {
            return Some(Self {
                category: None,
                name: Arc::clone(&self.name),
            });
        }
        let rest = category
            .strip_prefix(prefix)?
            .strip_prefix(CATEGORY_SEPARATOR)?;
        Some(Self::new(&*self.name, Some(rest)))
    }

    /// Category segments from outermost to innermost.
    pub fn category_segments(&self) -> impl Iterator<Item = &str> {
        self.category()
            .into_iter()
            .flat_map(|category| category.split(CATEGORY_SEPARATOR))
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    #[test]
    fn test_value_equality_and_hashing() {
        let a = PropertyId::intern("service_name", Some("Services"));
        let b = PropertyId::new(String::from("service_name"), Some("Services"));
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, "HDFS");
        assert_eq!(map.get(&b), Some(&"HDFS"));
    }

    #[test]
    fn test_top_level_differs_from_empty_category() {
        let top = PropertyId::new("state", None);
        let empty = PropertyId::new("state", Some(""));
        assert_ne!(top, empty);
    }

    #[test]
    fn test_path_round_trip() {
        let id = PropertyId::from_path("Services/attributes/runnable");
        assert_eq!(id.to_path(), "Services/attributes/runnable");
        assert_eq!(id.to_string(), "Services/attributes/runnable");
    }

    #[test]
    fn test_in_category() {
        let id = PropertyId::from_path("Services/attributes/runnable");
        assert!(id.in_category("Services"));
        assert!(id.in_category("Services.attributes"));
        assert!(!id.in_category("Serv"));
        assert!(!PropertyId::new("state", None).in_category("Services"));
    }

    #[test]
    fn test_prefixing() {
        let id = PropertyId::from_path("ServiceComponentInfo/state");
        let nested = id.with_prefix("components");
        assert_eq!(nested, PropertyId::from_path("components/ServiceComponentInfo/state"));
        assert_eq!(nested.strip_prefix("components"), Some(id));

        let top = PropertyId::new("state", None).with_prefix("components");
        assert_eq!(top.to_path(), "components/state");
        assert_eq!(top.strip_prefix("components"), Some(PropertyId::new("state", None)));
        assert_eq!(nested.strip_prefix("comp"), None);
        assert_eq!(PropertyId::new("state", None).strip_prefix("components"), None);
    }

    #[test]
    fn test_category_segments() {
        let id = PropertyId::new("x", Some("a.b.c"));
        assert_eq!(id.category_segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(PropertyId::new("x", None).category_segments().count(), 0);
    }
}
