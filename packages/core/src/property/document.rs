//! Nested document flattening
//!
//! Request bodies arrive as arbitrarily nested key/value documents. The
//! flattener first builds a [`TreeNode`] document tree (objects become inner
//! nodes, scalars become leaves carrying their string value) and then walks it
//! depth-first, emitting one [`PropertyId`] per leaf whose category is the
//! dot-joined path of its ancestors.

use serde_json::{Map, Value};

use super::{PropertyId, PropertyMap};
use crate::config::EngineConfig;
use crate::error::{ResqResult, depth_exceeded_error, document_parse_error};
use crate::tree::TreeNode;

/// Flattens nested documents into property maps under a depth bound
#[derive(Debug, Clone, Copy)]
pub struct NestedDocumentFlattener {
    max_depth: usize,
}

impl Default for NestedDocumentFlattener {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl NestedDocumentFlattener {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_document_depth,
        }
    }

    /// Parse JSON text and flatten it.
    ///
    /// # Errors
    ///
    /// Returns a document parse error for malformed text or a non-object
    /// root, and a depth error for documents nested beyond the bound.
    pub fn flatten_str(&self, text: &str) -> ResqResult<PropertyMap> {
        let document: Value = serde_json::from_str(text)?;
        self.flatten(&document)
    }

    /// Flatten a parsed document.
    ///
    /// # Errors
    ///
    /// Returns a document parse error if the root is not an object and a
    /// depth error for documents nested beyond the bound.
    pub fn flatten(&self, document: &Value) -> ResqResult<PropertyMap> {
        let tree = self.build_document_tree(document)?;
        let mut properties = PropertyMap::new();
        for child in tree.children() {
            collect_leaves(&child, None, &mut properties);
        }
        tracing::debug!(
            target: "resq::property",
            properties = properties.len(),
            "flattened document"
        );
        Ok(properties)
    }

    /// Build the intermediate document tree for `document`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::flatten`].
    pub fn build_document_tree(&self, document: &Value) -> ResqResult<TreeNode<String>> {
        let Value::Object(fields) = document else {
            return Err(document_parse_error(format!(
                "document root must be an object, found {}",
                value_kind(document)
            )));
        };

        let root = TreeNode::new("", None);
        self.append_fields(&root, fields, 1)?;
        Ok(root)
    }

    fn append_fields(
        &self,
        parent: &TreeNode<String>,
        fields: &Map<String, Value>,
        depth: usize,
    ) -> ResqResult<()> {
        if depth > self.max_depth {
            return Err(depth_exceeded_error("document nesting", self.max_depth));
        }

        for (name, value) in fields {
            match value {
                Value::Object(nested) => {
                    let node = TreeNode::new(name.clone(), None);
                    parent.add_child_node(node.clone())?;
                    self.append_fields(&node, nested, depth + 1)?;
                }
                Value::Null => {}
                Value::String(text) => {
                    parent.add_child(text.clone(), name.clone());
                }
                scalar => {
                    parent.add_child(scalar.to_string(), name.clone());
                }
            }
        }
        Ok(())
    }
}

fn collect_leaves(node: &TreeNode<String>, category: Option<&str>, out: &mut PropertyMap) {
    let name = node.name();
    if let Some(value) = node.object() {
        out.insert(PropertyId::new(&name, category), value.clone());
        return;
    }

    let nested = match category {
        Some(category) => format!("{category}.{name}"),
        None => name,
    };
    for child in node.children() {
        collect_leaves(&child, Some(&nested), out);
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Flatten `document` with the default depth bound.
///
/// # Errors
///
/// See [`NestedDocumentFlattener::flatten`].
pub fn flatten(document: &Value) -> ResqResult<PropertyMap> {
    NestedDocumentFlattener::default().flatten(document)
}

/// Parse and flatten JSON text with the default depth bound.
///
/// # Errors
///
/// See [`NestedDocumentFlattener::flatten_str`].
pub fn flatten_str(text: &str) -> ResqResult<PropertyMap> {
    NestedDocumentFlattener::default().flatten_str(text)
}

/// Render a property map back into nested form: each category segment
/// becomes an object key and the property name the leaf key.
#[must_use]
pub fn unflatten(properties: &PropertyMap) -> Value {
    let mut root = Map::new();
    let mut ids: Vec<&PropertyId> = properties.keys().collect();
    ids.sort();

    for id in ids {
        if let Some(value) = properties.get(id) {
            let segments: Vec<&str> = id.category_segments().collect();
            insert_nested(&mut root, &segments, id.name(), value);
        }
    }
    Value::Object(root)
}

fn insert_nested(object: &mut Map<String, Value>, segments: &[&str], name: &str, value: &str) {
    let Some((first, rest)) = segments.split_first() else {
        object.insert(name.to_string(), Value::String(value.to_string()));
        return;
    };

    let entry = object
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        // A scalar already occupies this key; the nested value wins.
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(next) = entry {
        insert_nested(next, rest, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_services_document() {
        let properties = flatten(&json!({
            "Services": {
                "service_name": "HDFS",
                "attributes": { "runnable": true }
            }
        }))
        .unwrap();

        assert_eq!(properties.len(), 2);
        assert_eq!(
            properties.get(&PropertyId::new("service_name", Some("Services"))),
            Some(&"HDFS".to_string())
        );
        assert_eq!(
            properties.get(&PropertyId::new("runnable", Some("Services.attributes"))),
            Some(&"true".to_string())
        );
    }

    #[test]
    fn test_top_level_scalars_have_no_category() {
        let properties = flatten(&json!({"state": "STARTED", "count": 3, "gone": null})).unwrap();
        assert_eq!(properties.get(&PropertyId::new("state", None)).map(String::as_str), Some("STARTED"));
        assert_eq!(properties.get(&PropertyId::new("count", None)).map(String::as_str), Some("3"));
        assert!(!properties.contains_key(&PropertyId::new("gone", None)));
    }

    #[test]
    fn test_arrays_are_kept_as_json_text() {
        let properties = flatten(&json!({"hosts": ["a", "b"]})).unwrap();
        assert_eq!(
            properties.get(&PropertyId::new("hosts", None)).map(String::as_str),
            Some(r#"["a","b"]"#)
        );
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        let err = flatten_str(r#"{"Services": "#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentParse);

        let err = flatten_str("[1, 2]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentParse);
        assert!(err.message.contains("an array"));
    }

    #[test]
    fn test_depth_bound() {
        let config = EngineConfig::default().with_max_document_depth(2);
        let flattener = NestedDocumentFlattener::new(&config);

        assert!(flattener.flatten(&json!({"a": {"b": 1}})).is_ok());
        let err = flattener.flatten(&json!({"a": {"b": {"c": 1}}})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
    }

    #[test]
    fn test_document_tree_shape() {
        let tree = NestedDocumentFlattener::default()
            .build_document_tree(&json!({"Services": {"service_name": "HDFS"}}))
            .unwrap();
        let services = tree.child("Services").unwrap();
        assert!(!services.has_object());
        let leaf = services.child("service_name").unwrap();
        assert_eq!(leaf.object().as_deref().map(String::as_str), Some("HDFS"));
        assert_eq!(leaf.depth(), 2);
    }

    #[test]
    fn test_unflatten_restores_nesting() {
        let document = json!({
            "Services": {
                "service_name": "HDFS",
                "attributes": { "runnable": "true" }
            },
            "state": "STARTED"
        });
        let properties = flatten(&document).unwrap();
        assert_eq!(unflatten(&properties), document);
    }
}
