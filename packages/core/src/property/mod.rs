//! Property identifiers, path handling and document flattening

pub mod document;
mod id;
mod path;

pub use document::{NestedDocumentFlattener, flatten, flatten_str, unflatten};
pub use id::{CATEGORY_SEPARATOR, PATH_SEPARATOR, PropertyId};
pub use path::{is_valid_property_path, split_field_list};

/// Flattened property values keyed by id
pub type PropertyMap = hashbrown::HashMap<PropertyId, String>;
