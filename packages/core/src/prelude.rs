//! Commonly used types
//!
//! Only the canonical public API belongs here.

pub use crate::config::EngineConfig;
pub use crate::error::{ErrorKind, ResqError, ResqResult};
pub use crate::parser::{PredicateParser, parse, parse_with_schema};
pub use crate::predicate::{ComparisonOp, LogicalOp, Predicate, PredicateBuilder, PropertySource};
pub use crate::property::{PropertyId, PropertyMap, flatten, flatten_str, unflatten};
pub use crate::query::{
    FetchedResults, InMemoryProvider, PageRequest, Projection, ProviderRequest, Query, QueryResult,
    ResourceProvider, ResultSet,
};
pub use crate::resource::{
    PostProcessor, Request, Resource, ResourceDefinition, ResourceSchema, ResultPostProcessor,
    SchemaCatalog, href_post_processor,
};
pub use crate::stats::QueryStatsSnapshot;
pub use crate::tree::TreeNode;
