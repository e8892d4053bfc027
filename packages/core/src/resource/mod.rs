//! Resource records, schemas, definitions and result post-processing

mod definition;
mod post_process;
mod record;
mod request;
pub mod schema;

pub use definition::ResourceDefinition;
pub use post_process::{
    HREF_PROPERTY, IS_COLLECTION_PROPERTY, PostProcessor, ResultPostProcessor, href_post_processor,
};
pub use record::Resource;
pub use request::Request;
pub use schema::{ResourceSchema, ResourceSchemaBuilder, SchemaCatalog};
