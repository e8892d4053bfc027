//! Query execution against resource providers

mod core;
mod join;
mod page;
mod projection;
mod provider;
mod result;

pub use core::Query;
pub use page::PageRequest;
pub use projection::Projection;
pub use provider::{InMemoryProvider, ProviderRequest, ResourceProvider};
pub use result::{FetchedResults, QueryResult, ResultEntry, ResultSet};
