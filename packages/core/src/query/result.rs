//! Fetched query results and result tree assembly

use super::projection::Projection;
use crate::error::ResqResult;
use crate::resource::{IS_COLLECTION_PROPERTY, Resource};
use crate::stats::QueryStatsSnapshot;
use crate::tree::TreeNode;

/// One matching resource and the results of its sub-resource queries
#[derive(Debug, Clone)]
pub struct ResultEntry {
    pub resource: Resource,
    pub sub_results: Vec<(String, ResultSet)>,
}

/// Matching resources of one query level, unprojected and in result order
#[derive(Debug, Clone)]
pub struct ResultSet {
    resource_type: String,
    is_collection: bool,
    projection: Projection,
    joined_sub_resources: Vec<String>,
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub(crate) fn new(
        resource_type: impl Into<String>,
        is_collection: bool,
        projection: Projection,
        joined_sub_resources: Vec<String>,
        entries: Vec<ResultEntry>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            is_collection,
            projection,
            joined_sub_resources,
            entries,
        }
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    /// Projection applied when the set becomes a tree
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Sub-resources whose rows the query's predicate was joined with
    #[must_use]
    pub fn joined_sub_resources(&self) -> &[String] {
        &self.joined_sub_resources
    }

    #[must_use]
    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assemble the result tree: a root marked `isCollection`, one
    /// `<type>:<n>` child per entry carrying the projected resource, and
    /// beneath it one subtree per sub-resource named after the sub-resource.
    ///
    /// # Errors
    ///
    /// Returns an invalid tree error if a subtree cannot be spliced in.
    pub fn into_tree(self) -> ResqResult<TreeNode<Resource>> {
        let root = TreeNode::new("", None);
        root.set_property(IS_COLLECTION_PROPERTY, self.is_collection.to_string());

        for (index, entry) in self.entries.into_iter().enumerate() {
            let projected = if self.projection.all_properties() {
                entry.resource
            } else {
                entry.resource.retain_clone(|id| self.projection.includes(id))
            };
            let node = root.add_child(projected, format!("{}:{}", self.resource_type, index + 1));

            for (name, sub_results) in entry.sub_results {
                let subtree = sub_results.into_tree()?;
                subtree.set_name(name);
                node.add_child_node(subtree)?;
            }
        }
        Ok(root)
    }
}

/// Outcome of [`Query::fetch`](super::Query::fetch)
#[derive(Debug)]
pub struct FetchedResults {
    pub results: ResultSet,
    pub stats: QueryStatsSnapshot,
}

impl FetchedResults {
    /// Assemble the result tree of the fetched results.
    ///
    /// # Errors
    ///
    /// See [`ResultSet::into_tree`].
    pub fn assemble(self) -> ResqResult<QueryResult> {
        let tree = self.results.into_tree()?;
        Ok(QueryResult {
            tree,
            stats: self.stats,
        })
    }
}

/// Outcome of [`Query::execute`](super::Query::execute)
#[derive(Debug)]
pub struct QueryResult {
    pub tree: TreeNode<Resource>,
    pub stats: QueryStatsSnapshot,
}
