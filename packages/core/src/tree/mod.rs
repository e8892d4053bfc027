//! Generic tree model shared by parsed documents and query results

mod node;

pub use node::TreeNode;
