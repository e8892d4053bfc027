//! Generic named n-ary tree node
//!
//! [`TreeNode`] is a cheap handle to a shared node. Children are owned by
//! their parent; the parent link is a weak back-reference so dropping the
//! root frees the whole tree. Trees belong to a single request and are not
//! shared across threads.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{ResqResult, invalid_tree_error};

struct NodeInner<T> {
    name: String,
    object: Option<T>,
    parent: Weak<RefCell<NodeInner<T>>>,
    children: Vec<TreeNode<T>>,
    // Allocated on first write; `None` and an empty map are different states.
    properties: Option<BTreeMap<String, String>>,
}

/// Handle to a node of a result or document tree
pub struct TreeNode<T> {
    inner: Rc<RefCell<NodeInner<T>>>,
}

impl<T> Clone for TreeNode<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> TreeNode<T> {
    /// Create a detached node (typically a root).
    pub fn new(name: impl Into<String>, object: Option<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeInner {
                name: name.into(),
                object,
                parent: Weak::new(),
                children: Vec::new(),
                properties: None,
            })),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.borrow_mut().name = name.into();
    }

    /// Borrow the node's object, if it carries one.
    #[must_use]
    pub fn object(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.inner.borrow(), |inner| inner.object.as_ref()).ok()
    }

    /// Mutably borrow the node's object, if it carries one.
    #[must_use]
    pub fn object_mut(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.inner.borrow_mut(), |inner| inner.object.as_mut()).ok()
    }

    #[must_use]
    pub fn has_object(&self) -> bool {
        self.inner.borrow().object.is_some()
    }

    #[must_use]
    pub fn parent(&self) -> Option<TreeNode<T>> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| TreeNode { inner })
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<TreeNode<T>> {
        self.inner.borrow().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// First child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<TreeNode<T>> {
        self.inner
            .borrow()
            .children
            .iter()
            .find(|child| child.inner.borrow().name == name)
            .cloned()
    }

    /// Create a new child carrying `object`, append it and return it.
    pub fn add_child(&self, object: T, name: impl Into<String>) -> TreeNode<T> {
        let child = TreeNode::new(name, Some(object));
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());
        child
    }

    /// Splice an existing node (and its subtree) under this node.
    ///
    /// The node is detached from its previous parent, if any, and its parent
    /// link is rewritten to point here.
    ///
    /// # Errors
    ///
    /// Returns an invalid tree error if `node` is this node or one of its
    /// ancestors, since that would make the tree cyclic.
    pub fn add_child_node(&self, node: TreeNode<T>) -> ResqResult<TreeNode<T>> {
        let mut cursor = Some(self.clone());
        while let Some(current) = cursor {
            if current.ptr_eq(&node) {
                return Err(invalid_tree_error(format!(
                    "cannot add node '{}' beneath itself",
                    node.name()
                )));
            }
            cursor = current.parent();
        }

        if let Some(previous) = node.parent() {
            previous
                .inner
                .borrow_mut()
                .children
                .retain(|child| !child.ptr_eq(&node));
        }

        node.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(node.clone());
        Ok(node)
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .borrow_mut()
            .properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    /// Property value, or `None` when the key was never set.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.inner
            .borrow()
            .properties
            .as_ref()
            .and_then(|properties| properties.get(key).cloned())
    }

    pub fn remove_property(&self, key: &str) -> Option<String> {
        self.inner
            .borrow_mut()
            .properties
            .as_mut()
            .and_then(|properties| properties.remove(key))
    }

    /// Snapshot of the property bag; `None` if nothing was ever set.
    #[must_use]
    pub fn properties(&self) -> Option<BTreeMap<String, String>> {
        self.inner.borrow().properties.clone()
    }

    /// Number of ancestors between this node and its root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent();
        }
        depth
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &TreeNode<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Visit this node and its descendants in pre-order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `visit`.
    pub fn walk<F>(&self, visit: &mut F) -> ResqResult<()>
    where
        F: FnMut(&TreeNode<T>) -> ResqResult<()>,
    {
        visit(self)?;
        for child in self.children() {
            child.walk(visit)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TreeNode")
            .field("name", &inner.name)
            .field("has_object", &inner.object.is_some())
            .field("children", &inner.children)
            .field("properties", &inner.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_add_child_sets_parent() {
        let root: TreeNode<u32> = TreeNode::new("root", None);
        let child = root.add_child(7, "seven");

        assert_eq!(child.name(), "seven");
        assert_eq!(*child.object().unwrap(), 7);
        assert!(child.parent().unwrap().ptr_eq(&root));
        assert_eq!(root.child_count(), 1);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let root: TreeNode<u32> = TreeNode::new("root", None);
        for (i, name) in ["c", "a", "b"].iter().enumerate() {
            root.add_child(i as u32, *name);
        }
        let names: Vec<String> = root.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_add_child_node_reparents() {
        let first: TreeNode<u32> = TreeNode::new("first", None);
        let second: TreeNode<u32> = TreeNode::new("second", None);
        let existing = second.add_child(1, "moved");
        let sibling = TreeNode::new("sibling", Some(2));

        first.add_child_node(sibling.clone()).unwrap();
        first.add_child_node(existing.clone()).unwrap();

        assert!(existing.parent().unwrap().ptr_eq(&first));
        assert_eq!(second.child_count(), 0);
        let names: Vec<String> = first.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["sibling", "moved"]);
    }

    #[test]
    fn test_add_ancestor_is_rejected() {
        let root: TreeNode<u32> = TreeNode::new("root", None);
        let child = root.add_child(1, "child");

        let err = child.add_child_node(root.clone()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTree);
        assert!(child.add_child_node(child.clone()).is_err());
    }

    #[test]
    fn test_property_bag_is_lazy() {
        let node: TreeNode<()> = TreeNode::new("n", None);
        assert!(node.properties().is_none());
        assert_eq!(node.get_property("href"), None);

        node.set_property("href", "/api/v1/clusters");
        assert_eq!(node.get_property("href").as_deref(), Some("/api/v1/clusters"));

        node.remove_property("href");
        assert_eq!(node.properties(), Some(BTreeMap::new()));
    }

    #[test]
    fn test_walk_is_pre_order() {
        let root: TreeNode<u32> = TreeNode::new("root", None);
        let a = root.add_child(1, "a");
        a.add_child(2, "a1");
        root.add_child(3, "b");

        let mut seen = Vec::new();
        root.walk(&mut |node: &TreeNode<u32>| {
            seen.push(node.name());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_child_lookup_and_rename() {
        let root: TreeNode<u32> = TreeNode::new("", None);
        let node = root.add_child(1, "services:1");
        node.set_name("HDFS");
        assert!(root.child("HDFS").unwrap().ptr_eq(&node));
        assert!(root.child("services:1").is_none());
    }
}
