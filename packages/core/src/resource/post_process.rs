//! Result tree post-processing
//!
//! After a query has assembled its result tree, [`ResultPostProcessor`] walks
//! it once, derives each node's href and runs the owning definition's
//! post-processor chain on the node. Post-processors annotate nodes; they
//! never add or remove them.

use std::sync::Arc;

use super::definition::ResourceDefinition;
use super::record::Resource;
use super::request::Request;
use crate::error::ResqResult;
use crate::tree::TreeNode;

/// Result node property holding the node's href
pub const HREF_PROPERTY: &str = "href";

/// Result node property marking collection nodes (`"true"`/`"false"`)
pub const IS_COLLECTION_PROPERTY: &str = "isCollection";

/// Annotates one result node given the request and the node's href
pub type PostProcessor =
    Arc<dyn Fn(&Request, &TreeNode<Resource>, &str) -> ResqResult<()> + Send + Sync>;

/// Post-processor setting the `href` property
#[must_use]
pub fn href_post_processor() -> PostProcessor {
    Arc::new(|_request: &Request, node: &TreeNode<Resource>, href: &str| {
        node.set_property(HREF_PROPERTY, href);
        Ok(())
    })
}

fn join_href(base: &str, segment: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

/// Walks a result tree applying definition post-processor chains
pub struct ResultPostProcessor<'a> {
    request: &'a Request,
    definition: &'a ResourceDefinition,
}

impl<'a> ResultPostProcessor<'a> {
    #[must_use]
    pub fn new(request: &'a Request, definition: &'a ResourceDefinition) -> Self {
        Self {
            request,
            definition,
        }
    }

    /// Process the tree rooted at `root`.
    ///
    /// The root gets the request's base href. Resources under a collection
    /// node get the collection href plus their key value; the single resource
    /// of an instance request shares the base href. Sub-resource collections
    /// get their parent resource's href plus the sub-resource name.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by a post-processor.
    pub fn process(&self, root: &TreeNode<Resource>) -> ResqResult<()> {
        self.process_collection(root, self.definition, self.request.base_href())?;
        tracing::debug!(
            target: "resq::resource",
            resource_type = self.definition.resource_type(),
            "post-processed result tree"
        );
        Ok(())
    }

    fn process_collection(
        &self,
        node: &TreeNode<Resource>,
        definition: &ResourceDefinition,
        href: &str,
    ) -> ResqResult<()> {
        self.apply(node, definition, href)?;

        let is_collection = node
            .get_property(IS_COLLECTION_PROPERTY)
            .is_none_or(|value| value != "false");

        for child in node.children() {
            let resource_href = if is_collection {
                join_href(href, &key_segment(&child, definition))
            } else {
                href.to_string()
            };
            self.process_resource(&child, definition, &resource_href)?;
        }
        Ok(())
    }

    fn process_resource(
        &self,
        node: &TreeNode<Resource>,
        definition: &ResourceDefinition,
        href: &str,
    ) -> ResqResult<()> {
        self.apply(node, definition, href)?;

        for child in node.children() {
            let name = child.name();
            match definition.sub_resource(&name) {
                Some(sub_definition) => {
                    self.process_collection(&child, sub_definition, &join_href(href, &name))?;
                }
                None => {
                    tracing::warn!(
                        target: "resq::resource",
                        resource_type = definition.resource_type(),
                        child = %name,
                        "result node has no matching sub-resource definition"
                    );
                }
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        node: &TreeNode<Resource>,
        definition: &ResourceDefinition,
        href: &str,
    ) -> ResqResult<()> {
        for processor in definition.post_processors() {
            processor(self.request, node, href)?;
        }
        Ok(())
    }
}

/// Href segment of a resource node: its own key value, else the node name.
fn key_segment(node: &TreeNode<Resource>, definition: &ResourceDefinition) -> String {
    let key = definition.schema().own_key();
    node.object()
        .and_then(|resource| {
            key.and_then(|id| resource.get_property(id))
                .map(str::to_string)
        })
        .unwrap_or_else(|| node.name())
}
