//! Arena-based markup tree storage
//!
//! Every node lives in one `Vec<HtmlNode>` and is addressed by a 4-byte
//! `NodeId`. Parents own their children through `children_ids`; the
//! `parent_id` back-reference is a plain index and owns nothing, so there are
//! no reference cycles and no `Rc`/`RefCell`.
//!
//! ```text
//! Arena: Vec<HtmlNode>
//!        [html][head][body][div][#text]...
//!          ↑ children_ids: [1, 2]     parent_id of [1] → 0
//! ```
//!
//! Detaching a node only unlinks it; the node and its subtree stay in the
//! arena and can be appended elsewhere.

use crate::error::{MarkupError, Result};
use crate::query;
use crate::selector::{self, SelectorToken};
use crate::serializer::{HtmlSerializer, ToStringOptions};
use crate::types::{HtmlNode, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Arena allocator for markup nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HtmlArena {
    nodes: Vec<HtmlNode>,
}

impl HtmlArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn add_node(&mut self, node_type: NodeType) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(HtmlNode::new(node_id, node_type));
        node_id
    }

    /// Create a detached element from a selector such as `div.a#b span`
    ///
    /// Each space-separated group becomes one nested element; the returned
    /// id is the outermost one.
    pub fn create_element(&mut self, selector: &str) -> NodeId {
        let node_id = self.add_node(NodeType::Element);
        self.fill_from_selector(node_id, selector);
        node_id
    }

    /// Create an element and append a text child with `text`
    ///
    /// Empty text adds no child.
    pub fn create_element_with_text(&mut self, selector: &str, text: &str) -> NodeId {
        let node_id = self.create_element(selector);
        if !text.is_empty() {
            self.push_text(node_id, text);
        }
        node_id
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.create_content_node(NodeType::Text, content)
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.create_content_node(NodeType::Comment, content)
    }

    pub fn create_doctype(&mut self, content: &str) -> NodeId {
        self.create_content_node(NodeType::DocumentType, content)
    }

    fn create_content_node(&mut self, node_type: NodeType, content: &str) -> NodeId {
        let node_id = self.add_node(node_type);
        self.nodes[node_id as usize].set_content(content);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&HtmlNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(MarkupError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    ///
    /// Only single-node setters are reachable this way; use [`node_mut`]
    /// for anything that changes the tree shape.
    ///
    /// [`node_mut`]: HtmlArena::node_mut
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut HtmlNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(MarkupError::NodeNotFound(node_id))
    }

    /// Fluent handle for mutating a node and its children
    pub fn node_mut(&mut self, node_id: NodeId) -> Result<NodeMut<'_>> {
        self.get(node_id)?;
        Ok(NodeMut {
            arena: self,
            node_id,
        })
    }

    /// Total number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &HtmlNode> {
        self.nodes.iter()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&HtmlNode>> {
        let node = self.get(node_id)?;
        node.children_ids()
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&HtmlNode>> {
        let node = self.get(node_id)?;
        match node.parent_id() {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// First direct child element with tag `name`
    pub fn child_by_name(&self, parent_id: NodeId, name: &str) -> Result<NodeId> {
        self.get(parent_id)?
            .children_ids()
            .iter()
            .copied()
            .find(|&child_id| {
                self.get(child_id)
                    .is_ok_and(|child| child.is_element() && child.tag_name() == name)
            })
            .ok_or_else(|| MarkupError::ChildNotFound(name.to_string()))
    }

    /// Is `ancestor` equal to `node_id` or above it?
    fn is_ancestor_or_self(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id();
        }
        Ok(false)
    }

    /// Traverse a subtree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&HtmlNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids().iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// All descendants of `root` matching `selector`
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        query::query_selector(self, root, selector)
    }

    /// Single-line HTML for a subtree
    pub fn to_html(&self, node_id: NodeId) -> Result<String> {
        HtmlSerializer::new().serialize(self, node_id)
    }

    /// HTML for a subtree with explicit formatting options
    pub fn to_html_with(&self, node_id: NodeId, options: ToStringOptions) -> Result<String> {
        HtmlSerializer::with_options(options).serialize(self, node_id)
    }

    /// Snapshot every node, attached or not, as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore an arena from [`to_json`](HtmlArena::to_json) output
    pub fn from_json(json: &str) -> Result<Self> {
        let arena: Self = serde_json::from_str(json)?;
        arena.validate()?;
        Ok(arena)
    }

    /// Check that a restored arena is a forest
    ///
    /// Every link must point at a real node, parent/child links must agree,
    /// a node may be listed as a child at most once, and no `parent_id`
    /// chain may loop.
    fn validate(&self) -> Result<()> {
        let mut listed = vec![false; self.nodes.len()];

        for (index, node) in self.nodes.iter().enumerate() {
            let node_id = index as NodeId;
            if node.node_id() != node_id {
                return Err(MarkupError::InvalidSnapshot(format!(
                    "node at index {index} carries id {}",
                    node.node_id()
                )));
            }
            if let Some(parent_id) = node.parent_id() {
                if !self.get(parent_id)?.children_ids().contains(&node_id) {
                    return Err(MarkupError::InvalidSnapshot(format!(
                        "node {node_id} is missing from the children of its parent {parent_id}"
                    )));
                }
            }
            for &child_id in node.children_ids() {
                if self.get(child_id)?.parent_id() != Some(node_id) {
                    return Err(MarkupError::InvalidSnapshot(format!(
                        "child {child_id} of node {node_id} points at another parent"
                    )));
                }
                if std::mem::replace(&mut listed[child_id as usize], true) {
                    return Err(MarkupError::InvalidSnapshot(format!(
                        "node {child_id} is listed as a child more than once"
                    )));
                }
            }
        }

        for node in &self.nodes {
            let mut current = node.parent_id();
            let mut steps = 0;
            while let Some(parent_id) = current {
                if parent_id == node.node_id() || steps >= self.nodes.len() {
                    return Err(MarkupError::HierarchyCycle {
                        parent: parent_id,
                        child: node.node_id(),
                    });
                }
                current = self.get(parent_id)?.parent_id();
                steps += 1;
            }
        }
        Ok(())
    }

    /// Populate `node_id` from the first selector group and build nested
    /// children from the rest
    ///
    /// A selector whose first token is not an element name is ignored.
    fn fill_from_selector(&mut self, node_id: NodeId, selector: &str) {
        let groups = selector::parse(selector);
        let Some((first, rest)) = groups.split_first() else {
            return;
        };
        if !matches!(first.first(), Some(SelectorToken::Element(_))) {
            tracing::debug!("selector {:?} does not start with a tag name, ignored", selector);
            return;
        }

        self.apply_group(node_id, first);

        // each child is built by the same rule, so a group without a tag
        // leaves its child empty and ends the chain there
        let mut parent_id = node_id;
        for group in rest {
            let child_id = self.add_node(NodeType::Element);
            self.link(parent_id, child_id);
            if !matches!(group.first(), Some(SelectorToken::Element(_))) {
                tracing::debug!("selector {:?} has a group without a tag name", selector);
                break;
            }
            self.apply_group(child_id, group);
            parent_id = child_id;
        }
    }

    fn apply_group(&mut self, node_id: NodeId, group: &[SelectorToken]) {
        let node = &mut self.nodes[node_id as usize];
        let mut index = 0;
        while index < group.len() {
            match &group[index] {
                SelectorToken::Element(tag) => {
                    node.set_tag_name(tag.as_str());
                }
                SelectorToken::Class(class) => {
                    node.add_class(class.as_str());
                }
                SelectorToken::Id(id) => {
                    node.set_id(id.as_str());
                }
                SelectorToken::AttributeName(name) => {
                    // the comparator only matters when querying
                    let (_, value, consumed) = query::attribute_clause(&group[index + 1..]);
                    node.set_attribute(name, value);
                    index += consumed;
                }
                SelectorToken::AttributeValue(_)
                | SelectorToken::AttributeCompare(_)
                | SelectorToken::GroupSeparator => {}
            }
            index += 1;
        }
    }

    fn push_text(&mut self, parent_id: NodeId, text: &str) -> NodeId {
        let text_id = self.create_text(text);
        self.link(parent_id, text_id);
        text_id
    }

    /// Attach an already detached node as the last child of `parent_id`
    pub(crate) fn link(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.nodes[child_id as usize].parent_id = Some(parent_id);
        self.nodes[parent_id as usize].children_ids.push(child_id);
    }

    /// Unlink `child_id` from its parent, if any
    fn detach(&mut self, child_id: NodeId) {
        let Some(parent_id) = self.nodes[child_id as usize].parent_id.take() else {
            return;
        };
        let siblings = &mut self.nodes[parent_id as usize].children_ids;
        if let Some(position) = siblings.iter().position(|&id| id == child_id) {
            siblings.remove(position);
        }
        tracing::debug!("detached node {} from parent {}", child_id, parent_id);
    }
}

/// Mutable handle to one node inside an arena
///
/// Every method returns the handle again so calls chain:
///
/// ```
/// # use markup::HtmlArena;
/// let mut arena = HtmlArena::new();
/// let img = arena.create_element("img");
/// arena
///     .node_mut(img)?
///     .set_attribute("src", "image.png")
///     .set_attribute("alt", "an image")
///     .use_closing_tag(false);
/// assert_eq!(arena.to_html(img)?, r#"<img src="image.png" alt="an image">"#);
/// # Ok::<(), markup::MarkupError>(())
/// ```
#[derive(Debug)]
pub struct NodeMut<'a> {
    arena: &'a mut HtmlArena,
    node_id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.node_id
    }

    /// Read-only view of the node
    pub fn node(&self) -> &HtmlNode {
        &self.arena.nodes[self.node_id as usize]
    }

    fn node_data(&mut self) -> &mut HtmlNode {
        &mut self.arena.nodes[self.node_id as usize]
    }

    /// Apply a selector to this node, building nested children for any
    /// groups after the first
    pub fn set_name(&mut self, selector: &str) -> &mut Self {
        self.arena.fill_from_selector(self.node_id, selector);
        self
    }

    pub fn set_type(&mut self, node_type: NodeType) -> &mut Self {
        self.node_data().set_type(node_type);
        self
    }

    pub fn set_content(&mut self, content: &str) -> &mut Self {
        self.node_data().set_content(content);
        self
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.node_data().set_attribute(name, value);
        self
    }

    pub fn toggle_class(&mut self, class: &str) -> &mut Self {
        self.node_data().toggle_class(class);
        self
    }

    pub fn use_closing_tag(&mut self, close: bool) -> &mut Self {
        self.node_data().use_closing_tag(close);
        self
    }

    /// Move `child_id` under this node as its last child
    ///
    /// A child that already has a parent is detached from it first.
    pub fn append_child(&mut self, child_id: NodeId) -> Result<&mut Self> {
        self.ensure_element()?;
        self.arena.get(child_id)?;
        if self.arena.is_ancestor_or_self(child_id, self.node_id)? {
            return Err(MarkupError::HierarchyCycle {
                parent: self.node_id,
                child: child_id,
            });
        }
        self.arena.detach(child_id);
        self.arena.link(self.node_id, child_id);
        Ok(self)
    }

    /// Append a text run as the last child
    pub fn append_text(&mut self, text: &str) -> Result<&mut Self> {
        self.ensure_element()?;
        self.arena.push_text(self.node_id, text);
        Ok(self)
    }

    /// Detach the child at `index`; it stays in the arena
    pub fn remove_child(&mut self, index: usize) -> Result<&mut Self> {
        let children = self.node().children_ids();
        let child_id = *children.get(index).ok_or(MarkupError::ChildIndexOutOfRange {
            index,
            len: children.len(),
        })?;
        self.arena.detach(child_id);
        Ok(self)
    }

    /// Detach the first direct child whose selector string equals `selector`
    pub fn remove_child_by_selector(&mut self, selector: &str) -> &mut Self {
        let found = self.node().children_ids().iter().copied().find(|&child_id| {
            self.arena
                .get(child_id)
                .is_ok_and(|child| child.is_element() && child.selector() == selector)
        });
        match found {
            Some(child_id) => self.arena.detach(child_id),
            None => tracing::debug!(
                "no child of node {} matches selector {:?}",
                self.node_id,
                selector
            ),
        }
        self
    }

    /// Detach this node from its parent; a root stays as it is
    pub fn remove(&mut self) -> &mut Self {
        self.arena.detach(self.node_id);
        self
    }

    fn ensure_element(&self) -> Result<()> {
        let node = self.node();
        if node.is_element() {
            Ok(())
        } else {
            Err(MarkupError::InvalidNodeType {
                expected: NodeType::Element.to_string(),
                actual: node.node_type().to_string(),
            })
        }
    }
}
