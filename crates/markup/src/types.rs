//! Core type definitions for the markup tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (most elements have few classes/children)
//! 3. Keep structural fields private so the arena owns the parent/child links

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Node kind, numbered after the DOM node types it mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    DocumentType = 10,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::Comment => "comment",
            NodeType::DocumentType => "doctype",
        };
        f.write_str(name)
    }
}

/// Element attributes with unique keys, iterated in insertion order
///
/// Never holds `class` or `id`; those live on the node itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: SmallVec<[(String, String); 4]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute, keeping its original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The markup tree node
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers; `parent_id` never owns anything
/// - Content vs. element fields are selected by `node_type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlNode {
    node_id: NodeId,
    node_type: NodeType,
    close_tag: bool,

    // Navigation indices, maintained by the arena
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) children_ids: SmallVec<[NodeId; 4]>,

    tag_name: String,
    classes: SmallVec<[String; 2]>,
    id: Option<String>,
    attributes: Attributes,

    // Text run, doctype token or comment body
    content: String,
}

impl HtmlNode {
    /// Create a detached node of the given type
    pub(crate) fn new(node_id: NodeId, node_type: NodeType) -> Self {
        Self {
            node_id,
            node_type,
            close_tag: true,
            parent_id: None,
            children_ids: SmallVec::new(),
            tag_name: String::new(),
            classes: SmallVec::new(),
            id: None,
            attributes: Attributes::new(),
            content: String::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn children_ids(&self) -> &[NodeId] {
        &self.children_ids
    }

    /// Tag name; empty for non-element nodes
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn has_closing_tag(&self) -> bool {
        self.close_tag
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|class| class == name)
    }

    /// Raw attribute map lookup (`class`/`id` are not in the map)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Attribute value as it would be rendered, `""` when absent
    pub fn get_attribute(&self, name: &str) -> String {
        match name {
            "class" => self.classes.join(" "),
            "id" => self.id.clone().unwrap_or_default(),
            _ => self.attributes.get(name).unwrap_or_default().to_string(),
        }
    }

    /// CSS-like selector string: `tag.class1.class2#id`
    pub fn selector(&self) -> String {
        let mut selector = self.tag_name.clone();
        for class in &self.classes {
            selector.push('.');
            selector.push_str(class);
        }
        if let Some(id) = &self.id {
            selector.push('#');
            selector.push_str(id);
        }
        selector
    }

    pub fn set_type(&mut self, node_type: NodeType) -> &mut Self {
        self.node_type = node_type;
        self
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn set_tag_name(&mut self, tag_name: impl Into<String>) -> &mut Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Set the id; an empty id clears it
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
        self
    }

    pub fn add_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute; `class` replaces the class list, `id` the id
    ///
    /// An empty `id` clears it, so no `id=""` or trailing `#` is produced.
    ///
    /// Runs of spaces in a `class` value never produce empty classes.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        match name {
            "id" => {
                self.set_id(value);
            }
            "class" => {
                self.classes = value
                    .split(' ')
                    .filter(|class| !class.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => self.attributes.insert(name, value),
        }
        self
    }

    /// Remove the first exact match of `class`, or append it
    pub fn toggle_class(&mut self, class: &str) -> &mut Self {
        match self.classes.iter().position(|existing| existing == class) {
            Some(index) => {
                self.classes.remove(index);
            }
            None => self.classes.push(class.to_string()),
        }
        self
    }

    pub fn use_closing_tag(&mut self, close: bool) -> &mut Self {
        self.close_tag = close;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str) -> HtmlNode {
        let mut node = HtmlNode::new(0, NodeType::Element);
        node.set_tag_name(tag);
        node
    }

    #[test]
    fn test_node_type_numbering() {
        assert_eq!(NodeType::Element as u8, 1);
        assert_eq!(NodeType::Text as u8, 3);
        assert_eq!(NodeType::Comment as u8, 8);
        assert_eq!(NodeType::DocumentType as u8, 10);
    }

    #[test]
    fn test_class_and_id_are_not_attributes() {
        let mut node = element("p");
        node.set_attribute("class", "a b")
            .set_attribute("id", "main")
            .set_attribute("title", "hello");

        assert_eq!(node.classes(), &["a".to_string(), "b".to_string()]);
        assert_eq!(node.id(), Some("main"));
        assert_eq!(node.attributes().len(), 1);
        assert_eq!(node.attr("class"), None);
        assert_eq!(node.get_attribute("class"), "a b");
        assert_eq!(node.get_attribute("id"), "main");
        assert_eq!(node.get_attribute("title"), "hello");
        assert_eq!(node.get_attribute("missing"), "");
    }

    #[test]
    fn test_empty_id_clears_it() {
        let mut node = element("p");
        node.set_attribute("id", "main");
        node.set_attribute("id", "");

        assert_eq!(node.id(), None);
        assert_eq!(node.get_attribute("id"), "");
        assert_eq!(node.selector(), "p");
    }

    #[test]
    fn test_toggle_class_removes_first_duplicate_only() {
        let mut node = element("p");
        node.add_class("a").add_class("b").add_class("a");

        node.toggle_class("a");
        assert_eq!(node.classes(), &["b", "a"]);

        node.toggle_class("a");
        assert_eq!(node.classes(), &["b"]);
    }

    #[test]
    fn test_toggle_missing_class_round_trips() {
        let mut node = element("p");
        node.add_class("class");
        let before = node.classes().to_vec();

        node.toggle_class("paragraph").toggle_class("paragraph");
        assert_eq!(node.classes(), before.as_slice());
    }

    #[test]
    fn test_selector_string() {
        let mut node = element("p");
        node.add_class("class").add_class("names").set_id("identify");
        assert_eq!(node.selector(), "p.class.names#identify");

        assert_eq!(element("div").selector(), "div");
    }

    #[test]
    fn test_attribute_overwrite_keeps_position() {
        let mut attrs = Attributes::new();
        attrs.insert("src", "a.png");
        attrs.insert("alt", "an image");
        attrs.insert("src", "b.png");

        let collected: Vec<_> = attrs.iter().collect();
        assert_eq!(collected, vec![("src", "b.png"), ("alt", "an image")]);
        assert_eq!(attrs.len(), 2);
    }
}
