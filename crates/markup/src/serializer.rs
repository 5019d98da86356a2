//! HTML serializer
//!
//! This module handles:
//! - Rendering a subtree as HTML, on one line or indented over many
//! - Escaping text runs and attribute values
//! - Producing a short outline of the element tree

use crate::arena::HtmlArena;
use crate::error::Result;
use crate::types::{HtmlNode, NodeId, NodeType};
use crate::utils::{escape_attribute, escape_text};
use serde::{Deserialize, Serialize};

const INDENT: &str = "    ";
const TREE_INDENT: &str = "   ";

/// Line layout of the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringFormatting {
    #[default]
    SingleLine,
    MultipleLines,
}

/// Serializer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToStringOptions {
    pub formatting: StringFormatting,
    /// End the outermost closing tag with a newline (multiline only)
    pub trailing_newline: bool,
    pub indent_level: u32,
    pub escape_content: bool,
}

impl Default for ToStringOptions {
    fn default() -> Self {
        Self {
            formatting: StringFormatting::SingleLine,
            trailing_newline: false,
            indent_level: 0,
            escape_content: true,
        }
    }
}

impl ToStringOptions {
    pub fn multiline() -> Self {
        Self {
            formatting: StringFormatting::MultipleLines,
            ..Self::default()
        }
    }

    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }

    pub fn with_indent_level(mut self, indent_level: u32) -> Self {
        self.indent_level = indent_level;
        self
    }

    pub fn with_escape_content(mut self, escape_content: bool) -> Self {
        self.escape_content = escape_content;
        self
    }

    fn is_multiline(&self) -> bool {
        self.formatting == StringFormatting::MultipleLines
    }

    fn indent(&self) -> String {
        if self.is_multiline() {
            INDENT.repeat(self.indent_level as usize)
        } else {
            String::new()
        }
    }

    /// Options for a child: one level deeper, newline and escaping forced
    fn for_child(&self) -> Self {
        Self {
            formatting: self.formatting,
            trailing_newline: true,
            indent_level: self.indent_level + 1,
            escape_content: true,
        }
    }
}

/// Markup tree serializer
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    options: ToStringOptions,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::with_options(ToStringOptions::default())
    }

    pub fn with_options(options: ToStringOptions) -> Self {
        Self { options }
    }

    /// Serialize the subtree rooted at `node_id`
    pub fn serialize(&self, arena: &HtmlArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, node_id, self.options, &mut output)?;
        Ok(output)
    }

    /// Serialize a single node recursively
    fn serialize_node(
        &self,
        arena: &HtmlArena,
        node_id: NodeId,
        options: ToStringOptions,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = options.indent();
        let newline = if options.is_multiline() { "\n" } else { "" };

        match node.node_type() {
            NodeType::Comment => {
                output.push_str(&indent);
                output.push_str("<!--");
                output.push_str(node.content());
                output.push_str("-->");
                output.push_str(newline);
            }
            NodeType::DocumentType => {
                output.push_str(&indent);
                output.push_str("<!DOCTYPE ");
                output.push_str(node.content());
                output.push('>');
                output.push_str(newline);
            }
            NodeType::Text => {
                output.push_str(&indent);
                if options.escape_content {
                    output.push_str(&escape_text(node.content()));
                } else {
                    output.push_str(node.content());
                }
                if options.trailing_newline {
                    output.push_str(newline);
                }
            }
            NodeType::Element => {
                output.push_str(&indent);
                Self::open_tag(node, output);
                output.push_str(newline);

                if node.has_closing_tag() {
                    let child_options = options.for_child();
                    for &child_id in node.children_ids() {
                        self.serialize_node(arena, child_id, child_options, output)?;
                    }

                    output.push_str(&indent);
                    output.push_str("</");
                    output.push_str(node.tag_name());
                    output.push('>');
                    if options.trailing_newline {
                        output.push_str(newline);
                    }
                }
            }
        }

        Ok(())
    }

    /// Format: `<tag class="a b" id="x" name="value" bare>`
    fn open_tag(node: &HtmlNode, output: &mut String) {
        output.push('<');
        output.push_str(node.tag_name());

        if !node.classes().is_empty() {
            output.push_str(" class=\"");
            output.push_str(&escape_attribute(&node.classes().join(" ")));
            output.push('"');
        }

        if let Some(id) = node.id() {
            output.push_str(" id=\"");
            output.push_str(&escape_attribute(id));
            output.push('"');
        }

        for (name, value) in node.attributes().iter() {
            output.push(' ');
            output.push_str(name);
            // a blank value is the same as a bare attribute
            if !value.is_empty() {
                output.push_str("=\"");
                output.push_str(&escape_attribute(value));
                output.push('"');
            }
        }

        output.push('>');
    }

    /// Outline of the element tree, one ` |_ tag.class` line per element
    pub fn tree(&self, arena: &HtmlArena, node_id: NodeId) -> Result<String> {
        let mut output = String::new();
        Self::tree_node(arena, node_id, 0, &mut output)?;
        Ok(output)
    }

    fn tree_node(arena: &HtmlArena, node_id: NodeId, depth: usize, output: &mut String) -> Result<()> {
        let node = arena.get(node_id)?;
        if !node.is_element() {
            return Ok(());
        }

        output.push_str(&TREE_INDENT.repeat(depth));
        output.push_str(" |_ ");
        output.push_str(node.tag_name());
        for class in node.classes() {
            output.push('.');
            output.push_str(class);
        }
        output.push('\n');

        for &child_id in node.children_ids() {
            Self::tree_node(arena, child_id, depth + 1, output)?;
        }
        Ok(())
    }
}
