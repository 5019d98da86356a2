//! HTML5 document wrapper
//!
//! A fixed shape around the arena:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//!   <head>...</head>
//!   <body>...</body>
//! </html>
//! ```

use crate::arena::{HtmlArena, NodeMut};
use crate::error::Result;
use crate::query;
use crate::serializer::{HtmlSerializer, ToStringOptions};
use crate::types::NodeId;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Document {
    arena: HtmlArena,
    doctype: NodeId,
    html: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Document {
    /// Empty HTML5 document with a head and body
    pub fn new() -> Self {
        let mut arena = HtmlArena::new();
        let doctype = arena.create_doctype("html");
        let html = arena.create_element("html");
        let head = arena.create_element("head");
        let body = arena.create_element("body");

        let mut document = Self {
            arena,
            doctype,
            html,
            head,
            body,
        };
        document.link_skeleton();
        document
    }

    fn link_skeleton(&mut self) {
        self.arena.link(self.html, self.head);
        self.arena.link(self.html, self.body);
    }

    pub fn arena(&self) -> &HtmlArena {
        &self.arena
    }

    /// Arena for creating nodes to append to this document
    pub fn arena_mut(&mut self) -> &mut HtmlArena {
        &mut self.arena
    }

    pub fn doctype(&self) -> NodeId {
        self.doctype
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn html_mut(&mut self) -> Result<NodeMut<'_>> {
        self.arena.node_mut(self.html)
    }

    pub fn head_mut(&mut self) -> Result<NodeMut<'_>> {
        self.arena.node_mut(self.head)
    }

    pub fn body_mut(&mut self) -> Result<NodeMut<'_>> {
        self.arena.node_mut(self.body)
    }

    pub fn append_node_to_head(&mut self, node_id: NodeId) -> Result<()> {
        self.head_mut()?.append_child(node_id)?;
        Ok(())
    }

    pub fn append_node_to_body(&mut self, node_id: NodeId) -> Result<()> {
        self.body_mut()?.append_child(node_id)?;
        Ok(())
    }

    /// Doctype followed by the `html` element
    pub fn to_html(&self, options: ToStringOptions) -> Result<String> {
        let serializer = HtmlSerializer::with_options(options);
        let mut output = serializer.serialize(&self.arena, self.doctype)?;
        output.push_str(&serializer.serialize(&self.arena, self.html)?);
        Ok(output)
    }

    /// Matches anywhere under `html`
    pub fn query_selector(&self, selector: &str) -> Result<Vec<NodeId>> {
        query::query_selector(&self.arena, self.html, selector)
    }

    /// Element outline, starting with `html`
    pub fn to_tree(&self) -> Result<String> {
        HtmlSerializer::new().tree(&self.arena, self.html)
    }

    /// Serialize and write the whole document to `path`
    pub fn write_to_file(&self, path: impl AsRef<Path>, options: ToStringOptions) -> Result<()> {
        let path = path.as_ref();
        let html = self.to_html(options)?;
        std::fs::write(path, html.as_bytes())?;
        tracing::info!("wrote {} bytes to {}", html.len(), path.display());
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let html = self.to_html(ToStringOptions::default()).map_err(|_| fmt::Error)?;
        f.write_str(&html)
    }
}
