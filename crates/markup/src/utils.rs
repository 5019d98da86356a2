//! Utility functions for markup processing

use crate::arena::HtmlArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};

/// Escape a text run: `&`, `<` and `>` only, quotes are left alone
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Escape an attribute value: `&`, `<`, `>`, `"` and `'`
pub fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

fn escape(input: &str, quotes: bool) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if quotes => output.push_str("&quot;"),
            '\'' if quotes => output.push_str("&apos;"),
            _ => output.push(c),
        }
    }
    output
}

/// Concatenated text of every text node under `node_id`, unescaped
pub fn text_content(arena: &HtmlArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if node.node_type() == NodeType::Text {
            text.push_str(node.content());
        }
        Ok(())
    })?;

    Ok(text)
}
