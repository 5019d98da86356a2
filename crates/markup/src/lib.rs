//! Markup: in-memory HTML document builder
//!
//! Build a tree of HTML nodes from Emmet-like selectors, mutate it, query it
//! with a small CSS selector subset, and serialize it back to HTML.
//!
//! ## Core Design
//!
//! ```text
//! "div.a#b span" → tokenize → group → HtmlArena (owned nodes)
//!                                          ↓
//!                                   NodeId (u32) ← query_selector
//!                                          ↓
//!                                   HtmlSerializer → String
//! ```
//!
//! ```
//! use markup::{Document, ToStringOptions};
//!
//! let mut document = Document::new();
//! let post = document.arena_mut().create_element_with_text("div.post p", "Hello");
//! document.append_node_to_body(post)?;
//!
//! assert_eq!(document.query_selector(".post p")?.len(), 1);
//! assert_eq!(
//!     document.to_html(ToStringOptions::default())?,
//!     "<!DOCTYPE html><html><head></head><body>\
//!      <div class=\"post\"><p></p>Hello</div></body></html>"
//! );
//! # Ok::<(), markup::MarkupError>(())
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod query;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::{HtmlArena, NodeMut};
pub use document::Document;
pub use error::{MarkupError, Result};
pub use selector::{Comparator, SelectorToken, TokenGroup};
pub use serializer::{HtmlSerializer, StringFormatting, ToStringOptions};
pub use types::*;
