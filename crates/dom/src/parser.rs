//! HTML loader: builds a [`Document`] from markup using html5ever.
//!
//! The markup is parsed into an `RcDom` first and then walked once, copying
//! elements, attributes and non-blank text into the arena. Every inserted
//! node is recorded as a `DOMUpdate`, so a mirror attached before loading
//! sees the whole page.

use crate::{Document, NodeKey};
use anyhow::Result;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

fn walk_tree(handle: &Handle, parent: NodeKey, doc: &mut Document) -> Result<()> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string();
            let attr_pairs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let borrowed: Vec<(&str, &str)> = attr_pairs
                .iter()
                .map(|(attr_name, value)| (attr_name.as_str(), value.as_str()))
                .collect();
            let node = doc.insert_element(parent, &tag, &borrowed)?;
            for child in handle.children.borrow().iter() {
                walk_tree(child, node, doc)?;
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                doc.insert_text(parent, &text)?;
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                walk_tree(child, parent, doc)?;
            }
        }
        _ => {
            // Comments, doctypes and processing instructions carry no state.
        }
    }
    Ok(())
}

impl Document {
    /// Parse a complete HTML page.
    ///
    /// # Errors
    /// Returns an error if the markup cannot be read.
    pub fn parse_html(html: &str) -> Result<Self> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                exact_errors: false,
                scripting_enabled: false,
                ..TreeBuilderOpts::default()
            },
            ..ParseOpts::default()
        };
        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut doc = Self::new();
        walk_tree(&dom.document, NodeKey::ROOT, &mut doc)?;
        doc.finish_loading();
        debug!("Loaded document with {} elements", doc.elements().len());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use crate::{DOMUpdate, Document, View as _};
    use anyhow::{Result, anyhow};

    #[test]
    fn parses_elements_attributes_and_text() -> Result<()> {
        let mut doc = Document::parse_html(
            r##"<!DOCTYPE html>
            <html><head><title>Farm</title></head>
            <body>
              <nav class="navbar"><a href="#tours" class="nav-link">Tours</a></nav>
              <form id="contactForm"><textarea name="message">Hi</textarea></form>
            </body></html>"##,
        )?;
        let link = doc
            .query_selector_all("a[href^=\"#\"]")?
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no link"))?;
        assert_eq!(doc.attribute(link, "href").as_deref(), Some("#tours"));
        assert!(doc.has_class(link, "nav-link"));
        assert_eq!(doc.text_content(link), "Tours");
        assert!(doc.head().is_some());

        let textarea = doc
            .query_selector_all("textarea")?
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no textarea"))?;
        assert_eq!(doc.value(textarea).as_deref(), Some("Hi"));

        let updates = doc.take_updates();
        assert_eq!(updates.last(), Some(&DOMUpdate::EndOfDocument));
        Ok(())
    }
}
