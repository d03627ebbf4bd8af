//! A replica of the document rebuilt from `DOMUpdate` batches.
//!
//! The rendering surface never touches the [`crate::Document`] directly; it
//! keeps one of these in sync through a [`crate::DOMMirror`] and reads tags,
//! attributes and text from it.

use crate::{DOMSubscriber, DOMUpdate, NodeKey};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A mirrored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeKey>,
    },
    Text(String),
}

/// Mirrored tree state.
#[derive(Debug)]
pub struct MirrorState {
    nodes: HashMap<NodeKey, MirrorNode>,
    parent_by_child: HashMap<NodeKey, NodeKey>,
    loaded: bool,
}

impl Default for MirrorState {
    fn default() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeKey::ROOT,
            MirrorNode::Element {
                tag: "#document".to_owned(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            parent_by_child: HashMap::new(),
            loaded: false,
        }
    }
}

impl MirrorState {
    fn insert(&mut self, parent: NodeKey, node: NodeKey, pos: usize, value: MirrorNode) -> Result<()> {
        let Some(MirrorNode::Element { children, .. }) = self.nodes.get_mut(&parent) else {
            bail!("mirror has no element {parent}");
        };
        let at = pos.min(children.len());
        children.insert(at, node);
        self.parent_by_child.insert(node, parent);
        self.nodes.insert(node, value);
        Ok(())
    }

    fn remove_recursively(&mut self, node: NodeKey) {
        if let Some(MirrorNode::Element { children, .. }) = self.nodes.remove(&node) {
            for child in children {
                self.remove_recursively(child);
            }
        }
        if let Some(parent) = self.parent_by_child.remove(&node)
            && let Some(MirrorNode::Element { children, .. }) = self.nodes.get_mut(&parent)
        {
            children.retain(|child| *child != node);
        }
    }

    pub fn get(&self, node: NodeKey) -> Option<&MirrorNode> {
        self.nodes.get(&node)
    }

    /// Whether `EndOfDocument` has been seen.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        match self.nodes.get(&node)? {
            MirrorNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr_name, _)| attr_name == name)
                .map(|(_, value)| value.as_str()),
            MirrorNode::Text(_) => None,
        }
    }

    /// Mirrored elements carrying the class token, in tree order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.walk(NodeKey::ROOT, &mut |key, node| {
            if let MirrorNode::Element { attrs, .. } = node
                && attrs.iter().any(|(name, value)| {
                    name == "class" && value.split_ascii_whitespace().any(|token| token == class)
                })
            {
                out.push(key);
            }
        });
        out
    }

    pub fn text_content(&self, node: NodeKey) -> String {
        let mut out = String::new();
        self.walk(node, &mut |_, mirrored| {
            if let MirrorNode::Text(text) = mirrored {
                out.push_str(text);
            }
        });
        out
    }

    fn walk(&self, node: NodeKey, visit: &mut dyn FnMut(NodeKey, &MirrorNode)) {
        let Some(mirrored) = self.nodes.get(&node) else {
            return;
        };
        visit(node, mirrored);
        if let MirrorNode::Element { children, .. } = mirrored {
            for child in children {
                self.walk(*child, visit);
            }
        }
    }
}

/// A `DOMSubscriber` that updates a shared [`MirrorState`].
#[derive(Clone)]
pub struct MirrorIndex {
    inner: Arc<Mutex<MirrorState>>,
}

impl MirrorIndex {
    /// Create a subscriber and return it with a handle to its shared state.
    pub fn new() -> (Self, Arc<Mutex<MirrorState>>) {
        let inner = Arc::new(Mutex::new(MirrorState::default()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            inner,
        )
    }
}

impl DOMSubscriber for MirrorIndex {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("MirrorState poisoned"))?;
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => guard.insert(
                parent,
                node,
                pos,
                MirrorNode::Element {
                    tag,
                    attrs: Vec::new(),
                    children: Vec::new(),
                },
            )?,
            DOMUpdate::InsertText {
                parent,
                node,
                text,
                pos,
            } => guard.insert(parent, node, pos, MirrorNode::Text(text))?,
            DOMUpdate::SetAttr { node, name, value } => {
                let Some(MirrorNode::Element { attrs, .. }) = guard.nodes.get_mut(&node) else {
                    bail!("attribute set on unmirrored node {node}");
                };
                if let Some(slot) = attrs.iter_mut().find(|(attr_name, _)| *attr_name == name) {
                    slot.1 = value;
                } else {
                    attrs.push((name, value));
                }
            }
            DOMUpdate::RemoveNode { node } => guard.remove_recursively(node),
            DOMUpdate::EndOfDocument => guard.loaded = true,
        }
        Ok(())
    }
}
