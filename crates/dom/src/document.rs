//! In-memory document tree.
//!
//! Nodes live in an `indextree` arena and are addressed from the outside by
//! [`NodeKey`]. Only connected nodes produce [`DOMUpdate`] records; a detached
//! subtree is announced in one go when it is appended to the document.

use crate::view::{LayoutBox, Rect, ScrollBehavior, ScrollRequest, View, Viewport};
use crate::{DOMUpdate, NodeKey};
use anyhow::{Result, anyhow, bail};
use css_selectors::{ElementAdapter, SelectorList, matches_selector_list, parse_selector_list};
use css_style_attr::InlineStyle;
use indextree::{Arena, Node, NodeId};
use std::collections::HashMap;

/// Per-element state.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase tag name.
    pub(crate) tag: String,
    /// Attributes in insertion order. `class` and `style` are kept in sync
    /// with `classes` and `style`.
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) classes: Vec<String>,
    pub(crate) style: InlineStyle,
    /// Current value of a form control.
    pub(crate) value: String,
    /// Current checkedness of a checkbox or radio input.
    pub(crate) checked: bool,
    pub(crate) layout: LayoutBox,
}

impl ElementData {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    fn store_attr(&mut self, name: &str, value: String) {
        if let Some(slot) = self.attrs.iter_mut().find(|(attr_name, _)| attr_name == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Set an attribute, reparsing the derived class list and style block.
    pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
        let name_lc = name.to_ascii_lowercase();
        match name_lc.as_str() {
            "class" => {
                self.classes = value.split_ascii_whitespace().map(str::to_owned).collect();
                self.classes.dedup();
            }
            "style" => self.style = InlineStyle::parse(value),
            _ => {}
        }
        self.store_attr(&name_lc, value.to_owned());
    }

    fn sync_class_attr(&mut self) {
        let joined = self.classes.join(" ");
        self.store_attr("class", joined);
    }

    fn sync_style_attr(&mut self) {
        let css_text = self.style.to_css_text();
        self.store_attr("style", css_text);
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|token| token == class)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug)]
pub(crate) struct DomNode {
    pub(crate) key: NodeKey,
    pub(crate) kind: NodeKind,
}

/// The document tree plus the viewport state scripts can observe.
#[derive(Debug)]
pub struct Document {
    pub(crate) arena: Arena<DomNode>,
    pub(crate) root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    next_key: u64,
    viewport: Viewport,
    scroll_y: f64,
    scroll_request: Option<ScrollRequest>,
    pending: Vec<DOMUpdate>,
    loaded: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the document node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode {
            key: NodeKey::ROOT,
            kind: NodeKind::Document,
        });
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            ids,
            next_key: 1,
            viewport: Viewport::default(),
            scroll_y: 0.0,
            scroll_request: None,
            pending: Vec::new(),
            loaded: false,
        }
    }

    // ----- node bookkeeping -----

    fn mint(&mut self, kind: NodeKind) -> (NodeKey, NodeId) {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        let id = self.arena.new_node(DomNode { key, kind });
        self.ids.insert(key, id);
        (key, id)
    }

    pub(crate) fn node_id(&self, key: NodeKey) -> Result<NodeId> {
        self.ids
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("unknown node {key}"))
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.arena.get(id).map(|node| &node.get().kind)
    }

    pub(crate) fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.arena.get(id).map(|node| node.get().key)
    }

    pub(crate) fn element_at(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id)? {
            NodeKind::Element(data) => Some(data),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn element(&self, key: NodeKey) -> Option<&ElementData> {
        self.ids.get(&key).and_then(|id| self.element_at(*id))
    }

    pub(crate) fn element_mut(&mut self, key: NodeKey) -> Result<&mut ElementData> {
        let id = self.node_id(key)?;
        match self.arena.get_mut(id).map(|node| &mut node.get_mut().kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            _ => bail!("node {key} is not an element"),
        }
    }

    fn connected(&self, id: NodeId) -> bool {
        id.ancestors(&self.arena).any(|ancestor| ancestor == self.root)
    }

    fn position_in_parent(&self, id: NodeId) -> usize {
        id.preceding_siblings(&self.arena).count().saturating_sub(1)
    }

    /// Record an attribute change for the rendering surface if `key` is live.
    fn emit_attr(&mut self, key: NodeKey, name: &str) {
        let Some(&id) = self.ids.get(&key) else {
            return;
        };
        if !self.connected(id) {
            return;
        }
        let value = self
            .element_at(id)
            .and_then(|data| data.attr(name))
            .unwrap_or_default()
            .to_owned();
        self.pending.push(DOMUpdate::SetAttr {
            node: key,
            name: name.to_owned(),
            value,
        });
    }

    /// Announce a freshly connected subtree, parents before children.
    fn emit_subtree(&mut self, top: NodeId) {
        let updates = self.subtree_updates(top);
        self.pending.extend(updates);
    }

    /// Inserts describing the subtree under and including `top`.
    fn subtree_updates(&self, top: NodeId) -> Vec<DOMUpdate> {
        let mut updates = Vec::new();
        for id in top.descendants(&self.arena) {
            let Some(parent_key) = self
                .arena
                .get(id)
                .and_then(Node::parent)
                .and_then(|parent| self.key_of(parent))
            else {
                continue;
            };
            let pos = self.position_in_parent(id);
            let Some(node) = self.arena.get(id).map(Node::get) else {
                continue;
            };
            match &node.kind {
                NodeKind::Element(data) => {
                    updates.push(DOMUpdate::InsertElement {
                        parent: parent_key,
                        node: node.key,
                        tag: data.tag.clone(),
                        pos,
                    });
                    for (name, value) in &data.attrs {
                        updates.push(DOMUpdate::SetAttr {
                            node: node.key,
                            name: name.clone(),
                            value: value.clone(),
                        });
                    }
                }
                NodeKind::Text(text) => updates.push(DOMUpdate::InsertText {
                    parent: parent_key,
                    node: node.key,
                    text: text.clone(),
                    pos,
                }),
                NodeKind::Document => {}
            }
        }
        updates
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == child) {
            bail!("cannot append a node inside itself");
        }
        child.detach(&mut self.arena);
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| anyhow!("append failed: {err}"))?;
        if self.connected(child) {
            self.emit_subtree(child);
        }
        Ok(())
    }

    // ----- construction (used by the loader and by tests) -----

    /// Create an element with attributes and append it under `parent`.
    ///
    /// # Errors
    /// Fails when `parent` is unknown.
    pub fn insert_element(
        &mut self,
        parent: NodeKey,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeKey> {
        let parent_id = self.node_id(parent)?;
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attr(name, value);
        }
        let (key, id) = self.mint(NodeKind::Element(data));
        self.attach(parent_id, id)?;
        Ok(key)
    }

    /// Append a text node under `parent`.
    ///
    /// # Errors
    /// Fails when `parent` is unknown.
    pub fn insert_text(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey> {
        let parent_id = self.node_id(parent)?;
        let (key, id) = self.mint(NodeKind::Text(text.to_owned()));
        self.attach(parent_id, id)?;
        Ok(key)
    }

    /// Mark the end of parsing: seed form control values and notify mirrors.
    pub fn finish_loading(&mut self) {
        self.initialize_form_controls();
        self.loaded = true;
        self.pending.push(DOMUpdate::EndOfDocument);
    }

    /// Drain the updates recorded since the previous call.
    pub fn take_updates(&mut self) -> Vec<DOMUpdate> {
        core::mem::take(&mut self.pending)
    }

    /// Number of updates recorded and not yet drained.
    pub fn pending_updates(&self) -> usize {
        self.pending.len()
    }

    /// Updates that rebuild the current tree from scratch, for a mirror
    /// attached after loading.
    pub fn snapshot(&self) -> Vec<DOMUpdate> {
        let mut updates: Vec<DOMUpdate> = self
            .root
            .children(&self.arena)
            .flat_map(|child| self.subtree_updates(child))
            .collect();
        if self.loaded {
            updates.push(DOMUpdate::EndOfDocument);
        }
        updates
    }

    /// Every connected element in tree order.
    pub fn elements(&self) -> Vec<NodeKey> {
        self.root
            .descendants(&self.arena)
            .filter(|id| self.element_at(*id).is_some())
            .filter_map(|id| self.key_of(id))
            .collect()
    }

    /// Every connected element with the given tag, in tree order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeKey> {
        let needle = tag.to_ascii_lowercase();
        self.root
            .descendants(&self.arena)
            .filter(|id| self.element_at(*id).is_some_and(|data| data.tag == needle))
            .filter_map(|id| self.key_of(id))
            .collect()
    }

    // ----- geometry inputs from the layout engine -----

    /// Assign an element's border box in document coordinates.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    pub fn set_layout(&mut self, node: NodeKey, layout: LayoutBox) -> Result<()> {
        self.element_mut(node)?.layout = layout;
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Move the scroll position directly (user scrolling). Negative values clamp to 0.
    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.max(0.0);
    }

    /// Take the scroll a script asked for during the last event, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }

    // ----- selectors -----

    fn parse_selectors(selector: &str) -> Result<SelectorList> {
        parse_selector_list(selector).map_err(|err| anyhow!("invalid selector '{selector}': {err}"))
    }

    fn select(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeKey> {
        let adapter = Matcher(self);
        scope
            .descendants(&self.arena)
            .filter(|id| *id != scope)
            .filter(|id| self.element_at(*id).is_some())
            .filter(|id| matches_selector_list(&adapter, *id, list))
            .filter_map(|id| self.key_of(id))
            .collect()
    }

    fn first_by_tag(&self, tag: &str) -> Option<NodeKey> {
        self.root
            .descendants(&self.arena)
            .find(|id| self.element_at(*id).is_some_and(|data| data.tag == tag))
            .and_then(|id| self.key_of(id))
    }

    fn drop_keys(&mut self, top: NodeId) {
        let doomed: Vec<NodeKey> = top
            .descendants(&self.arena)
            .filter_map(|id| self.key_of(id))
            .collect();
        for key in doomed {
            self.ids.remove(&key);
        }
    }
}

/// Selector adapter over the arena.
struct Matcher<'doc>(&'doc Document);

impl ElementAdapter for Matcher<'_> {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.0
            .arena
            .get(element)
            .and_then(Node::parent)
            .filter(|parent| self.0.element_at(*parent).is_some())
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.0.element_at(element).map_or("", |data| data.tag.as_str())
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.0.element_at(element).and_then(|data| data.attr("id"))
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.0
            .element_at(element)
            .is_some_and(|data| data.has_class(class))
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.0.element_at(element).and_then(|data| data.attr(name))
    }
}

impl View for Document {
    fn element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.root
            .descendants(&self.arena)
            .find(|node| {
                self.element_at(*node)
                    .is_some_and(|data| data.attr("id") == Some(id))
            })
            .and_then(|node| self.key_of(node))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeKey>> {
        let list = Self::parse_selectors(selector)?;
        Ok(self.select(self.root, &list))
    }

    fn query_selector_all_within(&self, root: NodeKey, selector: &str) -> Result<Vec<NodeKey>> {
        let list = Self::parse_selectors(selector)?;
        let scope = self.node_id(root)?;
        Ok(self.select(scope, &list))
    }

    fn closest(&self, node: NodeKey, selector: &str) -> Result<Option<NodeKey>> {
        let list = Self::parse_selectors(selector)?;
        let start = self.node_id(node)?;
        let adapter = Matcher(self);
        Ok(start
            .ancestors(&self.arena)
            .filter(|id| self.element_at(*id).is_some())
            .find(|id| matches_selector_list(&adapter, *id, &list))
            .and_then(|id| self.key_of(id)))
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        let id = self.ids.get(&node)?;
        self.arena
            .get(*id)
            .and_then(Node::parent)
            .filter(|parent| self.element_at(*parent).is_some())
            .and_then(|parent| self.key_of(parent))
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.ids.get(&node) else {
            return Vec::new();
        };
        id.children(&self.arena)
            .filter_map(|child| self.key_of(child))
            .collect()
    }

    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let (Some(outer), Some(inner)) = (self.ids.get(&ancestor), self.ids.get(&node)) else {
            return false;
        };
        inner.ancestors(&self.arena).any(|id| id == *outer)
    }

    fn is_connected(&self, node: NodeKey) -> bool {
        self.ids.get(&node).is_some_and(|id| self.connected(*id))
    }

    fn tag_name(&self, node: NodeKey) -> Option<String> {
        self.element(node).map(|data| data.tag.clone())
    }

    fn body(&self) -> Option<NodeKey> {
        self.first_by_tag("body")
    }

    fn head(&self) -> Option<NodeKey> {
        self.first_by_tag("head")
    }

    fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.element(node).is_some_and(|data| data.has_class(class))
    }

    fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        let data = self.element_mut(node)?;
        if data.has_class(class) {
            return Ok(());
        }
        data.classes.push(class.to_owned());
        data.sync_class_attr();
        self.emit_attr(node, "class");
        Ok(())
    }

    fn remove_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        let data = self.element_mut(node)?;
        if !data.has_class(class) {
            return Ok(());
        }
        data.classes.retain(|token| token != class);
        data.sync_class_attr();
        self.emit_attr(node, "class");
        Ok(())
    }

    fn toggle_class(&mut self, node: NodeKey, class: &str) -> Result<bool> {
        if self.has_class(node, class) {
            self.remove_class(node, class)?;
            Ok(false)
        } else {
            self.add_class(node, class)?;
            Ok(true)
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|data| data.attr(&name.to_ascii_lowercase()))
            .map(str::to_owned)
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        let name_lc = name.to_ascii_lowercase();
        let data = self.element_mut(node)?;
        if data.attr(&name_lc) == Some(value) {
            return Ok(());
        }
        data.set_attr(&name_lc, value);
        self.emit_attr(node, &name_lc);
        Ok(())
    }

    fn style_property(&self, node: NodeKey, property: &str) -> Option<String> {
        self.element(node)
            .and_then(|data| data.style.get(property))
            .map(str::to_owned)
    }

    fn set_style_property(&mut self, node: NodeKey, property: &str, value: &str) -> Result<()> {
        let data = self.element_mut(node)?;
        if data.style.set(property, value) {
            data.sync_style_attr();
            self.emit_attr(node, "style");
        }
        Ok(())
    }

    fn set_css_text(&mut self, node: NodeKey, css_text: &str) -> Result<()> {
        let data = self.element_mut(node)?;
        data.style.replace(css_text);
        data.sync_style_attr();
        self.emit_attr(node, "style");
        Ok(())
    }

    fn text_content(&self, node: NodeKey) -> String {
        let Some(id) = self.ids.get(&node) else {
            return String::new();
        };
        id.descendants(&self.arena)
            .filter_map(|child| match self.kind(child) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn set_text_content(&mut self, node: NodeKey, text: &str) -> Result<()> {
        let id = self.node_id(node)?;
        let children: Vec<NodeKey> = id
            .children(&self.arena)
            .filter_map(|child| self.key_of(child))
            .collect();
        for child in children {
            self.remove_node(child)?;
        }
        if !text.is_empty() {
            self.insert_text(node, text)?;
        }
        Ok(())
    }

    fn value(&self, node: NodeKey) -> Option<String> {
        self.element(node).map(|data| data.value.clone())
    }

    fn set_value(&mut self, node: NodeKey, value: &str) -> Result<()> {
        self.set_control_value(node, value)
    }

    fn set_checked(&mut self, node: NodeKey, checked: bool) -> Result<()> {
        self.element_mut(node)?.checked = checked;
        Ok(())
    }

    fn form_entries(&self, form: NodeKey) -> Result<Vec<(String, String)>> {
        self.collect_form_entries(form)
    }

    fn reset_form(&mut self, form: NodeKey) -> Result<()> {
        self.reset_form_controls(form)
    }

    fn create_element(&mut self, tag: &str) -> NodeKey {
        self.mint(NodeKind::Element(ElementData::new(tag))).0
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_id = self.node_id(parent)?;
        let child_id = self.node_id(child)?;
        if self.connected(child_id) {
            self.pending.push(DOMUpdate::RemoveNode { node: child });
        }
        self.attach(parent_id, child_id)
    }

    fn remove_node(&mut self, node: NodeKey) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("the document node cannot be removed");
        }
        let id = self.node_id(node)?;
        if self.connected(id) {
            self.pending.push(DOMUpdate::RemoveNode { node });
        }
        self.drop_keys(id);
        id.remove_subtree(&mut self.arena);
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn offset_top(&self, node: NodeKey) -> Option<f64> {
        self.element(node).map(|data| data.layout.y)
    }

    fn bounding_rect(&self, node: NodeKey) -> Option<Rect> {
        self.element(node).map(|data| Rect {
            x: data.layout.x,
            y: data.layout.y - self.scroll_y,
            width: data.layout.width,
            height: data.layout.height,
        })
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_request = Some(ScrollRequest {
            top: top.max(0.0),
            behavior,
        });
    }
}
