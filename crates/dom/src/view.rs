//! The narrow surface interaction code is written against.
//!
//! Geometry is an input: the layout engine (or a test) assigns each element a
//! [`LayoutBox`] in document coordinates, and the view derives offsets and
//! viewport-relative rectangles from it and the current scroll position.

use crate::NodeKey;
use anyhow::Result;

/// Viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// Border box of an element in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    /// A full-width block at `y` with the given height.
    pub const fn block(y: f64, width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y,
            width,
            height,
        }
    }
}

/// A rectangle relative to the viewport's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles, `None` when they do not touch.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (left <= right && top <= bottom).then(|| Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// How a script-requested scroll should animate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

/// A scroll requested by script, applied by the page after the current event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Everything the site interactions may read from or do to the document.
///
/// Mutating calls on a node that was removed (or never existed) fail, which
/// lets delayed callbacks notice that their target is gone.
pub trait View {
    // Structure and queries.
    fn element_by_id(&self, id: &str) -> Option<NodeKey>;
    /// # Errors
    /// Fails on selector syntax errors.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeKey>>;
    /// # Errors
    /// Fails on selector syntax errors or an unknown root.
    fn query_selector_all_within(&self, root: NodeKey, selector: &str) -> Result<Vec<NodeKey>>;
    /// # Errors
    /// Fails on selector syntax errors or an unknown node.
    fn closest(&self, node: NodeKey, selector: &str) -> Result<Option<NodeKey>>;
    fn parent(&self, node: NodeKey) -> Option<NodeKey>;
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool;
    fn is_connected(&self, node: NodeKey) -> bool;
    fn tag_name(&self, node: NodeKey) -> Option<String>;
    fn body(&self) -> Option<NodeKey>;
    fn head(&self) -> Option<NodeKey>;

    // Classes.
    fn has_class(&self, node: NodeKey, class: &str) -> bool;
    /// # Errors
    /// Fails for unknown nodes.
    fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()>;
    /// # Errors
    /// Fails for unknown nodes.
    fn remove_class(&mut self, node: NodeKey, class: &str) -> Result<()>;
    /// Flip `class`, returning whether it is now present.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    fn toggle_class(&mut self, node: NodeKey, class: &str) -> Result<bool>;

    // Attributes.
    fn attribute(&self, node: NodeKey, name: &str) -> Option<String>;
    /// # Errors
    /// Fails for unknown nodes.
    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()>;

    // Inline style.
    fn style_property(&self, node: NodeKey, property: &str) -> Option<String>;
    /// An empty `value` removes the property.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    fn set_style_property(&mut self, node: NodeKey, property: &str, value: &str) -> Result<()>;
    /// # Errors
    /// Fails for unknown nodes.
    fn remove_style_property(&mut self, node: NodeKey, property: &str) -> Result<()> {
        self.set_style_property(node, property, "")
    }
    /// # Errors
    /// Fails for unknown nodes.
    fn set_css_text(&mut self, node: NodeKey, css_text: &str) -> Result<()>;

    // Text.
    fn text_content(&self, node: NodeKey) -> String;
    /// # Errors
    /// Fails for unknown nodes.
    fn set_text_content(&mut self, node: NodeKey, text: &str) -> Result<()>;

    // Forms.
    fn value(&self, node: NodeKey) -> Option<String>;
    /// # Errors
    /// Fails for unknown nodes.
    fn set_value(&mut self, node: NodeKey, value: &str) -> Result<()>;
    /// # Errors
    /// Fails for unknown nodes.
    fn set_checked(&mut self, node: NodeKey, checked: bool) -> Result<()>;
    /// Name/value pairs of the form's successful controls, in tree order.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    fn form_entries(&self, form: NodeKey) -> Result<Vec<(String, String)>>;
    /// Restore every control of the form to its default state.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    fn reset_form(&mut self, form: NodeKey) -> Result<()>;

    // Nodes.
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeKey;
    /// # Errors
    /// Fails for unknown nodes or when `child` is an ancestor of `parent`.
    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()>;
    /// Detach and drop `node` with its subtree.
    ///
    /// # Errors
    /// Fails for unknown nodes.
    fn remove_node(&mut self, node: NodeKey) -> Result<()>;

    // Geometry.
    fn viewport(&self) -> Viewport;
    fn scroll_y(&self) -> f64;
    /// Distance from the document top to the element's border box.
    fn offset_top(&self, node: NodeKey) -> Option<f64>;
    /// Border box relative to the viewport.
    fn bounding_rect(&self, node: NodeKey) -> Option<Rect>;
    /// Ask for the page to scroll. Applied once the current event finishes.
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);
}
