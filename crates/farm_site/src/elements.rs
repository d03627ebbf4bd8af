//! Elements the interactions work on, resolved once when the site is installed.

use anyhow::Result;
use dom::{NodeKey, View};

/// Cards revealed by the intersection watcher.
pub const INTERSECTION_REVEAL_SELECTOR: &str =
    ".practice-card, .about-card, .grow-card, .practice-detailed-card, .gallery-item";
/// Blocks revealed once they pass the reveal point while scrolling.
pub const SCROLL_REVEAL_SELECTOR: &str = ".section-header, .integrated-farming, .tour-highlights";

/// Named elements and selector matches from the loaded page.
///
/// Optional elements are `None` or empty when the markup lacks them; the
/// behavior that needs them is then skipped.
#[derive(Clone, Debug, Default)]
pub struct SiteElements {
    pub nav_toggle: Option<NodeKey>,
    pub nav_menu: Option<NodeKey>,
    /// Every `.nav-link`, dropdown toggles included.
    pub nav_links: Vec<NodeKey>,
    pub dropdowns: Vec<NodeKey>,
    pub dropdown_toggles: Vec<NodeKey>,
    pub dropdown_items: Vec<NodeKey>,
    /// Links pointing at an in-page fragment.
    pub anchors: Vec<NodeKey>,
    pub navbar: Option<NodeKey>,
    /// Sections with an id, in document order.
    pub sections: Vec<NodeKey>,
    pub booking_form: Option<NodeKey>,
    pub contact_form: Option<NodeKey>,
    pub date_input: Option<NodeKey>,
    pub gallery_items: Vec<NodeKey>,
    pub intersection_reveals: Vec<NodeKey>,
    pub scroll_reveals: Vec<NodeKey>,
    pub body: Option<NodeKey>,
    pub head: Option<NodeKey>,
}

impl SiteElements {
    /// Resolve every element and selector against `view`.
    ///
    /// # Errors
    /// Fails only if one of the fixed selectors is rejected by the view.
    pub fn resolve(view: &dyn View) -> Result<Self> {
        let first = |selector: &str| -> Result<Option<NodeKey>> {
            Ok(view.query_selector_all(selector)?.first().copied())
        };
        Ok(Self {
            nav_toggle: view.element_by_id("navToggle"),
            nav_menu: view.element_by_id("navMenu"),
            nav_links: view.query_selector_all(".nav-link")?,
            dropdowns: view.query_selector_all(".nav-dropdown")?,
            dropdown_toggles: view.query_selector_all(".nav-dropdown .dropdown-toggle")?,
            dropdown_items: view.query_selector_all(".dropdown-menu a")?,
            anchors: view.query_selector_all("a[href^=\"#\"]")?,
            navbar: first(".navbar")?,
            sections: view.query_selector_all("section[id]")?,
            booking_form: view.element_by_id("bookingForm"),
            contact_form: view.element_by_id("contactForm"),
            date_input: view.element_by_id("date"),
            gallery_items: view.query_selector_all(".gallery-item")?,
            intersection_reveals: view.query_selector_all(INTERSECTION_REVEAL_SELECTOR)?,
            scroll_reveals: view.query_selector_all(SCROLL_REVEAL_SELECTOR)?,
            body: view.body(),
            head: view.head(),
        })
    }
}
