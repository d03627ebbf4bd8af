//! Header shadow and active navigation link, both driven by window scroll.

use crate::elements::SiteElements;
use anyhow::Result;
use dom::{NodeKey, View};
use page_handler::{EventTarget, EventType, Page};
use std::rc::Rc;

pub const STRONG_SHADOW: &str = "0 2px 20px rgba(0, 0, 0, 0.15)";
pub const DEFAULT_SHADOW: &str = "0 2px 20px rgba(0, 0, 0, 0.1)";

/// Shadow for the header at `scroll_y`. Exactly at the threshold keeps the default.
pub fn header_shadow(scroll_y: f64, threshold: f64) -> &'static str {
    if scroll_y > threshold {
        STRONG_SHADOW
    } else {
        DEFAULT_SHADOW
    }
}

/// Tracks which section is current and highlights the matching link.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    navbar: Option<NodeKey>,
    sections: Vec<NodeKey>,
    nav_links: Vec<NodeKey>,
}

impl ScrollTracker {
    pub fn new(elements: &SiteElements) -> Self {
        Self {
            navbar: elements.navbar,
            sections: elements.sections.clone(),
            nav_links: elements.nav_links.clone(),
        }
    }

    /// # Errors
    /// Propagates view mutation failures.
    pub fn update_shadow(&self, view: &mut dyn View, threshold: f64) -> Result<()> {
        let Some(navbar) = self.navbar else {
            return Ok(());
        };
        let shadow = header_shadow(view.scroll_y(), threshold);
        view.set_style_property(navbar, "box-shadow", shadow)
    }

    /// Id of the current section: the last one in document order whose top,
    /// less `section_offset`, the scroll position has reached.
    pub fn current_section(&self, view: &dyn View, section_offset: f64) -> Option<String> {
        let scroll_y = view.scroll_y();
        self.sections
            .iter()
            .filter(|section| {
                view.offset_top(**section)
                    .is_some_and(|top| scroll_y >= top - section_offset)
            })
            .filter_map(|section| view.attribute(*section, "id"))
            .next_back()
    }

    /// Un-highlight every link, then highlight the one pointing at `current`.
    /// With no current section only a bare `#` link matches.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn highlight(&self, view: &mut dyn View, current: Option<&str>) -> Result<()> {
        let wanted = format!("#{}", current.unwrap_or_default());
        for link in &self.nav_links {
            view.remove_class(*link, "active")?;
            if view.attribute(*link, "href").as_deref() == Some(wanted.as_str()) {
                view.add_class(*link, "active")?;
            }
        }
        Ok(())
    }
}

/// Register the shadow listener. The active-link listener is registered
/// separately so the two keep their place among the other scroll listeners.
pub fn install_shadow(page: &mut Page, tracker: &Rc<ScrollTracker>) {
    let tracker = Rc::clone(tracker);
    page.add_listener(EventTarget::Window, EventType::Scroll, move |ctx, _| {
        let threshold = ctx.config().shadow_threshold;
        tracker.update_shadow(ctx.view, threshold)
    });
}

pub fn install_active_link(page: &mut Page, tracker: &Rc<ScrollTracker>) {
    let tracker = Rc::clone(tracker);
    page.add_listener(EventTarget::Window, EventType::Scroll, move |ctx, _| {
        let offset = ctx.config().section_offset;
        let current = tracker.current_section(ctx.view, offset);
        tracker.highlight(ctx.view, current.as_deref())
    });
}
