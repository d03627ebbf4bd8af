//! In-page anchor links scroll smoothly, leaving room for the fixed header.

use crate::elements::SiteElements;
use dom::{ScrollBehavior, View};
use log::debug;
use page_handler::{EventTarget, EventType, Page};

/// Where an anchor's fragment should scroll to, or `None` when the fragment
/// is empty, not a valid selector, or matches nothing.
pub fn scroll_target(view: &dyn View, href: &str, anchor_offset: f64) -> Option<f64> {
    if href.len() < 2 {
        return None;
    }
    let target = match view.query_selector_all(href) {
        Ok(found) => found.first().copied()?,
        Err(err) => {
            debug!("anchor {href} is not a usable selector: {err:#}");
            return None;
        }
    };
    view.offset_top(target).map(|top| top - anchor_offset)
}

pub fn install(page: &mut Page, elements: &SiteElements) {
    for anchor in &elements.anchors {
        let anchor = *anchor;
        page.add_listener(EventTarget::Node(anchor), EventType::Click, move |ctx, event| {
            event.prevent_default();
            let href = ctx.view.attribute(anchor, "href").unwrap_or_default();
            let offset = ctx.config().anchor_offset;
            if let Some(top) = scroll_target(ctx.view, &href, offset) {
                ctx.view.scroll_to(top, ScrollBehavior::Smooth);
            }
            Ok(())
        });
    }
}
