//! Gallery tiles announce what a full photo view would show.

use crate::notifier::{Severity, show_message};
use anyhow::Result;
use dom::NodeKey;
use page_handler::{EventTarget, EventType, Page};

pub fn gallery_message(caption: &str) -> String {
    format!("This is where you'd see more photos of: {caption}")
}

/// Make every tile clickable.
///
/// # Errors
/// Propagates view mutation failures while styling the tiles.
pub fn install(page: &mut Page, items: &[NodeKey]) -> Result<()> {
    let tiles = items.to_vec();
    page.run_script(move |ctx| {
        tiles
            .iter()
            .try_for_each(|item| ctx.view.set_style_property(*item, "cursor", "pointer"))
    })?;
    for item in items {
        let item = *item;
        page.add_listener(EventTarget::Node(item), EventType::Click, move |ctx, _| {
            let Some(caption) = ctx
                .view
                .query_selector_all_within(item, ".gallery-placeholder p")?
                .first()
                .copied()
            else {
                return Ok(());
            };
            let text = gallery_message(&ctx.view.text_content(caption));
            show_message(ctx, &text, Severity::Success)?;
            Ok(())
        });
    }
    Ok(())
}
