//! Fade the page in once it has loaded.

use page_handler::{EventTarget, EventType, Page};

pub fn install(page: &mut Page) {
    page.add_listener(EventTarget::Window, EventType::Load, |ctx, _| {
        let Some(body) = ctx.view.body() else {
            return Ok(());
        };
        ctx.view.set_style_property(body, "opacity", "0")?;
        let delay = ctx.config().load_fade_delay();
        ctx.set_timeout(delay, move |later| {
            later
                .view
                .set_style_property(body, "transition", "opacity 0.5s ease")?;
            later.view.set_style_property(body, "opacity", "1")
        });
        Ok(())
    });
}
