//! Transient confirmation banners.
//!
//! Each call creates its own banner and its own `slideDown` keyframes rule;
//! banners are neither deduplicated nor queued. After the display time the
//! banner plays its exit animation and both nodes are removed.

use anyhow::Result;
use dom::{NodeKey, View};
use log::debug;
use page_handler::HostContext;

const SLIDE_DOWN_KEYFRAMES: &str = "
        @keyframes slideDown {
            from {
                opacity: 0;
                transform: translateX(-50%) translateY(-20px);
            }
            to {
                opacity: 1;
                transform: translateX(-50%) translateY(0);
            }
        }
    ";

/// Banner color scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Error,
}

impl Severity {
    pub const fn background(self) -> &'static str {
        match self {
            Self::Success => "#4a7c3c",
            Self::Error => "#e74c3c",
        }
    }
}

/// Inline style of a banner.
pub fn banner_css(severity: Severity) -> String {
    format!(
        "position: fixed; top: 100px; left: 50%; transform: translateX(-50%); \
         background: {}; color: white; padding: 1.5rem 2.5rem; border-radius: 10px; \
         box-shadow: 0 10px 40px rgba(0, 0, 0, 0.2); z-index: 10000; max-width: 90%; \
         text-align: center; font-weight: 500; animation: slideDown 0.3s ease;",
        severity.background()
    )
}

/// Nodes making up one banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Banner {
    pub message: NodeKey,
    /// Keyframes rule, absent when the page has no head.
    pub style: Option<NodeKey>,
}

fn detach(view: &mut dyn View, node: NodeKey) {
    if let Err(err) = view.remove_node(node) {
        debug!("banner node {node} already gone: {err:#}");
    }
}

/// Show `message` and schedule its removal. Returns `None` when the page has
/// no body to show it in.
///
/// # Errors
/// Propagates view mutation failures while building the banner.
pub fn show_message(ctx: &mut HostContext<'_>, message: &str, severity: Severity) -> Result<Option<Banner>> {
    let Some(body) = ctx.view.body() else {
        debug!("no body, banner '{message}' not shown");
        return Ok(None);
    };
    let banner = ctx.view.create_element("div");
    ctx.view.set_text_content(banner, message)?;
    ctx.view.set_css_text(banner, &banner_css(severity))?;

    let style = match ctx.view.head() {
        Some(head) => {
            let style = ctx.view.create_element("style");
            ctx.view.set_text_content(style, SLIDE_DOWN_KEYFRAMES)?;
            ctx.view.append_child(head, style)?;
            Some(style)
        }
        None => None,
    };
    ctx.view.append_child(body, banner)?;

    let exit = ctx.config().banner_exit();
    ctx.set_timeout(ctx.config().banner_display(), move |later| {
        if let Err(err) = later
            .view
            .set_style_property(banner, "animation", "slideDown 0.3s ease reverse")
        {
            debug!("banner {banner} gone before its exit: {err:#}");
        }
        later.set_timeout(exit, move |last| {
            detach(last.view, banner);
            if let Some(style) = style {
                detach(last.view, style);
            }
            Ok(())
        });
        Ok(())
    });
    Ok(Some(Banner {
        message: banner,
        style,
    }))
}
