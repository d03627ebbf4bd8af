//! Mobile navigation: the menu panel, its three-bar icon and the dropdowns.
//!
//! The open flags live here and every visual change is applied from them, so
//! the menu class, icon bars and body scroll lock never drift apart.

use crate::elements::SiteElements;
use anyhow::Result;
use dom::{NodeKey, View};
use log::debug;
use page_handler::{EventTarget, EventType, Page};
use std::cell::RefCell;
use std::rc::Rc;

const ACTIVE: &str = "active";

/// Icon bar styles while the menu is open: the bars morph into an "X".
const OPEN_ICON: [(&str, &str); 3] = [
    ("transform", "rotate(45deg) translate(5px, 5px)"),
    ("opacity", "0"),
    ("transform", "rotate(-45deg) translate(7px, -6px)"),
];
const CLOSED_ICON: [(&str, &str); 3] = [
    ("transform", "none"),
    ("opacity", "1"),
    ("transform", "none"),
];

/// Open state of the mobile menu and its dropdowns.
#[derive(Debug)]
pub struct Navigation {
    toggle: NodeKey,
    menu: NodeKey,
    icon_bars: Vec<NodeKey>,
    dropdowns: Vec<NodeKey>,
    body: Option<NodeKey>,
    menu_open: bool,
    open_dropdown: Option<NodeKey>,
}

impl Navigation {
    /// Build the controller, or `None` when the page has no toggle or menu.
    ///
    /// # Errors
    /// Propagates view query failures.
    pub fn resolve(view: &dyn View, elements: &SiteElements) -> Result<Option<Self>> {
        let (Some(toggle), Some(menu)) = (elements.nav_toggle, elements.nav_menu) else {
            return Ok(None);
        };
        let open_dropdown = elements
            .dropdowns
            .iter()
            .copied()
            .find(|dropdown| view.has_class(*dropdown, ACTIVE));
        Ok(Some(Self {
            toggle,
            menu,
            icon_bars: view.query_selector_all_within(toggle, "span")?,
            dropdowns: elements.dropdowns.clone(),
            body: elements.body,
            menu_open: view.has_class(menu, ACTIVE),
            open_dropdown,
        }))
    }

    pub const fn is_open(&self) -> bool {
        self.menu_open
    }

    pub const fn open_dropdown(&self) -> Option<NodeKey> {
        self.open_dropdown
    }

    pub const fn menu(&self) -> NodeKey {
        self.menu
    }

    pub const fn toggle(&self) -> NodeKey {
        self.toggle
    }

    /// Flip the menu.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn toggle_menu(&mut self, view: &mut dyn View) -> Result<()> {
        if self.menu_open {
            self.close_menu(view)
        } else {
            self.menu_open = true;
            self.apply_menu(view)
        }
    }

    /// Close the menu and every dropdown. Closing a closed menu reapplies the
    /// closed styles and changes nothing else.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn close_menu(&mut self, view: &mut dyn View) -> Result<()> {
        self.menu_open = false;
        self.open_dropdown = None;
        self.apply_menu(view)?;
        self.apply_dropdowns(view)
    }

    /// Open `dropdown` (closing any other) or close it if it is the open one.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn toggle_dropdown(&mut self, view: &mut dyn View, dropdown: NodeKey) -> Result<()> {
        self.open_dropdown = if self.open_dropdown == Some(dropdown) {
            None
        } else {
            Some(dropdown)
        };
        self.apply_dropdowns(view)
    }

    fn apply_menu(&self, view: &mut dyn View) -> Result<()> {
        let icon = if self.menu_open {
            view.add_class(self.menu, ACTIVE)?;
            OPEN_ICON
        } else {
            view.remove_class(self.menu, ACTIVE)?;
            CLOSED_ICON
        };
        for (bar, (property, value)) in self.icon_bars.iter().zip(icon) {
            view.set_style_property(*bar, property, value)?;
        }
        if let Some(body) = self.body {
            let overflow = if self.menu_open { "hidden" } else { "" };
            view.set_style_property(body, "overflow", overflow)?;
        }
        Ok(())
    }

    fn apply_dropdowns(&self, view: &mut dyn View) -> Result<()> {
        for dropdown in &self.dropdowns {
            if Some(*dropdown) == self.open_dropdown {
                view.add_class(*dropdown, ACTIVE)?;
            } else {
                view.remove_class(*dropdown, ACTIVE)?;
            }
        }
        Ok(())
    }

    /// Whether `target` lies outside both the menu and its toggle.
    fn is_outside(&self, view: &dyn View, target: Option<NodeKey>) -> bool {
        target.is_none_or(|node| {
            !view.contains(self.menu, node) && !view.contains(self.toggle, node)
        })
    }
}

/// Register the navigation listeners. Returns the shared controller, or
/// `None` when the page has no mobile navigation.
///
/// # Errors
/// Propagates view query failures.
pub fn install(page: &mut Page, elements: &SiteElements) -> Result<Option<Rc<RefCell<Navigation>>>> {
    let Some(navigation) = Navigation::resolve(page.document(), elements)? else {
        debug!("navToggle or navMenu missing, navigation disabled");
        return Ok(None);
    };
    let toggle = navigation.toggle;
    let nav = Rc::new(RefCell::new(navigation));

    let state = Rc::clone(&nav);
    page.add_listener(EventTarget::Node(toggle), EventType::Click, move |ctx, _| {
        state.borrow_mut().toggle_menu(ctx.view)
    });

    for toggle_link in &elements.dropdown_toggles {
        let state = Rc::clone(&nav);
        let toggle_link = *toggle_link;
        page.add_listener(EventTarget::Node(toggle_link), EventType::Click, move |ctx, event| {
            if !ctx.is_narrow() {
                return Ok(());
            }
            event.prevent_default();
            let Some(dropdown) = ctx.view.closest(toggle_link, ".nav-dropdown")? else {
                return Ok(());
            };
            state.borrow_mut().toggle_dropdown(ctx.view, dropdown)
        });
    }

    for link in &elements.nav_links {
        if page.document().has_class(*link, "dropdown-toggle") {
            continue;
        }
        let state = Rc::clone(&nav);
        page.add_listener(EventTarget::Node(*link), EventType::Click, move |ctx, _| {
            state.borrow_mut().close_menu(ctx.view)
        });
    }

    for item in &elements.dropdown_items {
        let state = Rc::clone(&nav);
        page.add_listener(EventTarget::Node(*item), EventType::Click, move |ctx, _| {
            if ctx.is_narrow() {
                state.borrow_mut().close_menu(ctx.view)?;
            }
            Ok(())
        });
    }

    let state = Rc::clone(&nav);
    page.add_listener(EventTarget::Document, EventType::Click, move |ctx, event| {
        if !ctx.is_narrow() {
            return Ok(());
        }
        let mut navigation = state.borrow_mut();
        if navigation.is_open() && navigation.is_outside(ctx.view, event.target_node()) {
            navigation.close_menu(ctx.view)?;
        }
        Ok(())
    });

    Ok(Some(nav))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Document;

    fn menu_page() -> Result<(Document, SiteElements)> {
        let doc = Document::parse_html(
            r##"<html><body>
            <button id="navToggle"><span></span><span></span><span></span></button>
            <ul id="navMenu">
              <li class="nav-dropdown"><a class="nav-link dropdown-toggle" href="#a">A</a></li>
              <li class="nav-dropdown"><a class="nav-link dropdown-toggle" href="#b">B</a></li>
            </ul></body></html>"##,
        )?;
        let elements = SiteElements::resolve(&doc)?;
        Ok((doc, elements))
    }

    #[test]
    fn open_and_close_keep_icon_and_scroll_lock_in_step() -> Result<()> {
        let (mut doc, elements) = menu_page()?;
        let mut nav = Navigation::resolve(&doc, &elements)?.ok_or_else(|| anyhow::anyhow!("no nav"))?;
        let body = elements.body.ok_or_else(|| anyhow::anyhow!("no body"))?;

        nav.toggle_menu(&mut doc)?;
        assert!(nav.is_open());
        assert_eq!(doc.style_property(body, "overflow").as_deref(), Some("hidden"));
        let bars = doc.query_selector_all("#navToggle span")?;
        assert_eq!(doc.style_property(bars[1], "opacity").as_deref(), Some("0"));

        let dropdown = elements.dropdowns[0];
        nav.toggle_dropdown(&mut doc, dropdown)?;
        nav.toggle_menu(&mut doc)?;
        assert!(!nav.is_open());
        assert_eq!(nav.open_dropdown(), None);
        assert!(!doc.has_class(dropdown, ACTIVE));
        assert_eq!(doc.style_property(body, "overflow"), None);
        assert_eq!(doc.style_property(bars[0], "transform").as_deref(), Some("none"));
        Ok(())
    }

    #[test]
    fn opening_a_dropdown_closes_the_other() -> Result<()> {
        let (mut doc, elements) = menu_page()?;
        let mut nav = Navigation::resolve(&doc, &elements)?.ok_or_else(|| anyhow::anyhow!("no nav"))?;
        let (first, second) = (elements.dropdowns[0], elements.dropdowns[1]);
        nav.toggle_dropdown(&mut doc, first)?;
        nav.toggle_dropdown(&mut doc, second)?;
        assert!(!doc.has_class(first, ACTIVE));
        assert!(doc.has_class(second, ACTIVE));
        nav.toggle_dropdown(&mut doc, second)?;
        assert_eq!(nav.open_dropdown(), None);
        Ok(())
    }
}
