//! Interactions for the Yellow Flowers Organic Farm site.
//!
//! [`install`] wires every behavior into a loaded [`Page`]: the mobile
//! navigation, smooth anchor scrolling, the header shadow and active link,
//! reveal-on-scroll, the booking and contact forms, gallery prompts, the
//! booking date minimum and the load fade-in.

pub mod booking_date;
pub mod elements;
pub mod forms;
pub mod gallery;
pub mod loading;
pub mod navigation;
pub mod notifier;
pub mod reveal;
pub mod scroll_tracker;
pub mod smooth_scroll;

use anyhow::Result;
use dom::Console;
use elements::SiteElements;
use log::debug;
use navigation::Navigation;
use page_handler::Page;
use reveal::VisibilityWatcher;
use scroll_tracker::ScrollTracker;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info_span;

pub const WELCOME: &str = "Welcome to Yellow Flowers Organic Farm";
pub const TAGLINE: &str = "Growing Organically. Farming Sustainably. Living Naturally.";

/// Handles to the state of an installed site.
pub struct Site {
    pub elements: SiteElements,
    /// Absent when the page has no mobile navigation.
    pub navigation: Option<Rc<RefCell<Navigation>>>,
    pub scroll_tracker: Rc<ScrollTracker>,
    pub card_reveal: Rc<RefCell<VisibilityWatcher>>,
    pub block_reveal: Rc<RefCell<VisibilityWatcher>>,
    /// The `min` given to the booking date input, if the page has one.
    pub booking_min_date: Option<String>,
}

/// Install every site interaction on `page`.
///
/// Listeners are registered in a fixed order, which is the order they run in
/// when several share a target and event type.
///
/// # Errors
/// Fails only if the document rejects a mutation during setup.
pub fn install(page: &mut Page) -> Result<Site> {
    let _span = info_span!("site.install").entered();
    let elements = SiteElements::resolve(page.document())?;

    let navigation = navigation::install(page, &elements)?;
    smooth_scroll::install(page, &elements);

    let scroll_tracker = Rc::new(ScrollTracker::new(&elements));
    scroll_tracker::install_shadow(page, &scroll_tracker);

    let card_reveal = reveal::install_intersection(page, &elements)?;
    forms::install_all(page, elements.booking_form, elements.contact_form);

    let booking_min_date = match elements.date_input {
        Some(input) => Some(page.run_script(|ctx| booking_date::apply(ctx, input))?),
        None => {
            debug!("no date input, booking minimum not set");
            None
        }
    };

    scroll_tracker::install_active_link(page, &scroll_tracker);
    gallery::install(page, &elements.gallery_items)?;
    let block_reveal = reveal::install_scroll_point(page, &elements)?;
    loading::install(page);

    Console::log(WELCOME);
    Console::log(TAGLINE);

    Ok(Site {
        elements,
        navigation,
        scroll_tracker,
        card_reveal,
        block_reveal,
        booking_min_date,
    })
}
