//! Mobile menu and dropdown behavior on the farm page.

mod common;

use anyhow::{Result, anyhow};
use common::{by_id, farm_page, first};
use dom::{NodeKey, View as _};
use page_handler::Page;

fn assert_menu_consistent(page: &Page, site: &farm_site::Site) -> Result<()> {
    let nav = site
        .navigation
        .as_ref()
        .ok_or_else(|| anyhow!("navigation not installed"))?
        .borrow();
    let doc = page.document();
    let menu = by_id(page, "navMenu")?;
    let body = doc.body().ok_or_else(|| anyhow!("no body"))?;
    let bars = doc.query_selector_all("#navToggle span")?;
    let open = nav.is_open();

    assert_eq!(doc.has_class(menu, "active"), open);
    assert_eq!(doc.style_property(body, "overflow").as_deref() == Some("hidden"), open);
    let middle = bars.get(1).copied().ok_or_else(|| anyhow!("icon bars missing"))?;
    let expected_opacity = if open { "0" } else { "1" };
    if open || doc.style_property(middle, "opacity").is_some() {
        assert_eq!(doc.style_property(middle, "opacity").as_deref(), Some(expected_opacity));
    }
    if !open {
        assert!(nav.open_dropdown().is_none());
        assert!(doc.query_selector_all(".nav-dropdown.active")?.is_empty());
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Step {
    Click(NodeKey),
    ClickDocument,
}

fn open_dropdowns(page: &Page) -> Result<usize> {
    Ok(page.document().query_selector_all(".nav-dropdown.active")?.len())
}

#[test]
fn menu_state_matches_icon_and_scroll_lock_through_any_click_sequence() -> Result<()> {
    let (mut page, site) = farm_page(375.0, 700.0)?;
    let toggle = by_id(&page, "navToggle")?;
    let about_link = first(&page, "a.nav-link[href=\"#about\"]")?;
    let dropdown_toggle = first(&page, ".dropdown-toggle")?;
    let dropdown_item = first(&page, ".dropdown-menu a")?;
    let section = by_id(&page, "gallery")?;

    assert_menu_consistent(&page, &site)?;
    let steps = [
        Step::Click(toggle),
        Step::Click(toggle),
        Step::Click(toggle),
        Step::Click(dropdown_toggle),
        Step::Click(about_link),
        Step::Click(toggle),
        Step::Click(dropdown_item),
        Step::Click(toggle),
        Step::Click(section),
        Step::Click(toggle),
        Step::ClickDocument,
        Step::ClickDocument,
    ];
    for step in steps {
        match step {
            Step::Click(node) => page.click(node)?,
            Step::ClickDocument => page.click_document(),
        }
        assert_menu_consistent(&page, &site)?;
    }
    Ok(())
}

#[test]
fn toggle_opens_with_x_icon_and_outside_click_closes() -> Result<()> {
    let (mut page, site) = farm_page(375.0, 700.0)?;
    let toggle = by_id(&page, "navToggle")?;
    page.click(toggle)?;
    let bars = page.document().query_selector_all("#navToggle span")?;
    let styles: Vec<Option<String>> = bars
        .iter()
        .map(|bar| {
            let doc = page.document();
            doc.style_property(*bar, "transform")
                .or_else(|| doc.style_property(*bar, "opacity"))
        })
        .collect();
    assert_eq!(
        styles,
        vec![
            Some("rotate(45deg) translate(5px, 5px)".to_owned()),
            Some("0".to_owned()),
            Some("rotate(-45deg) translate(7px, -6px)".to_owned()),
        ]
    );

    // Clicks inside the menu leave it open.
    page.click(by_id(&page, "navMenu")?)?;
    assert!(site.navigation.as_ref().is_some_and(|nav| nav.borrow().is_open()));

    page.click(by_id(&page, "contact")?)?;
    assert!(site.navigation.as_ref().is_some_and(|nav| !nav.borrow().is_open()));
    assert_menu_consistent(&page, &site)
}

#[test]
fn at_most_one_dropdown_is_open_on_narrow_viewports() -> Result<()> {
    let (mut page, _site) = farm_page(768.0, 700.0)?;
    let toggles: Vec<NodeKey> = page.document().query_selector_all(".nav-dropdown .dropdown-toggle")?;
    assert_eq!(toggles.len(), 2);
    let sequence = [0, 1, 1, 0, 0, 0, 1, 0, 1, 1];
    let mut expected_open: Option<usize> = None;
    for index in sequence {
        let toggle = toggles.get(index).copied().ok_or_else(|| anyhow!("toggle {index}"))?;
        page.click(toggle)?;
        expected_open = if expected_open == Some(index) { None } else { Some(index) };
        assert!(open_dropdowns(&page)? <= 1);
        assert_eq!(open_dropdowns(&page)?, usize::from(expected_open.is_some()));
    }
    Ok(())
}

#[test]
fn dropdown_toggles_are_inert_on_wide_viewports() -> Result<()> {
    let (mut page, site) = farm_page(1280.0, 800.0)?;
    let toggle = first(&page, ".nav-dropdown .dropdown-toggle")?;
    page.click(toggle)?;
    assert_eq!(open_dropdowns(&page)?, 0);
    // The outside-click rule is narrow-only too.
    page.click(by_id(&page, "navToggle")?)?;
    page.click_document();
    assert!(site.navigation.as_ref().is_some_and(|nav| nav.borrow().is_open()));
    Ok(())
}
