//! Form interception, confirmation banners, the booking date minimum and
//! pages that lack some of the optional elements.

mod common;

use anyhow::{Result, anyhow};
use common::{banners_with_text, by_id, farm_page, first, init_logging};
use dom::{MirrorIndex, View as _};
use farm_site::forms::{BOOKING_CONFIRMATION, CONTACT_CONFIRMATION};
use farm_site::gallery::gallery_message;
use farm_site::notifier::{Severity, show_message};
use page_handler::{Page, SiteConfig};
use std::time::Duration;

fn head_styles(page: &Page) -> usize {
    let doc = page.document();
    doc.head().map_or(0, |head| {
        doc.children(head)
            .into_iter()
            .filter(|child| doc.tag_name(*child).as_deref() == Some("style"))
            .count()
    })
}

#[test]
fn booking_submit_stays_on_page_confirms_and_clears() -> Result<()> {
    let (mut page, site) = farm_page(1280.0, 800.0)?;
    let form = site.elements.booking_form.ok_or_else(|| anyhow!("no booking form"))?;
    let name = by_id(&page, "name")?;
    let date = by_id(&page, "date")?;
    let tour = by_id(&page, "tourType")?;
    let guests = by_id(&page, "guests")?;

    let doc = page.document_mut();
    doc.set_value(name, "Ana")?;
    doc.set_value(date, "2025-01-01")?;
    doc.set_value(tour, "family")?;
    doc.set_value(guests, "4")?;
    assert_eq!(doc.form_entries(form)?.len(), 6);

    page.submit(form)?;
    assert!(page.take_default_actions().is_empty());
    assert_eq!(banners_with_text(&page, BOOKING_CONFIRMATION)?.len(), 1);
    let doc = page.document();
    assert_eq!(doc.value(name).as_deref(), Some(""));
    assert_eq!(doc.value(date).as_deref(), Some(""));
    assert_eq!(doc.value(tour).as_deref(), Some(""));
    assert_eq!(doc.value(guests).as_deref(), Some("1"));
    Ok(())
}

#[test]
fn booking_date_minimum_is_tomorrow() -> Result<()> {
    let (page, site) = farm_page(1280.0, 800.0)?;
    assert_eq!(site.booking_min_date.as_deref(), Some("2025-07-01"));
    let date = by_id(&page, "date")?;
    assert_eq!(page.document().attribute(date, "min").as_deref(), Some("2025-07-01"));
    Ok(())
}

#[test]
fn each_banner_leaves_on_its_own_schedule() -> Result<()> {
    let (mut page, site) = farm_page(1280.0, 800.0)?;
    let tile = first(&page, ".gallery-item")?;
    let contact = site.elements.contact_form.ok_or_else(|| anyhow!("no contact form"))?;
    let gallery_text = gallery_message("Sunflower Fields");
    assert_eq!(head_styles(&page), 0);

    page.click(tile)?;
    page.advance(Duration::from_millis(2000));
    page.submit(contact)?;
    assert_eq!(banners_with_text(&page, &gallery_text)?.len(), 1);
    assert_eq!(banners_with_text(&page, CONTACT_CONFIRMATION)?.len(), 1);
    assert_eq!(head_styles(&page), 2);

    page.advance(Duration::from_millis(3000));
    let leaving = banners_with_text(&page, &gallery_text)?;
    assert_eq!(leaving.len(), 1);
    assert_eq!(
        page.document().style_property(leaving[0], "animation").as_deref(),
        Some("slideDown 0.3s ease reverse")
    );

    page.advance(Duration::from_millis(299));
    assert_eq!(banners_with_text(&page, &gallery_text)?.len(), 1);
    page.advance(Duration::from_millis(1));
    assert!(banners_with_text(&page, &gallery_text)?.is_empty());
    assert_eq!(banners_with_text(&page, CONTACT_CONFIRMATION)?.len(), 1);
    assert_eq!(head_styles(&page), 1);

    page.run_until_idle();
    assert!(banners_with_text(&page, CONTACT_CONFIRMATION)?.is_empty());
    assert_eq!(head_styles(&page), 0);
    assert_eq!(page.now(), Duration::from_millis(7300));
    Ok(())
}

#[test]
fn tile_without_caption_shows_nothing() -> Result<()> {
    let (mut page, site) = farm_page(1280.0, 800.0)?;
    let bare = *site
        .elements
        .gallery_items
        .last()
        .ok_or_else(|| anyhow!("no gallery items"))?;
    page.click(bare)?;
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(head_styles(&page), 0);
    Ok(())
}

#[test]
fn mirror_sees_banners_come_and_go() -> Result<()> {
    let (mut page, site) = farm_page(1280.0, 800.0)?;
    let (index, state) = MirrorIndex::new();
    let mut mirror = page.create_mirror(index);
    let contact = site.elements.contact_form.ok_or_else(|| anyhow!("no contact form"))?;

    page.submit(contact)?;
    mirror.try_update_sync()?;
    let banner = banners_with_text(&page, CONTACT_CONFIRMATION)?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no banner"))?;
    {
        let guard = state.lock().map_err(|_| anyhow!("poisoned"))?;
        assert!(guard.is_loaded());
        assert_eq!(guard.text_content(banner), CONTACT_CONFIRMATION);
    }

    page.run_until_idle();
    mirror.try_update_sync()?;
    let guard = state.lock().map_err(|_| anyhow!("poisoned"))?;
    assert!(guard.get(banner).is_none());
    Ok(())
}

#[test]
fn bare_page_installs_and_ignores_missing_parts() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(
        "<html><head></head><body><section id=\"home\"><p>Hi</p></section></body></html>",
        SiteConfig::default(),
    )?;
    let site = farm_site::install(&mut page)?;
    assert!(site.navigation.is_none());
    assert!(site.booking_min_date.is_none());
    assert!(site.elements.booking_form.is_none());

    page.scroll_to(400.0);
    page.click_document();
    page.load();
    page.run_until_idle();
    assert!(page.take_default_actions().is_empty());
    Ok(())
}

#[test]
fn banner_removed_early_still_cleans_up_its_style() -> Result<()> {
    let (mut page, _site) = farm_page(1280.0, 800.0)?;
    page.click(first(&page, ".gallery-item")?)?;
    let banner = banners_with_text(&page, &gallery_message("Sunflower Fields"))?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no banner"))?;
    assert_eq!(head_styles(&page), 1);

    page.advance(Duration::from_millis(1000));
    page.document_mut().remove_node(banner)?;
    page.advance(Duration::from_millis(4300));

    assert!(!page.document().is_connected(banner));
    assert_eq!(head_styles(&page), 0);
    assert_eq!(page.pending_timers(), 0);
    Ok(())
}

#[test]
fn error_banners_use_the_error_color() -> Result<()> {
    let (mut page, _site) = farm_page(1280.0, 800.0)?;
    let banner = page
        .run_script(|ctx| show_message(ctx, "Something went wrong", Severity::Error))?
        .ok_or_else(|| anyhow!("no banner"))?;
    let doc = page.document();
    assert_eq!(doc.style_property(banner.message, "background").as_deref(), Some("#e74c3c"));
    assert_eq!(doc.text_content(banner.message), "Something went wrong");
    assert!(banner.style.is_some_and(|style| doc.is_connected(style)));

    let success = page
        .run_script(|ctx| show_message(ctx, "Saved", Severity::Success))?
        .ok_or_else(|| anyhow!("no banner"))?;
    assert_eq!(
        page.document().style_property(success.message, "background").as_deref(),
        Some("#4a7c3c")
    );
    Ok(())
}
