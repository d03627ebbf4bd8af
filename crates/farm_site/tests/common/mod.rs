//! Shared fixture loading and layout for the site tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use anyhow::{Result, anyhow};
use chrono::{TimeZone as _, Utc};
use dom::{LayoutBox, NodeKey, View as _};
use farm_site::Site;
use page_handler::{FixedClock, Page, SiteConfig};

pub const FARM_PAGE: &str = include_str!("../fixtures/index.html");

pub const HEADER_HEIGHT: f64 = 80.0;
pub const SECTION_HEIGHT: f64 = 800.0;

const LAID_OUT_BLOCKS: &str = ".section-header, .about-card, .practice-card, .integrated-farming, \
                               .tour-highlights, .gallery-item";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stack the sections below the header and the blocks inside each section.
pub fn lay_out(page: &mut Page) -> Result<()> {
    let doc = page.document_mut();
    let width = doc.viewport().width;
    if let Some(header) = doc.query_selector_all(".header")?.first().copied() {
        doc.set_layout(header, LayoutBox::block(0.0, width, HEADER_HEIGHT))?;
    }
    let mut section_top = HEADER_HEIGHT;
    for section in doc.query_selector_all("section[id]")? {
        doc.set_layout(section, LayoutBox::block(section_top, width, SECTION_HEIGHT))?;
        let mut block_top = section_top + 50.0;
        for block in doc.query_selector_all_within(section, LAID_OUT_BLOCKS)? {
            doc.set_layout(block, LayoutBox::block(block_top, 300.0, 100.0))?;
            block_top += 120.0;
        }
        section_top += SECTION_HEIGHT;
    }
    Ok(())
}

/// Load the farm page at the given viewport, lay it out and install the site.
pub fn farm_page(width: f64, height: f64) -> Result<(Page, Site)> {
    init_logging();
    let clock = FixedClock(
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0)
            .single()
            .ok_or_else(|| anyhow!("bad fixture date"))?,
    );
    let mut page = Page::from_html(FARM_PAGE, SiteConfig::default())?.with_clock(clock);
    page.resize(width, height);
    lay_out(&mut page)?;
    let site = farm_site::install(&mut page)?;
    Ok((page, site))
}

pub fn by_id(page: &Page, id: &str) -> Result<NodeKey> {
    page.document()
        .element_by_id(id)
        .ok_or_else(|| anyhow!("#{id} missing"))
}

pub fn first(page: &Page, selector: &str) -> Result<NodeKey> {
    page.document()
        .query_selector_all(selector)?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("nothing matches {selector}"))
}

/// Connected banners currently showing `text`.
pub fn banners_with_text(page: &Page, text: &str) -> Result<Vec<NodeKey>> {
    let doc = page.document();
    let Some(body) = doc.body() else {
        return Ok(Vec::new());
    };
    Ok(doc
        .children(body)
        .into_iter()
        .filter(|child| doc.tag_name(*child).as_deref() == Some("div"))
        .filter(|child| doc.text_content(*child) == text)
        .collect())
}
