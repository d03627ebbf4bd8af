//! Event dispatch, default actions, timers and observers driven through `Page`.

use anyhow::{Result, anyhow, bail};
use core::time::Duration;
use dom::{LayoutBox, NodeKey, ScrollBehavior, View as _};
use page_handler::{
    DefaultAction, EventTarget, EventType, IntersectionOptions, Page, SiteConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

const PAGE: &str = r##"<!DOCTYPE html>
<html><head></head><body>
  <nav><ul id="menu"><li><a id="to-tours" href="#tours">Tours</a></li></ul></nav>
  <section id="tours"><h2>Tours</h2></section>
  <form id="contact"><input name="email" value=""></form>
</body></html>"##;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn by_id(page: &Page, id: &str) -> Result<NodeKey> {
    page.document()
        .element_by_id(id)
        .ok_or_else(|| anyhow!("#{id} missing"))
}

#[test]
fn click_bubbles_in_registration_order_and_survives_listener_errors() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(PAGE, SiteConfig::default())?;
    let link = by_id(&page, "to-tours")?;
    let menu = by_id(&page, "menu")?;
    let seen = Rc::new(RefCell::new(Vec::new()));

    for (target, label) in [
        (EventTarget::Window, "window"),
        (EventTarget::Document, "document"),
        (EventTarget::Node(menu), "menu"),
        (EventTarget::Node(link), "link-1"),
        (EventTarget::Node(link), "link-2"),
    ] {
        let seen = Rc::clone(&seen);
        page.add_listener(target, EventType::Click, move |_, _| {
            seen.borrow_mut().push(label);
            if label == "link-1" {
                bail!("boom");
            }
            Ok(())
        });
    }

    page.click(link)?;
    assert_eq!(
        *seen.borrow(),
        vec!["link-1", "link-2", "menu", "document", "window"]
    );
    Ok(())
}

#[test]
fn fragment_link_jumps_unless_prevented() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(PAGE, SiteConfig::default())?;
    let link = by_id(&page, "to-tours")?;
    let tours = by_id(&page, "tours")?;
    page.document_mut()
        .set_layout(tours, LayoutBox::block(1200.0, 1024.0, 600.0))?;

    let scrolls = Rc::new(RefCell::new(0_u32));
    let counter = Rc::clone(&scrolls);
    page.add_listener(EventTarget::Window, EventType::Scroll, move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    page.click(link)?;
    assert!((page.document().scroll_y() - 1200.0).abs() < f64::EPSILON);
    assert_eq!(*scrolls.borrow(), 1);
    assert_eq!(
        page.take_default_actions(),
        vec![DefaultAction::FollowLink {
            link,
            href: "#tours".into()
        }]
    );

    page.add_listener(EventTarget::Node(link), EventType::Click, |ctx, event| {
        event.prevent_default();
        ctx.view.scroll_to(1120.0, ScrollBehavior::Smooth);
        Ok(())
    });
    page.scroll_to(0.0);
    page.click(link)?;
    assert!((page.document().scroll_y() - 1120.0).abs() < f64::EPSILON);
    assert!(page.take_default_actions().is_empty());
    Ok(())
}

#[test]
fn submit_records_network_default_only_when_not_prevented() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(PAGE, SiteConfig::default())?;
    let form = by_id(&page, "contact")?;
    page.submit(form)?;
    assert_eq!(page.take_default_actions(), vec![DefaultAction::SubmitForm { form }]);

    page.add_listener(EventTarget::Node(form), EventType::Submit, |_, event| {
        event.prevent_default();
        Ok(())
    });
    page.submit(form)?;
    assert!(page.take_default_actions().is_empty());
    assert!(page.submit(by_id(&page, "menu")?).is_err());
    Ok(())
}

#[test]
fn timers_run_in_due_order_and_tolerate_removed_targets() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(PAGE, SiteConfig::default())?;
    let tours = by_id(&page, "tours")?;
    let log = Rc::new(RefCell::new(Vec::new()));

    let (first, second) = (Rc::clone(&log), Rc::clone(&log));
    page.run_script(move |ctx| {
        ctx.set_timeout(Duration::from_millis(300), move |later| {
            first.borrow_mut().push(later.now());
            later.view.remove_node(tours)
        });
        ctx.set_timeout(Duration::from_millis(100), move |later| {
            second.borrow_mut().push(later.now());
            later.set_timeout(Duration::from_millis(250), move |last| {
                last.view.set_style_property(tours, "opacity", "1")
            });
            Ok(())
        });
    });

    page.advance(Duration::from_millis(299));
    assert_eq!(*log.borrow(), vec![Duration::from_millis(100)]);
    page.advance(Duration::from_millis(1));
    assert_eq!(log.borrow().len(), 2);
    assert!(!page.document().is_connected(tours));

    page.run_until_idle();
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(page.now(), Duration::from_millis(350));
    Ok(())
}

#[test]
fn observers_report_initial_state_then_changes() -> Result<()> {
    init_logging();
    let mut page = Page::from_html(PAGE, SiteConfig::default())?;
    let tours = by_id(&page, "tours")?;
    page.document_mut()
        .set_layout(tours, LayoutBox::block(1200.0, 1024.0, 600.0))?;
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reports);
    page.observe_intersections(
        IntersectionOptions {
            threshold: 0.1,
            root_margin_bottom: -100.0,
        },
        vec![tours],
        move |_, entries| {
            sink.borrow_mut()
                .extend(entries.iter().map(|entry| entry.is_intersecting));
            Ok(())
        },
    );
    assert_eq!(*reports.borrow(), vec![false]);

    page.scroll_to(200.0);
    assert_eq!(*reports.borrow(), vec![false]);
    page.scroll_to(700.0);
    page.scroll_to(800.0);
    assert_eq!(*reports.borrow(), vec![false, true]);
    Ok(())
}
