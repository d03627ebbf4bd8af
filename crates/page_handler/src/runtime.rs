//! Async driver that runs a [`Page`] against real time.
//!
//! Host input arrives as [`HostCommand`] values over a tokio channel, and the
//! page's virtual clock is kept in step with `tokio::time` so delayed
//! callbacks fire when they are due.

use crate::state::Page;
use core::time::Duration;
use dom::NodeKey;
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Input from the embedder.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    Click(NodeKey),
    ClickDocument,
    Scroll(f64),
    Submit(NodeKey),
    Resize { width: f64, height: f64 },
    Load,
}

fn apply(page: &mut Page, command: HostCommand) {
    debug!("host command {command:?}");
    let outcome = match command {
        HostCommand::Click(node) => page.click(node),
        HostCommand::Submit(form) => page.submit(form),
        HostCommand::ClickDocument => {
            page.click_document();
            Ok(())
        }
        HostCommand::Scroll(scroll_y) => {
            page.scroll_to(scroll_y);
            Ok(())
        }
        HostCommand::Resize { width, height } => {
            page.resize(width, height);
            Ok(())
        }
        HostCommand::Load => {
            page.load();
            Ok(())
        }
    };
    if let Err(err) = outcome {
        warn!("host command rejected: {err:#}");
    }
}

/// Maps elapsed real time onto the page's virtual clock.
struct TimeBase {
    start: Instant,
    page_start: Duration,
}

impl TimeBase {
    fn new(page: &Page) -> Self {
        Self {
            start: Instant::now(),
            page_start: page.now(),
        }
    }

    fn deadline(&self, due: Duration) -> Instant {
        self.start + due.saturating_sub(self.page_start)
    }

    fn catch_up(&self, page: &mut Page) {
        let target = self.page_start.saturating_add(self.start.elapsed());
        if target > page.now() {
            page.advance(target.saturating_sub(page.now()));
        }
    }
}

/// Drive `page` until the command channel closes and no delayed callbacks remain.
pub async fn drive(page: &mut Page, mut commands: mpsc::Receiver<HostCommand>) {
    let base = TimeBase::new(page);
    let mut open = true;
    loop {
        let deadline = page.next_timer_due().map(|due| base.deadline(due));
        if !open && deadline.is_none() {
            debug!("page idle and host gone, driver exiting");
            return;
        }
        tokio::select! {
            command = commands.recv(), if open => match command {
                Some(command) => {
                    base.catch_up(page);
                    apply(page, command);
                }
                None => open = false,
            },
            () = time::sleep_until(deadline.unwrap_or(base.start)), if deadline.is_some() => {
                base.catch_up(page);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::events::{EventTarget, EventType};
    use anyhow::{Result, anyhow};
    use dom::View as _;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[tokio::test(start_paused = true)]
    async fn delayed_callbacks_fire_in_real_time() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut page = Page::from_html(
            r#"<html><body><button id="go">Go</button></body></html>"#,
            SiteConfig::default(),
        )?;
        let button = page
            .document()
            .element_by_id("go")
            .ok_or_else(|| anyhow!("button missing"))?;
        page.add_listener(EventTarget::Node(button), EventType::Click, move |ctx, _| {
            ctx.set_timeout(Duration::from_millis(5000), move |later| {
                later.view.add_class(button, "done")
            });
            Ok(())
        });

        let (sender, receiver) = mpsc::channel(4);
        sender.send(HostCommand::Click(button)).await?;
        sender.send(HostCommand::Click(NodeKey(9999))).await?;
        drop(sender);

        let started = Instant::now();
        drive(&mut page, receiver).await;
        assert!(started.elapsed() >= Duration::from_millis(5000));
        assert!(page.document().has_class(button, "done"));
        assert_eq!(page.pending_timers(), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn every_host_command_reaches_the_page() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut page = Page::from_html(
            r#"<html><body><form id="f"><input name="q" value="x"></form></body></html>"#,
            SiteConfig::default(),
        )?;
        let form = page
            .document()
            .element_by_id("f")
            .ok_or_else(|| anyhow!("form missing"))?;
        let seen = Rc::new(RefCell::new(Vec::new()));
        for (target, kind) in [
            (EventTarget::Window, EventType::Scroll),
            (EventTarget::Window, EventType::Resize),
            (EventTarget::Window, EventType::Load),
            (EventTarget::Document, EventType::Click),
            (EventTarget::Node(form), EventType::Submit),
        ] {
            let seen = Rc::clone(&seen);
            page.add_listener(target, kind, move |_, _| {
                seen.borrow_mut().push(kind);
                Ok(())
            });
        }

        let (sender, receiver) = mpsc::channel(8);
        for command in [
            HostCommand::Scroll(120.0),
            HostCommand::Resize {
                width: 375.0,
                height: 700.0,
            },
            HostCommand::Load,
            HostCommand::Load,
            HostCommand::ClickDocument,
            HostCommand::Submit(form),
            HostCommand::Submit(NodeKey(9999)),
        ] {
            sender.send(command).await?;
        }
        drop(sender);
        drive(&mut page, receiver).await;

        assert_eq!(
            *seen.borrow(),
            vec![
                EventType::Scroll,
                EventType::Resize,
                EventType::Load,
                EventType::Click,
                EventType::Submit,
            ]
        );
        assert!((page.document().scroll_y() - 120.0).abs() < f64::EPSILON);
        assert!((page.document().viewport().width - 375.0).abs() < f64::EPSILON);
        assert!(page.is_loaded());
        assert_eq!(page.take_default_actions().len(), 1);
        Ok(())
    }
}
