//! Reveal-on-scroll: elements start faded and shifted down, and are shown
//! once they come into view. Revealing is one-way.
//!
//! Both trigger styles share one [`VisibilityWatcher`]: cards are revealed
//! by an intersection observer, headers and feature blocks by comparing
//! their viewport position with a fixed reveal point on every scroll.

use crate::elements::SiteElements;
use anyhow::Result;
use dom::{NodeKey, View};
use page_handler::{EventTarget, EventType, IntersectionOptions, Page};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// What makes a watched element count as visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealTrigger {
    /// At least `threshold` of the element inside the viewport shrunk by `bottom_margin`.
    Intersection { threshold: f64, bottom_margin: f64 },
    /// The element's top is above `viewport height - reveal_point`.
    ScrollPoint { reveal_point: f64 },
}

/// A set of elements that reveal once and stay revealed.
#[derive(Debug)]
pub struct VisibilityWatcher {
    trigger: RevealTrigger,
    transition: &'static str,
    targets: Vec<NodeKey>,
    revealed: HashSet<NodeKey>,
}

impl VisibilityWatcher {
    pub fn new(trigger: RevealTrigger, transition: &'static str, targets: Vec<NodeKey>) -> Self {
        Self {
            trigger,
            transition,
            targets,
            revealed: HashSet::new(),
        }
    }

    pub const fn trigger(&self) -> RevealTrigger {
        self.trigger
    }

    pub fn targets(&self) -> &[NodeKey] {
        &self.targets
    }

    pub fn is_revealed(&self, node: NodeKey) -> bool {
        self.revealed.contains(&node)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Put every target in the hidden starting state.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn hide_all(&self, view: &mut dyn View) -> Result<()> {
        for target in &self.targets {
            view.set_style_property(*target, "opacity", "0")?;
            view.set_style_property(*target, "transform", "translateY(30px)")?;
            view.set_style_property(*target, "transition", self.transition)?;
        }
        Ok(())
    }

    /// Reveal `node`. Revealing twice is a no-op. Returns whether it was newly revealed.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn reveal(&mut self, view: &mut dyn View, node: NodeKey) -> Result<bool> {
        if !self.revealed.insert(node) {
            return Ok(false);
        }
        view.set_style_property(node, "opacity", "1")?;
        view.set_style_property(node, "transform", "translateY(0)")?;
        Ok(true)
    }

    /// Check every unrevealed target against a scroll-point trigger.
    ///
    /// # Errors
    /// Propagates view mutation failures.
    pub fn check_scroll_point(&mut self, view: &mut dyn View) -> Result<()> {
        let RevealTrigger::ScrollPoint { reveal_point } = self.trigger else {
            return Ok(());
        };
        let limit = view.viewport().height - reveal_point;
        let due: Vec<NodeKey> = self
            .targets
            .iter()
            .copied()
            .filter(|target| !self.revealed.contains(target))
            .filter(|target| view.bounding_rect(*target).is_some_and(|rect| rect.top() < limit))
            .collect();
        for target in due {
            self.reveal(view, target)?;
        }
        Ok(())
    }
}

/// Start the intersection-triggered watcher over the card elements.
///
/// # Errors
/// Propagates view mutation failures while hiding the cards.
pub fn install_intersection(
    page: &mut Page,
    elements: &SiteElements,
) -> Result<Rc<RefCell<VisibilityWatcher>>> {
    let config = page.config();
    let trigger = RevealTrigger::Intersection {
        threshold: config.reveal_threshold,
        bottom_margin: config.reveal_bottom_margin,
    };
    let options = IntersectionOptions {
        threshold: config.reveal_threshold,
        root_margin_bottom: config.reveal_bottom_margin,
    };
    let watcher = Rc::new(RefCell::new(VisibilityWatcher::new(
        trigger,
        "opacity 0.6s ease, transform 0.6s ease",
        elements.intersection_reveals.clone(),
    )));

    let hidden = Rc::clone(&watcher);
    page.run_script(move |ctx| hidden.borrow().hide_all(ctx.view))?;

    let observed = Rc::clone(&watcher);
    page.observe_intersections(options, elements.intersection_reveals.clone(), move |ctx, entries| {
        let mut watcher = observed.borrow_mut();
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            watcher.reveal(ctx.view, entry.target)?;
        }
        Ok(())
    });
    Ok(watcher)
}

/// Start the scroll-point watcher over headers and feature blocks, and run
/// it once right away for anything already in view.
///
/// # Errors
/// Propagates view mutation failures from the initial pass.
pub fn install_scroll_point(
    page: &mut Page,
    elements: &SiteElements,
) -> Result<Rc<RefCell<VisibilityWatcher>>> {
    let trigger = RevealTrigger::ScrollPoint {
        reveal_point: page.config().reveal_point,
    };
    let watcher = Rc::new(RefCell::new(VisibilityWatcher::new(
        trigger,
        "opacity 0.8s ease, transform 0.8s ease",
        elements.scroll_reveals.clone(),
    )));

    let on_scroll = Rc::clone(&watcher);
    page.add_listener(EventTarget::Window, EventType::Scroll, move |ctx, _| {
        on_scroll.borrow_mut().check_scroll_point(ctx.view)
    });

    let initial = Rc::clone(&watcher);
    page.run_script(move |ctx| {
        let mut watcher = initial.borrow_mut();
        watcher.hide_all(ctx.view)?;
        watcher.check_scroll_point(ctx.view)
    })?;
    Ok(watcher)
}
