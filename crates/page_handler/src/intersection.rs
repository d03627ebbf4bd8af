//! Intersection observers: track how much of each target sits inside the
//! (margin-adjusted) viewport and report targets whose state flipped.

use dom::{NodeKey, Rect, View};
use std::collections::HashMap;

/// Observer configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionOptions {
    /// Fraction of the target's area that must be visible.
    pub threshold: f64,
    /// Added to the viewport's bottom edge; negative values shrink it.
    pub root_margin_bottom: f64,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin_bottom: 0.0,
        }
    }
}

/// One target's state, reported when it changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeKey,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Visible fraction of `target` inside `root`.
///
/// A zero-area target counts as fully visible when it touches the root.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    let Some(overlap) = target.intersection(root) else {
        return 0.0;
    };
    let area = target.area();
    if area <= 0.0 {
        return 1.0;
    }
    (overlap.area() / area).clamp(0.0, 1.0)
}

/// Whether `ratio` satisfies `threshold`. A zero threshold only needs contact.
pub fn meets_threshold(target: &Rect, root: &Rect, threshold: f64) -> (bool, f64) {
    let touching = target.intersection(root).is_some();
    let ratio = intersection_ratio(target, root);
    let meets = touching && (ratio >= threshold || threshold <= 0.0);
    (meets, ratio)
}

/// A registered observer and the last state it reported per target.
pub(crate) struct Observer<C> {
    options: IntersectionOptions,
    targets: Vec<NodeKey>,
    reported: HashMap<NodeKey, bool>,
    pub(crate) callback: C,
}

impl<C> Observer<C> {
    pub(crate) fn new(options: IntersectionOptions, targets: Vec<NodeKey>, callback: C) -> Self {
        Self {
            options,
            targets,
            reported: HashMap::new(),
            callback,
        }
    }

    /// Recompute every target and return those whose state changed since the
    /// last report, in registration order. The first computation reports all
    /// targets that still have geometry.
    pub(crate) fn collect_changes(&mut self, view: &dyn View) -> Vec<IntersectionEntry> {
        let viewport = view.viewport();
        let root = Rect {
            x: 0.0,
            y: 0.0,
            width: viewport.width,
            height: (viewport.height + self.options.root_margin_bottom).max(0.0),
        };
        let mut changes = Vec::new();
        for target in &self.targets {
            if !view.is_connected(*target) {
                continue;
            }
            let Some(rect) = view.bounding_rect(*target) else {
                continue;
            };
            let (is_intersecting, ratio) = meets_threshold(&rect, &root, self.options.threshold);
            if self.reported.insert(*target, is_intersecting) == Some(is_intersecting) {
                continue;
            }
            changes.push(IntersectionEntry {
                target: *target,
                is_intersecting,
                ratio,
            });
        }
        changes
    }
}
