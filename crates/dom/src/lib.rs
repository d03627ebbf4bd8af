//! Document model shared by the page runtime and the site interactions.
//!
//! The [`Document`] is the in-memory tree loaded from markup. Scripts reach
//! it only through the [`View`] trait, and every mutation is mirrored to the
//! rendering surface as a batch of [`DOMUpdate`] values.

use anyhow::{Result, anyhow};
use core::fmt;
use tokio::sync::mpsc;

pub mod console;
pub use console::Console;

pub mod document;
pub use document::Document;

mod forms;

pub mod mirror;
pub use mirror::{MirrorIndex, MirrorNode, MirrorState};

pub mod parser;

pub mod view;
pub use view::{LayoutBox, Rect, ScrollBehavior, ScrollRequest, View, Viewport};

// ============================
// Stable node keys
// ============================

/// A 64-bit stable key for DOM nodes, shared with the rendering surface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node key (always present).
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

// ============================
// DOM Update model + mirror pattern
// ============================

/// A batchable change to the document, mirrored to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    InsertText {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    RemoveNode {
        node: NodeKey,
    },
    EndOfDocument,
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    /// Implementations reject updates that reference nodes they never saw.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()>;
}

/// Receiving end of the update stream, applying each batch to a subscriber.
pub struct DOMMirror<T: DOMSubscriber> {
    in_updater: mpsc::Receiver<Vec<DOMUpdate>>,
    mirror: T,
}

impl<T: DOMSubscriber> DOMMirror<T> {
    pub const fn new(in_updater: mpsc::Receiver<Vec<DOMUpdate>>, mirror: T) -> Self {
        Self { in_updater, mirror }
    }

    /// Wait for the next batch and apply it. Returns `false` once the sender is gone.
    ///
    /// # Errors
    /// Propagates subscriber failures.
    pub async fn update(&mut self) -> Result<bool> {
        let Some(batch) = self.in_updater.recv().await else {
            return Ok(false);
        };
        for update in batch {
            self.mirror.apply_update(update)?;
        }
        Ok(true)
    }

    /// Drain and apply every batch already queued, without waiting.
    ///
    /// # Errors
    /// Propagates subscriber failures, or reports a closed channel.
    pub fn try_update_sync(&mut self) -> Result<()> {
        use tokio::sync::mpsc::error::TryRecvError;
        loop {
            match self.in_updater.try_recv() {
                Ok(batch) => {
                    for update in batch {
                        self.mirror.apply_update(update)?;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(anyhow!("update channel closed"));
                }
            }
        }
        Ok(())
    }

    pub fn mirror(&self) -> &T {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut T {
        &mut self.mirror
    }
}
