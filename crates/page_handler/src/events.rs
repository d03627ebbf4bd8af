//! Event model: event types, targets, the event object handed to listeners,
//! and the default actions the page performs when a listener does not
//! prevent them.

use core::fmt;
use dom::NodeKey;

/// The event types the page dispatches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Scroll,
    Submit,
    Load,
    Resize,
}

impl EventType {
    /// Events that only ever fire on the window.
    #[inline]
    #[must_use]
    pub const fn is_window_only(self) -> bool {
        matches!(self, Self::Scroll | Self::Load | Self::Resize)
    }

    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Scroll => "scroll",
            Self::Submit => "submit",
            Self::Load => "load",
            Self::Resize => "resize",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Where a listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    Node(NodeKey),
}

/// The event object passed to each listener along the propagation path.
#[derive(Clone, Debug)]
pub struct Event {
    kind: EventType,
    target: EventTarget,
    current_target: EventTarget,
    default_prevented: bool,
}

impl Event {
    #[inline]
    #[must_use]
    pub const fn new(kind: EventType, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventType {
        self.kind
    }

    /// The target the event was dispatched to.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> EventTarget {
        self.target
    }

    /// The node the event was dispatched to, if it was a node.
    #[inline]
    #[must_use]
    pub const fn target_node(&self) -> Option<NodeKey> {
        match self.target {
            EventTarget::Node(node) => Some(node),
            EventTarget::Window | EventTarget::Document => None,
        }
    }

    /// The target whose listeners are currently running.
    #[inline]
    #[must_use]
    pub const fn current_target(&self) -> EventTarget {
        self.current_target
    }

    pub(crate) const fn set_current_target(&mut self, target: EventTarget) {
        self.current_target = target;
    }

    /// Suppress the page's default action for this event.
    #[inline]
    pub const fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[inline]
    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A default action the page performed after dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultAction {
    /// A link was followed. Fragment links jump to their target.
    FollowLink { link: NodeKey, href: String },
    /// A form would have been submitted over the network.
    SubmitForm { form: NodeKey },
}
