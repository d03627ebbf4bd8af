//! Page handler: the event runtime a site script runs inside.
//!
//! A [`state::Page`] owns the loaded [`dom::Document`] together with the
//! listener registry, the virtual-time timer queue and the intersection
//! observers. The embedder drives it through host entry points (click,
//! scroll, submit, load, resize, advance) and every document change is
//! forwarded to an optional rendering surface as `DOMUpdate` batches.

pub mod clock;
pub mod config;
pub mod events;
pub mod intersection;
pub mod runtime;
pub mod scheduler;
pub mod state;

pub use clock::{FixedClock, SystemClock, WallClock};
pub use config::SiteConfig;
pub use events::{DefaultAction, Event, EventTarget, EventType};
pub use intersection::{IntersectionEntry, IntersectionOptions};
pub use state::{HostContext, Page};
