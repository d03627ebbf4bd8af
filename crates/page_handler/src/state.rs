use crate::clock::{SystemClock, WallClock};
use crate::config::SiteConfig;
use crate::events::{DefaultAction, Event, EventTarget, EventType};
use crate::intersection::{IntersectionEntry, IntersectionOptions, Observer};
use crate::scheduler::TimerQueue;
use anyhow::{Error, bail};
use chrono::{DateTime, Utc};
use core::time::Duration;
use dom::{DOMMirror, DOMSubscriber, DOMUpdate, Document, NodeKey, ScrollBehavior, View, Viewport};
use log::{debug, warn};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::info_span;

/// An event listener. Errors are logged and do not stop later listeners.
pub type Listener = Box<dyn FnMut(&mut HostContext<'_>, &mut Event) -> Result<(), Error>>;
/// A delayed callback.
pub type TimerCallback = Box<dyn FnOnce(&mut HostContext<'_>) -> Result<(), Error>>;
/// An intersection observer callback, given the entries that changed.
pub type IntersectionCallback =
    Box<dyn FnMut(&mut HostContext<'_>, &[IntersectionEntry]) -> Result<(), Error>>;

/// Scroll requests applied in a row before the page stops following them.
const MAX_SCROLL_CHAIN: usize = 16;
/// Timer turns `run_until_idle` runs before giving up on a self-rescheduling callback.
const MAX_IDLE_TURNS: usize = 10_000;
/// Capacity of the channel created by [`Page::create_mirror`].
const MIRROR_CHANNEL_CAPACITY: usize = 128;

/// What a listener or timer callback can reach while it runs.
pub struct HostContext<'page> {
    /// The document, through the narrow interaction surface.
    pub view: &'page mut dyn View,
    timers: &'page mut TimerQueue<TimerCallback>,
    config: &'page SiteConfig,
    clock: &'page dyn WallClock,
}

impl HostContext<'_> {
    /// Run `callback` once after `delay` of page time.
    pub fn set_timeout<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce(&mut HostContext<'_>) -> Result<(), Error> + 'static,
    {
        self.timers.schedule(delay, Box::new(callback));
    }

    pub const fn config(&self) -> &SiteConfig {
        self.config
    }

    /// Current wall-clock time.
    pub fn wall_clock(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Page time elapsed since the page was created.
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Whether the viewport currently uses the mobile layout.
    pub fn is_narrow(&self) -> bool {
        self.config.is_narrow(self.view.viewport().width)
    }
}

/// A loaded page: the document plus everything needed to run its interactions.
pub struct Page {
    document: Document,
    config: SiteConfig,
    clock: Box<dyn WallClock>,
    listeners: HashMap<(EventTarget, EventType), Vec<Listener>>,
    timers: TimerQueue<TimerCallback>,
    observers: Vec<Observer<IntersectionCallback>>,
    default_actions: Vec<DefaultAction>,
    update_sender: Option<mpsc::Sender<Vec<DOMUpdate>>>,
    loaded: bool,
}

impl Page {
    pub fn new(document: Document, config: SiteConfig) -> Self {
        Self {
            document,
            config,
            clock: Box::new(SystemClock),
            listeners: HashMap::new(),
            timers: TimerQueue::new(),
            observers: Vec::new(),
            default_actions: Vec::new(),
            update_sender: None,
            loaded: false,
        }
    }

    /// Parse `html` and wrap the resulting document.
    ///
    /// # Errors
    /// Returns an error if the markup cannot be loaded.
    pub fn from_html(html: &str, config: SiteConfig) -> Result<Self, Error> {
        Ok(Self::new(Document::parse_html(html)?, config))
    }

    /// Replace the wall clock.
    #[must_use]
    pub fn with_clock<C: WallClock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Forward document changes to `sender`, starting with a snapshot of
    /// the current tree.
    pub fn attach_update_sender(&mut self, sender: mpsc::Sender<Vec<DOMUpdate>>) {
        self.document.take_updates();
        match sender.try_send(self.document.snapshot()) {
            Ok(()) => self.update_sender = Some(sender),
            Err(TrySendError::Full(_)) => {
                warn!("update channel full, snapshot not sent");
                self.update_sender = Some(sender);
            }
            Err(TrySendError::Closed(_)) => debug!("update receiver gone before attach"),
        }
    }

    /// Create a mirror fed by this page's document changes, starting from
    /// the tree as it is now.
    pub fn create_mirror<T: DOMSubscriber>(&mut self, mirror: T) -> DOMMirror<T> {
        let (sender, receiver) = mpsc::channel(MIRROR_CHANNEL_CAPACITY);
        self.attach_update_sender(sender);
        DOMMirror::new(receiver, mirror)
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for the embedder, e.g. to feed layout boxes.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Page time elapsed since creation.
    pub const fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Number of delayed callbacks still waiting.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the next delayed callback.
    pub fn next_timer_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drain the default actions performed since the previous call.
    pub fn take_default_actions(&mut self) -> Vec<DefaultAction> {
        core::mem::take(&mut self.default_actions)
    }

    // ----- registration -----

    /// Register a listener. Listeners on the same target and type run in
    /// registration order.
    pub fn add_listener<F>(&mut self, target: EventTarget, kind: EventType, listener: F)
    where
        F: FnMut(&mut HostContext<'_>, &mut Event) -> Result<(), Error> + 'static,
    {
        self.listeners
            .entry((target, kind))
            .or_default()
            .push(Box::new(listener));
    }

    /// Observe `targets`. The callback receives the initial state of every
    /// target right away and afterwards each target whose state changes.
    pub fn observe_intersections<F>(
        &mut self,
        options: IntersectionOptions,
        targets: Vec<NodeKey>,
        callback: F,
    ) where
        F: FnMut(&mut HostContext<'_>, &[IntersectionEntry]) -> Result<(), Error> + 'static,
    {
        self.observers
            .push(Observer::new(options, targets, Box::new(callback)));
        self.update_intersections();
        self.settle();
    }

    /// Run script code outside of any event, as a page script does while it
    /// is first evaluated.
    pub fn run_script<R>(&mut self, script: impl FnOnce(&mut HostContext<'_>) -> R) -> R {
        let result = {
            let Self {
                document,
                timers,
                config,
                clock,
                ..
            } = self;
            let mut ctx = HostContext {
                view: document,
                timers,
                config,
                clock: &**clock,
            };
            script(&mut ctx)
        };
        self.settle();
        result
    }

    // ----- host entry points -----

    /// Click on `node`, then perform the link default unless prevented.
    ///
    /// # Errors
    /// Fails when `node` is not in the document.
    pub fn click(&mut self, node: NodeKey) -> Result<(), Error> {
        if !self.document.is_connected(node) {
            bail!("cannot click {node}: not in the document");
        }
        let event = self.dispatch(EventType::Click, EventTarget::Node(node));
        if !event.default_prevented() {
            self.follow_link(node)?;
        }
        self.settle();
        Ok(())
    }

    /// Click on the page background.
    pub fn click_document(&mut self) {
        self.dispatch(EventType::Click, EventTarget::Document);
        self.settle();
    }

    /// Submit `form`. Unless a listener prevents it, the network submission
    /// is recorded as a default action.
    ///
    /// # Errors
    /// Fails when `form` is not a form in the document.
    pub fn submit(&mut self, form: NodeKey) -> Result<(), Error> {
        if !self.document.is_connected(form)
            || self.document.tag_name(form).as_deref() != Some("form")
        {
            bail!("cannot submit {form}: not a form in the document");
        }
        let event = self.dispatch(EventType::Submit, EventTarget::Node(form));
        if !event.default_prevented() {
            self.default_actions.push(DefaultAction::SubmitForm { form });
        }
        self.settle();
        Ok(())
    }

    /// The user scrolled to `scroll_y`.
    pub fn scroll_to(&mut self, scroll_y: f64) {
        self.document.set_scroll_y(scroll_y);
        self.fire_window(EventType::Scroll);
        self.settle();
    }

    /// Fire the window `load` event. Only the first call dispatches.
    pub fn load(&mut self) {
        if self.loaded {
            debug!("load already fired");
            return;
        }
        self.loaded = true;
        self.fire_window(EventType::Load);
        self.settle();
    }

    /// The viewport changed size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.document.set_viewport(Viewport { width, height });
        self.fire_window(EventType::Resize);
        self.settle();
    }

    /// Let `duration` of page time pass, running every callback that falls due.
    pub fn advance(&mut self, duration: Duration) {
        let limit = self.timers.now().saturating_add(duration);
        self.run_timers(limit);
        self.timers.advance_to(limit);
    }

    /// Run delayed callbacks until none are left.
    pub fn run_until_idle(&mut self) {
        for _ in 0..MAX_IDLE_TURNS {
            let Some(due) = self.timers.next_due() else {
                return;
            };
            self.run_timers(due);
        }
        warn!("timers still pending after {MAX_IDLE_TURNS} turns");
    }

    // ----- internals -----

    fn propagation_path(&self, kind: EventType, target: EventTarget) -> Vec<EventTarget> {
        if kind.is_window_only() {
            return vec![EventTarget::Window];
        }
        match target {
            EventTarget::Window => vec![EventTarget::Window],
            EventTarget::Document => vec![EventTarget::Document, EventTarget::Window],
            EventTarget::Node(node) => {
                let mut path = vec![EventTarget::Node(node)];
                let mut current = node;
                while let Some(parent) = self.document.parent(current) {
                    path.push(EventTarget::Node(parent));
                    current = parent;
                }
                path.push(EventTarget::Document);
                path.push(EventTarget::Window);
                path
            }
        }
    }

    fn dispatch(&mut self, kind: EventType, target: EventTarget) -> Event {
        let _span = info_span!("page.dispatch", event = kind.name()).entered();
        let path = self.propagation_path(kind, target);
        let mut event = Event::new(kind, target);
        let Self {
            document,
            listeners,
            timers,
            config,
            clock,
            ..
        } = self;
        let mut ctx = HostContext {
            view: document,
            timers,
            config,
            clock: &**clock,
        };
        for hop in path {
            let Some(registered) = listeners.get_mut(&(hop, kind)) else {
                continue;
            };
            event.set_current_target(hop);
            for listener in registered.iter_mut() {
                if let Err(err) = listener(&mut ctx, &mut event) {
                    warn!("{kind} listener on {hop:?} failed: {err:#}");
                }
            }
        }
        event
    }

    fn fire_window(&mut self, kind: EventType) {
        self.dispatch(kind, EventTarget::Window);
        self.update_intersections();
    }

    fn update_intersections(&mut self) {
        let Self {
            document,
            observers,
            timers,
            config,
            clock,
            ..
        } = self;
        for observer in observers.iter_mut() {
            let changes = observer.collect_changes(&*document);
            if changes.is_empty() {
                continue;
            }
            let mut ctx = HostContext {
                view: &mut *document,
                timers: &mut *timers,
                config: &*config,
                clock: &**clock,
            };
            if let Err(err) = (observer.callback)(&mut ctx, &changes) {
                warn!("intersection callback failed: {err:#}");
            }
        }
    }

    fn follow_link(&mut self, node: NodeKey) -> Result<(), Error> {
        let Some(link) = self.document.closest(node, "a[href]")? else {
            return Ok(());
        };
        let href = self.document.attribute(link, "href").unwrap_or_default();
        if let Some(fragment) = href.strip_prefix('#')
            && !fragment.is_empty()
            && let Some(top) = self
                .document
                .element_by_id(fragment)
                .and_then(|target| self.document.offset_top(target))
        {
            self.document.scroll_to(top, ScrollBehavior::Instant);
        }
        self.default_actions.push(DefaultAction::FollowLink { link, href });
        Ok(())
    }

    fn run_timers(&mut self, limit: Duration) {
        while let Some(callback) = self.timers.pop_due(limit) {
            let _span = info_span!("page.timer", at = ?self.timers.now()).entered();
            let outcome = {
                let Self {
                    document,
                    timers,
                    config,
                    clock,
                    ..
                } = self;
                let mut ctx = HostContext {
                    view: document,
                    timers,
                    config,
                    clock: &**clock,
                };
                callback(&mut ctx)
            };
            if let Err(err) = outcome {
                warn!("timer callback failed: {err:#}");
            }
            self.settle();
        }
    }

    /// Apply scrolls requested by script, then forward pending changes.
    fn settle(&mut self) {
        for _ in 0..MAX_SCROLL_CHAIN {
            let Some(request) = self.document.take_scroll_request() else {
                break;
            };
            debug!("applying {:?} scroll to {}", request.behavior, request.top);
            self.document.set_scroll_y(request.top);
            self.fire_window(EventType::Scroll);
        }
        self.flush();
    }

    /// Without a sender the batch is discarded; a later mirror starts from
    /// a snapshot instead.
    fn flush(&mut self) {
        let batch = self.document.take_updates();
        if batch.is_empty() {
            return;
        }
        let Some(sender) = &self.update_sender else {
            return;
        };
        match sender.try_send(batch) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!("update channel full, dropped {} updates", dropped.len());
            }
            Err(TrySendError::Closed(_)) => {
                debug!("update receiver gone");
                self.update_sender = None;
            }
        }
    }
}
