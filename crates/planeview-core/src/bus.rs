//! Typed publish/subscribe channels for viewport events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::{ButtonEvent, DispatchReport, KeyEvent, PointerSample, ResizeEvent, WheelEvent};
use crate::tick::Tick;
use crate::viewport::ViewState;

/// Handle returned by [`Channel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Listener<E> = Box<dyn FnMut(&mut ViewState, &E)>;

/// Listeners for one event kind, invoked in subscription order.
pub struct Channel<E> {
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> Channel<E> {
    /// Add a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut ViewState, &E) + 'static,
    {
        let id = ListenerId::next();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was subscribed here.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with `event`.
    pub fn emit(&mut self, state: &mut ViewState, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(state, event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// One channel per viewport event kind.
///
/// `pre_*` channels fire before scene objects see an event, `post_*`
/// channels after, with a report of who consumed it.
#[derive(Debug, Default)]
pub struct EventBus {
    pub pre_mouse_down: Channel<ButtonEvent>,
    pub post_mouse_down: Channel<DispatchReport<ButtonEvent>>,
    pub pre_mouse_up: Channel<ButtonEvent>,
    pub post_mouse_up: Channel<DispatchReport<ButtonEvent>>,
    pub pre_click: Channel<ButtonEvent>,
    pub post_click: Channel<ButtonEvent>,
    pub pre_pointer_move: Channel<PointerSample>,
    pub post_pointer_move: Channel<PointerSample>,
    pub pre_wheel: Channel<WheelEvent>,
    pub post_wheel: Channel<DispatchReport<WheelEvent>>,
    pub resize: Channel<ResizeEvent>,
    pub tick: Channel<Tick>,
    pub key_down: Channel<KeyEvent>,
    pub key_up: Channel<KeyEvent>,
}
