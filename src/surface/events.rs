//! Context lifecycle signals of a rendering surface.
//!
//! [`ContextEvents`] is the per-surface subscription point for the two
//! signals a GPU context emits: *lost* and *restored*. Delivery is
//! synchronous, on the thread that dispatches, in subscription order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identifies one subscription on a [`ContextEvents`] hub.
    pub struct ListenerId;
}

/// Which lifecycle signal a listener observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextSignal {
    Lost,
    Restored,
}

/// Payload of the *lost* signal.
///
/// The platform's default reaction to a loss is to give the context up for
/// good. A listener that intends to recover calls
/// [`prevent_default`](Self::prevent_default).
#[derive(Debug, Default)]
pub struct ContextLostEvent {
    default_prevented: Cell<bool>,
}

impl ContextLostEvent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// A delivered signal.
#[derive(Debug, Clone, Copy)]
pub enum ContextEvent<'a> {
    Lost(&'a ContextLostEvent),
    Restored,
}

impl ContextEvent<'_> {
    #[must_use]
    pub fn signal(&self) -> ContextSignal {
        match self {
            Self::Lost(_) => ContextSignal::Lost,
            Self::Restored => ContextSignal::Restored,
        }
    }
}

type Listener = Rc<dyn Fn(&ContextEvent<'_>)>;

struct Subscription {
    signal: ContextSignal,
    listener: Listener,
}

/// Subscription hub for one surface's context signals.
#[derive(Default)]
pub struct ContextEvents {
    listeners: RefCell<SlotMap<ListenerId, Subscription>>,
    // Subscription order; slotmap iteration order is not insertion order
    order: RefCell<Vec<ListenerId>>,
}

impl std::fmt::Debug for ContextEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextEvents")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl ContextEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `signal`.
    pub fn subscribe(&self, signal: ContextSignal, listener: impl Fn(&ContextEvent<'_>) + 'static) -> ListenerId {
        let id = self.listeners.borrow_mut().insert(Subscription {
            signal,
            listener: Rc::new(listener),
        });
        self.order.borrow_mut().push(id);
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.listeners.borrow_mut().remove(id).is_some();
        if removed {
            self.order.borrow_mut().retain(|l| *l != id);
        }
        removed
    }

    #[must_use]
    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.borrow().contains_key(id)
    }

    #[must_use]
    pub fn listener_count(&self, signal: ContextSignal) -> usize {
        self.listeners.borrow().values().filter(|s| s.signal == signal).count()
    }

    /// Delivers *lost* and returns the event so the caller can check whether
    /// the default was prevented.
    pub fn dispatch_lost(&self) -> ContextLostEvent {
        let event = ContextLostEvent::new();
        self.dispatch(&ContextEvent::Lost(&event));
        event
    }

    pub fn dispatch_restored(&self) {
        self.dispatch(&ContextEvent::Restored);
    }

    fn dispatch(&self, event: &ContextEvent<'_>) {
        let signal = event.signal();
        // Snapshot so listeners may (un)subscribe while being called
        let targets: Vec<ListenerId> = self.order.borrow().clone();
        for id in targets {
            let listener = {
                let listeners = self.listeners.borrow();
                match listeners.get(id) {
                    Some(sub) if sub.signal == signal => Some(Rc::clone(&sub.listener)),
                    _ => None,
                }
            };
            if let Some(listener) = listener {
                listener(event);
            }
        }
    }
}
