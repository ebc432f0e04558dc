//! Context Signal Hub Tests
//!
//! Tests for:
//! - Subscription order and per-signal routing
//! - Unsubscribing (including from inside a listener)
//! - Default suppression on the lost event

use std::cell::RefCell;
use std::rc::Rc;

use relume::surface::{ContextEvent, ContextEvents, ContextSignal, ListenerId};

fn recorder() -> Rc<RefCell<Vec<&'static str>>> {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn listeners_run_in_subscription_order() {
    let events = ContextEvents::new();
    let log = recorder();
    for name in ["first", "second", "third"] {
        let log = Rc::clone(&log);
        events.subscribe(ContextSignal::Restored, move |_| log.borrow_mut().push(name));
    }

    events.dispatch_restored();

    assert_eq!(*log.borrow(), ["first", "second", "third"]);
}

#[test]
fn signals_are_routed_separately() {
    let events = ContextEvents::new();
    let log = recorder();

    let l = Rc::clone(&log);
    events.subscribe(ContextSignal::Lost, move |event| {
        assert_eq!(event.signal(), ContextSignal::Lost);
        l.borrow_mut().push("lost");
    });
    let l = Rc::clone(&log);
    events.subscribe(ContextSignal::Restored, move |event| {
        assert!(matches!(event, ContextEvent::Restored));
        l.borrow_mut().push("restored");
    });

    events.dispatch_lost();
    events.dispatch_restored();

    assert_eq!(*log.borrow(), ["lost", "restored"]);
    assert_eq!(events.listener_count(ContextSignal::Lost), 1);
    assert_eq!(events.listener_count(ContextSignal::Restored), 1);
}

#[test]
fn default_is_not_prevented_without_listeners() {
    let events = ContextEvents::new();
    assert!(!events.dispatch_lost().default_prevented());
}

#[test]
fn listener_can_prevent_default() {
    let events = ContextEvents::new();
    events.subscribe(ContextSignal::Lost, |event| {
        if let ContextEvent::Lost(lost) = event {
            lost.prevent_default();
        }
    });

    assert!(events.dispatch_lost().default_prevented());
}

#[test]
fn unsubscribe_is_idempotent() {
    let events = ContextEvents::new();
    let id = events.subscribe(ContextSignal::Lost, |_| {});

    assert!(events.is_subscribed(id));
    assert!(events.unsubscribe(id));
    assert!(!events.unsubscribe(id));
    assert!(!events.is_subscribed(id));
}

#[test]
fn listener_removed_mid_dispatch_is_skipped() {
    let events = Rc::new(ContextEvents::new());
    let log = recorder();
    let victim: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));

    let hub = Rc::clone(&events);
    let target = Rc::clone(&victim);
    let l = Rc::clone(&log);
    events.subscribe(ContextSignal::Restored, move |_| {
        l.borrow_mut().push("remover");
        if let Some(id) = target.borrow_mut().take() {
            hub.unsubscribe(id);
        }
    });
    let l = Rc::clone(&log);
    let id = events.subscribe(ContextSignal::Restored, move |_| l.borrow_mut().push("removed"));
    *victim.borrow_mut() = Some(id);

    events.dispatch_restored();
    events.dispatch_restored();

    assert_eq!(*log.borrow(), ["remover", "remover"]);
}

#[test]
fn listener_added_mid_dispatch_waits_for_next_signal() {
    let events = Rc::new(ContextEvents::new());
    let log = recorder();

    let hub = Rc::clone(&events);
    let l = Rc::clone(&log);
    let added = Rc::new(RefCell::new(false));
    events.subscribe(ContextSignal::Lost, move |_| {
        if !added.replace(true) {
            let l = Rc::clone(&l);
            hub.subscribe(ContextSignal::Lost, move |_| l.borrow_mut().push("late"));
        }
    });

    events.dispatch_lost();
    assert!(log.borrow().is_empty());

    events.dispatch_lost();
    assert_eq!(*log.borrow(), ["late"]);
}
