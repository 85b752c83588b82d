//! # Bound event channels.
//!
//! An [`Event`] is a named broadcast point owned by one instance. Owners
//! declare one `Event` field per event they raise and bind it with
//! [`Event::new`] in their constructor.
//!
//! ## Firing
//! [`Event::fire`] runs in two phases:
//! 1. the declared **body** runs synchronously with the event argument; its
//!    error is returned to the caller and nothing is delivered;
//! 2. a **snapshot** of the current subscribers is handed to the owner's
//!    [`Transaction`](crate::Transaction): delivered at once when no transaction
//!    is open, at the end of the outermost one otherwise.
//!
//! Delivery is skipped when the owner was already stopped on entry to `fire`;
//! the body still runs.
//!
//! ## Delivery rules
//! - **Snapshot**: handlers added or removed during a pass only affect later fires.
//! - **Order**: subscription order; duplicates are delivered once per subscription.
//! - **Abort**: the first failing handler ends the pass with
//!   [`Error::EventHandler`]; the remaining handlers of that pass are skipped.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use taskcast::{Event, EventSource, Handler, Transaction};
//!
//! struct Counter {
//!     value: Cell<u32>,
//!     tx: Transaction,
//!     on_change: Event<u32>,
//! }
//!
//! impl EventSource for Counter {
//!     fn transaction(&self) -> &Transaction { &self.tx }
//!     fn is_running(&self) -> bool { true }
//! }
//!
//! impl Counter {
//!     fn bump(&self) -> taskcast::Result<()> {
//!         let next = self.value.get() + 1;
//!         self.on_change.fire(self, next, |n| {
//!             self.value.set(*n);
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let c = Counter { value: Cell::new(0), tx: Transaction::new(), on_change: Event::new("on_change") };
//! c.on_change.subscribe(Handler::new(|n: &u32| { println!("now {n}"); Ok(()) }));
//! c.bump().unwrap();
//! assert_eq!(c.value.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};
use crate::events::{EventSource, Handler};

/// Per-instance event channel carrying an argument of type `A`.
pub struct Event<A> {
    name: &'static str,
    subscribers: RefCell<Vec<Handler<A>>>,
}

impl<A: 'static> Event<A> {
    /// Binds a new, unsubscribed channel named `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Name of the event.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends `handler`; the same handler may be subscribed more than once.
    pub fn subscribe(&self, handler: Handler<A>) {
        self.subscribers.borrow_mut().push(handler);
    }

    /// Removes the first subscription of `handler`.
    ///
    /// # Errors
    /// [`Error::HandlerNotFound`] if `handler` is not subscribed.
    pub fn unsubscribe(&self, handler: &Handler<A>) -> Result<()> {
        let mut subs = self.subscribers.borrow_mut();
        match subs.iter().position(|h| h == handler) {
            Some(idx) => {
                subs.remove(idx);
                Ok(())
            }
            None => Err(Error::HandlerNotFound { event: self.name }),
        }
    }

    /// Number of current subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Returns `true` if at least one handler is subscribed.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.borrow().is_empty()
    }

    /// Runs `body` with `arg`, then delivers `arg` to the subscribers.
    ///
    /// # Errors
    /// - the error of `body`, before anything is delivered;
    /// - [`Error::EventHandler`] if delivery happened immediately and a handler failed.
    pub fn fire<S, F>(&self, source: &S, arg: A, body: F) -> Result<()>
    where
        S: EventSource + ?Sized,
        F: FnOnce(&A) -> Result<()>,
    {
        let deliver = source.is_running();
        body(&arg)?;

        if !deliver {
            trace!(event = self.name, "owner stopped; delivery skipped");
            return Ok(());
        }

        let snapshot = self.subscribers.borrow().clone();
        let event = self.name;
        trace!(event, subscribers = snapshot.len(), "event raised");
        source
            .transaction()
            .enqueue(move || deliver_all(event, &snapshot, &arg))
    }

    /// Fires an event that has no body.
    pub fn emit<S>(&self, source: &S, arg: A) -> Result<()>
    where
        S: EventSource + ?Sized,
    {
        self.fire(source, arg, |_| Ok(()))
    }
}

/// Delivers `arg` to every handler of one pass, stopping at the first error.
fn deliver_all<A>(event: &'static str, handlers: &[Handler<A>], arg: &A) -> Result<()> {
    for handler in handlers {
        handler
            .call(arg)
            .map_err(|source| Error::EventHandler { event, source })?;
    }
    Ok(())
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::events::Transaction;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct StubSource {
        running: Cell<bool>,
        tx: Transaction,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                running: Cell::new(true),
                tx: Transaction::new(),
            }
        }
    }

    impl EventSource for StubSource {
        fn transaction(&self) -> &Transaction {
            &self.tx
        }

        fn is_running(&self) -> bool {
            self.running.get()
        }
    }

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refused")
        }
    }

    impl std::error::Error for Refused {}

    fn recording(log: &Log, tag: &'static str) -> Handler<u32> {
        let log = Rc::clone(log);
        Handler::new(move |n: &u32| {
            log.borrow_mut().push(format!("{tag}:{n}"));
            Ok(())
        })
    }

    #[test]
    fn test_delivers_in_subscription_order_with_duplicates() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        let a = recording(&log, "a");
        let b = recording(&log, "b");
        ev.subscribe(a.clone());
        ev.subscribe(b);
        ev.subscribe(a);

        ev.emit(&src, 1).unwrap();
        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "a:1"]);
    }

    #[test]
    fn test_unsubscribe_removes_first_match_only() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        let a = recording(&log, "a");
        ev.subscribe(a.clone());
        ev.subscribe(a.clone());

        ev.unsubscribe(&a).unwrap();
        assert_eq!(ev.subscriber_count(), 1);
        ev.emit(&src, 2).unwrap();
        assert_eq!(*log.borrow(), vec!["a:2"]);
    }

    #[test]
    fn test_unsubscribe_unknown_handler_fails() {
        let ev: Event<u32> = Event::new("on_tick");
        let stranger = Handler::new(|_: &u32| Ok(()));
        let err = ev.unsubscribe(&stranger).unwrap_err();
        assert!(matches!(err, Error::HandlerNotFound { event: "on_tick" }));
    }

    #[test]
    fn test_body_runs_before_subscribers() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        ev.subscribe(recording(&log, "sub"));

        let l = Rc::clone(&log);
        ev.fire(&src, 3, |n| {
            l.borrow_mut().push(format!("body:{n}"));
            Ok(())
        })
        .unwrap();
        assert_eq!(*log.borrow(), vec!["body:3", "sub:3"]);
    }

    #[test]
    fn test_body_error_skips_delivery() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        ev.subscribe(recording(&log, "sub"));

        let err = ev
            .fire(&src, 4, |_| Err(Error::HandlerNotFound { event: "other" }))
            .unwrap_err();
        assert!(matches!(err, Error::HandlerNotFound { event: "other" }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_delivery_deferred_inside_transaction() {
        let src = StubSource::new();
        let a = Event::new("a");
        let b = Event::new("b");
        let log = Log::default();
        a.subscribe(recording(&log, "a"));
        b.subscribe(recording(&log, "b"));

        src.tx
            .run(|| {
                a.emit(&src, 1)?;
                src.tx.run(|| b.emit(&src, 2))?;
                assert!(log.borrow().is_empty());
                Ok::<_, Error>(())
            })
            .unwrap();

        assert_eq!(*log.borrow(), vec!["a:1", "b:2"]);
    }

    #[test]
    fn test_stopped_owner_runs_body_but_skips_delivery() {
        let src = StubSource::new();
        src.running.set(false);
        let ev = Event::new("on_tick");
        let log = Log::default();
        ev.subscribe(recording(&log, "sub"));

        let ran = Cell::new(false);
        ev.fire(&src, 5, |_| {
            ran.set(true);
            Ok(())
        })
        .unwrap();
        assert!(ran.get());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_owner_stopped_by_body_still_delivers() {
        let src = StubSource::new();
        let ev = Event::new("on_done");
        let log = Log::default();
        ev.subscribe(recording(&log, "sub"));

        ev.fire(&src, 6, |_| {
            src.running.set(false);
            Ok(())
        })
        .unwrap();
        assert_eq!(*log.borrow(), vec!["sub:6"]);
    }

    #[test]
    fn test_handler_error_aborts_rest_of_pass() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        ev.subscribe(recording(&log, "first"));
        ev.subscribe(Handler::new(|_: &u32| -> Result<(), BoxError> {
            Err(Box::new(Refused))
        }));
        ev.subscribe(recording(&log, "last"));

        let err = ev.emit(&src, 7).unwrap_err();
        match err {
            Error::EventHandler { event, source } => {
                assert_eq!(event, "on_tick");
                assert_eq!(source.to_string(), "refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*log.borrow(), vec!["first:7"]);
    }

    #[test]
    fn test_later_fire_after_handler_error_reaches_everyone() {
        let src = StubSource::new();
        let ev = Event::new("on_tick");
        let log = Log::default();
        let fail_once = Rc::new(Cell::new(true));
        let f = Rc::clone(&fail_once);
        ev.subscribe(Handler::new(move |_: &u32| -> Result<(), BoxError> {
            if f.replace(false) {
                return Err(Box::new(Refused));
            }
            Ok(())
        }));
        ev.subscribe(recording(&log, "after"));

        assert!(ev.emit(&src, 1).is_err());
        ev.emit(&src, 2).unwrap();
        assert_eq!(*log.borrow(), vec!["after:2"]);
    }

    #[test]
    fn test_handlers_changing_subscriptions_do_not_affect_current_pass() {
        let src = Rc::new(StubSource::new());
        let ev: Rc<Event<u32>> = Rc::new(Event::new("on_tick"));
        let log = Log::default();
        let victim = recording(&log, "victim");
        let late = recording(&log, "late");

        let (e, v, l) = (Rc::clone(&ev), victim.clone(), late.clone());
        ev.subscribe(Handler::new(move |_: &u32| {
            e.unsubscribe(&v)?;
            e.subscribe(l.clone());
            Ok(())
        }));
        ev.subscribe(victim);

        ev.emit(&*src, 1).unwrap();
        assert_eq!(*log.borrow(), vec!["victim:1"]);
    }

    proptest! {
        #[test]
        fn prop_fire_reaches_exactly_current_subscribers(
            ops in proptest::collection::vec((0u8..3, 0usize..4), 0..40)
        ) {
            let src = StubSource::new();
            let ev: Event<u32> = Event::new("on_tick");
            let hits: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
            let handlers: Vec<Handler<u32>> = (0..4usize)
                .map(|i| {
                    let hits = Rc::clone(&hits);
                    Handler::new(move |_: &u32| {
                        hits.borrow_mut().push(i);
                        Ok(())
                    })
                })
                .collect();
            let mut model: Vec<usize> = Vec::new();

            for (op, idx) in ops {
                match op {
                    0 => {
                        ev.subscribe(handlers[idx].clone());
                        model.push(idx);
                    }
                    1 => {
                        let removed = ev.unsubscribe(&handlers[idx]).is_ok();
                        let pos = model.iter().position(|&m| m == idx);
                        prop_assert_eq!(removed, pos.is_some());
                        if let Some(pos) = pos {
                            model.remove(pos);
                        }
                    }
                    _ => {
                        hits.borrow_mut().clear();
                        ev.emit(&src, 0).unwrap();
                        prop_assert_eq!(&*hits.borrow(), &model);
                    }
                }
            }
        }
    }
}
