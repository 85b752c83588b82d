//! # Subscriber handles.
//!
//! A [`Handler`] is a shared, reference-counted callable attached to an
//! [`Event`](crate::Event). Handles are compared by identity: cloning a handle
//! yields the *same* subscriber, so the clone can later be passed to
//! [`Event::unsubscribe`](crate::Event::unsubscribe).
//!
//! ## Example
//! ```rust
//! use taskcast::Handler;
//!
//! let a: Handler<u32> = Handler::new(|n| {
//!     println!("got {n}");
//!     Ok(())
//! });
//! let b = a.clone();
//! let c: Handler<u32> = Handler::new(|_| Ok(()));
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::error::BoxError;

/// Outcome of a single subscriber invocation.
pub type HandlerResult = Result<(), BoxError>;

/// Shared subscriber callable for events carrying an `A`.
pub struct Handler<A> {
    f: Rc<dyn Fn(&A) -> HandlerResult>,
}

impl<A> Handler<A> {
    /// Wraps a closure into a handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> HandlerResult + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Invokes the subscriber.
    #[inline]
    pub fn call(&self, arg: &A) -> HandlerResult {
        (self.f)(arg)
    }
}

impl<A> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<A> PartialEq for Handler<A> {
    /// Two handles are equal when they share the same allocation.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.f), Rc::as_ptr(&other.f))
    }
}

impl<A> Eq for Handler<A> {}

impl<A> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}
