//! Middleware composition.
//!
//! A route's chain is the global middleware, most recently registered first,
//! followed by the route's own handlers, frozen into an `Arc<[BoxedHandler]>`
//! when the app is finalized.
//! Traversal state lives in a per-request [`Cursor`]:
//!
//! ```text
//! slot:      0          1          2          3
//!         dispatch → chain[0] → chain[1] → chain[2]
//!            next()     next()     next()     next() ⇒ NextError::Exhausted
//! ```
//!
//! The frame at slot `s` advances to `chain[s]`. Each frame may advance at
//! most once; a second `next()` from the same frame is
//! [`NextError::AlreadyCalled`].

use std::sync::Arc;

use crate::handler::BoxedHandler;

/// An immutable, shareable sequence of handlers.
pub(crate) type Chain = Arc<[BoxedHandler]>;

/// Builds the chain for one route: `middleware` in reverse registration
/// order, so the last one registered is outermost, then `handlers`.
pub(crate) fn compose(middleware: &[BoxedHandler], handlers: &[BoxedHandler]) -> Chain {
    middleware.iter().rev().chain(handlers).cloned().collect()
}

/// Misuse of [`Context::next`](crate::Context::next).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NextError {
    /// `next()` was called by the last handler in the chain.
    #[error("no next handler")]
    Exhausted,
    /// The same handler called `next()` twice.
    #[error("next called more than once by the same handler")]
    AlreadyCalled,
}

/// Per-request traversal state over a [`Chain`].
pub(crate) struct Cursor {
    chain: Chain,
    current: usize,
    advanced: Vec<bool>,
}

impl Cursor {
    pub(crate) fn new(chain: Chain) -> Self {
        let advanced = vec![false; chain.len() + 1];
        Self { chain, current: 0, advanced }
    }

    /// Moves from the running frame into the next handler.
    ///
    /// Returns the caller's slot, to be handed back to [`rewind`](Self::rewind)
    /// once the handler's future completes, and the handler to run.
    pub(crate) fn advance(&mut self) -> Result<(usize, BoxedHandler), NextError> {
        let caller = self.current;
        let handler = self.chain.get(caller).cloned().ok_or(NextError::Exhausted)?;
        if std::mem::replace(&mut self.advanced[caller], true) {
            return Err(NextError::AlreadyCalled);
        }
        self.current = caller + 1;
        Ok((caller, handler))
    }

    /// Makes `slot` the running frame again.
    pub(crate) fn rewind(&mut self, slot: usize) {
        self.current = slot;
    }

    /// The slot of the running frame.
    pub(crate) fn current(&self) -> usize {
        self.current
    }
}
