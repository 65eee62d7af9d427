//! Named event sources with typed handler registration.
//!
//! Each registration spawns one task that feeds events to its handler in
//! order. Every handler owns an unbounded queue, so a slow handler delays
//! its events but never loses one. [`Subscriptions`] owns a set of
//! registrations and tears all of them down together.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct EventSource<E> {
    name: &'static str,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<E>>>,
}

impl<E> EventSource<E>
where
    E: Clone + Send + 'static,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Queue `event` for every live handler; returns how many will see it.
    pub fn emit(&self, event: E) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Register `handler`. Events emitted after this call are delivered in
    /// order until the returned [`Subscription`] is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, mut handler: F) -> Subscription
    where
        F: FnMut(E) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        let source = self.name;
        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handler(event);
            }
            tracing::trace!(source, "Event source closed");
        });
        Subscription { source, task }
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<E>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live handler registration; dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    source: &'static str,
    task: JoinHandle<()>,
}

impl Subscription {
    #[must_use]
    pub fn source(&self) -> &'static str {
        self.source
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Disposal scope: every subscription pushed here is released together.
#[derive(Debug, Default)]
pub struct Subscriptions {
    items: Vec<Subscription>,
}

impl Subscriptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.items.push(subscription);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dispose(&mut self) {
        for subscription in self.items.drain(..) {
            tracing::trace!(source = subscription.source(), "Releasing subscription");
        }
    }
}
