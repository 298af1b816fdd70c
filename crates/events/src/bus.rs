//! Event distribution: fan published envelopes out to subscribers.
//!
//! The bus only delivers; envelopes are recorded elsewhere before they are
//! published. Estimates depend on per-aggregate ordering, so an implementation
//! must hand the messages of one aggregate stream to a subscriber in publish
//! order. Interleaving between different aggregates is fine.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use benefits_core::AggregateId;

use crate::scope::AggregateScoped;

/// Which part of the feed a subscription receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamFilter {
    /// Every published message.
    #[default]
    All,
    /// Only messages of one aggregate stream.
    Aggregate(AggregateId),
}

impl StreamFilter {
    pub fn admits<M: AggregateScoped>(&self, message: &M) -> bool {
        match self {
            StreamFilter::All => true,
            StreamFilter::Aggregate(id) => message.aggregate_id() == *id,
        }
    }
}

/// Receiving end of a bus subscription.
///
/// Gets a copy of every admitted message published after it was created.
/// Meant to be drained by a single thread.
#[derive(Debug)]
pub struct Subscription<M> {
    filter: StreamFilter,
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(filter: StreamFilter, receiver: Receiver<M>) -> Self {
        Self { filter, receiver }
    }

    pub fn filter(&self) -> StreamFilter {
        self.filter
    }

    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything already queued, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = M> + '_ {
        std::iter::from_fn(|| self.receiver.try_recv().ok())
    }
}

/// Pub/sub over aggregate-scoped messages.
///
/// Both publishing and subscribing can fail (closed transport, poisoned
/// lock). Failures go back to the caller, which owns any retry policy.
pub trait EventBus<M: AggregateScoped>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self, filter: StreamFilter) -> Result<Subscription<M>, Self::Error>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    M: AggregateScoped,
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self, filter: StreamFilter) -> Result<Subscription<M>, Self::Error> {
        (**self).subscribe(filter)
    }
}
