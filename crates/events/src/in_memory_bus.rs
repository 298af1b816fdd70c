//! In-process bus backed by `std::sync::mpsc` channels.

use std::sync::{Mutex, mpsc};

use thiserror::Error;
use tracing::debug;

use crate::bus::{EventBus, StreamFilter, Subscription};
use crate::scope::AggregateScoped;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    #[error("event bus subscriber list poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct Subscriber<M> {
    filter: StreamFilter,
    sender: mpsc::Sender<M>,
}

/// Broadcast bus for a single process.
///
/// Publish order is delivery order for every subscriber. Filtering happens
/// here, so a pinned subscriber never sees (or queues) foreign streams.
/// Subscribers that hung up are pruned the next time a message is meant
/// for them.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<Subscriber<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriptions, as of the last publish.
    pub fn subscriber_count(&self) -> Result<usize, InMemoryBusError> {
        self.subscribers
            .lock()
            .map(|subs| subs.len())
            .map_err(|_| InMemoryBusError::Poisoned)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: AggregateScoped + Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        let before = subs.len();
        subs.retain(|sub| !sub.filter.admits(&message) || sub.sender.send(message.clone()).is_ok());

        let closed = before - subs.len();
        if closed > 0 {
            debug!(closed, remaining = subs.len(), "pruned closed subscriptions");
        }
        Ok(())
    }

    fn subscribe(&self, filter: StreamFilter) -> Result<Subscription<M>, Self::Error> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?
            .push(Subscriber { filter, sender });
        Ok(Subscription::new(filter, receiver))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use benefits_core::AggregateId;

    use super::*;
    use crate::EventEnvelope;

    type Bus = InMemoryEventBus<EventEnvelope<u64>>;

    fn envelope(aggregate_id: AggregateId, seq: u64) -> EventEnvelope<u64> {
        EventEnvelope::new(Uuid::now_v7(), aggregate_id, "test.stream", seq, seq)
    }

    fn sequences(sub: &Subscription<EventEnvelope<u64>>) -> Vec<u64> {
        sub.drain().map(|env| env.sequence_number()).collect()
    }

    #[test]
    fn every_subscriber_sees_messages_in_publish_order() {
        let bus = Bus::new();
        let a = bus.subscribe(StreamFilter::All).unwrap();
        let b = bus.subscribe(StreamFilter::All).unwrap();

        let id = AggregateId::new();
        for seq in 1..=3 {
            bus.publish(envelope(id, seq)).unwrap();
        }

        assert_eq!(sequences(&a), vec![1, 2, 3]);
        assert_eq!(sequences(&b), vec![1, 2, 3]);
    }

    #[test]
    fn pinned_subscribers_only_receive_their_stream() {
        let bus = Bus::new();
        let mine = AggregateId::new();
        let other = AggregateId::new();
        let pinned = bus.subscribe(StreamFilter::Aggregate(mine)).unwrap();

        bus.publish(envelope(other, 1)).unwrap();
        bus.publish(envelope(mine, 1)).unwrap();
        bus.publish(envelope(other, 2)).unwrap();
        bus.publish(envelope(mine, 2)).unwrap();

        let got: Vec<_> = pinned.drain().map(|e| (e.aggregate_id(), e.sequence_number())).collect();
        assert_eq!(got, vec![(mine, 1), (mine, 2)]);
    }

    #[test]
    fn closed_subscriptions_are_pruned_on_publish() {
        let bus = Bus::new();
        drop(bus.subscribe(StreamFilter::All).unwrap());
        let live = bus.subscribe(StreamFilter::All).unwrap();
        assert_eq!(bus.subscriber_count().unwrap(), 2);

        bus.publish(envelope(AggregateId::new(), 1)).unwrap();
        assert_eq!(bus.subscriber_count().unwrap(), 1);
        assert_eq!(sequences(&live), vec![1]);
    }

    #[test]
    fn late_subscribers_miss_earlier_messages() {
        let bus = Bus::new();
        bus.publish(envelope(AggregateId::new(), 1)).unwrap();
        let late = bus.subscribe(StreamFilter::All).unwrap();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn poisoned_bus_refuses_publish_and_subscribe() {
        let bus = Bus::new();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = bus.subscribers.lock().unwrap();
                    panic!("poison subscriber list");
                })
                .join();
        });

        assert_eq!(bus.publish(envelope(AggregateId::new(), 1)), Err(InMemoryBusError::Poisoned));
        assert!(matches!(bus.subscribe(StreamFilter::All), Err(InMemoryBusError::Poisoned)));
    }
}
