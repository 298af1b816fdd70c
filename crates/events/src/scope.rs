use benefits_core::AggregateId;

use crate::EventEnvelope;

/// Messages that belong to a single aggregate stream.
///
/// Workers use this to pin themselves to one aggregate and ignore the rest of
/// the feed.
pub trait AggregateScoped {
    fn aggregate_id(&self) -> AggregateId;
}

impl<E> AggregateScoped for EventEnvelope<E> {
    fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id()
    }
}
