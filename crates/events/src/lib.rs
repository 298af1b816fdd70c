//! Event mechanics: envelopes and their distribution.
//!
//! Nothing in here knows about benefits; domain crates plug their event enums
//! into these types.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod scope;

pub use bus::{EventBus, StreamFilter, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use scope::AggregateScoped;
