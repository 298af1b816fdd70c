//! Aggregate root trait shared by write-side aggregates and per-aggregate read models.

/// Aggregate root marker + minimal interface.
///
/// Read models that mirror a single aggregate stream implement it so
/// infrastructure can locate them by id and tell how far through the stream
/// they are.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// For stream-backed models this is the sequence number of the last
    /// event folded in (0 before any event).
    fn version(&self) -> u64;
}
