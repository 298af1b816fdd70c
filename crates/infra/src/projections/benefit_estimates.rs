use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info, warn};

use benefits_core::{AggregateId, AggregateRoot};
use benefits_estimate::{
    AGGREGATE_TYPE, BenefitEstimate, BenefitEstimateEvent, BenefitsConfig, EstimateError, EstimateId,
};
use benefits_events::{Event, EventEnvelope};

use crate::read_model::{ReadModelError, ReadModelStore};

#[derive(Debug, Error)]
pub enum EstimateProjectionError {
    #[error("failed to deserialize benefits estimate event: {0}")]
    Deserialize(String),

    #[error("event estimate_id {event} does not match envelope aggregate_id {envelope}")]
    AggregateMismatch { envelope: AggregateId, event: AggregateId },

    #[error("event rejected: {0}")]
    Rejected(#[from] EstimateError),

    #[error("read model store failed: {0}")]
    Store(#[from] ReadModelError),

    #[error("projection lock poisoned")]
    Poisoned,
}

/// Benefits estimate projection: one [`BenefitEstimate`] per aggregate id.
///
/// Consumes published envelopes (JSON payloads), locates the estimate for the
/// envelope's aggregate (creating an empty one on first sight), folds the
/// event in and stores the new snapshot.
///
/// - Envelopes of other aggregate types are ignored
/// - Sequence numbers at or below the stored cursor are treated as redelivery and skipped
/// - Gaps, domain rejections and store failures are surfaced; the stored snapshot is left untouched
#[derive(Debug)]
pub struct BenefitEstimatesProjection<S>
where
    S: ReadModelStore<EstimateId, BenefitEstimate>,
{
    store: S,
    config: Arc<BenefitsConfig>,
    // Serialises the get/apply/upsert cycle and rebuilds.
    write_lock: Mutex<()>,
}

impl<S> BenefitEstimatesProjection<S>
where
    S: ReadModelStore<EstimateId, BenefitEstimate>,
{
    pub fn new(store: S, config: Arc<BenefitsConfig>) -> Self {
        Self {
            store,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BenefitsConfig {
        &self.config
    }

    /// Query the current snapshot for one estimate.
    pub fn get(&self, id: &EstimateId) -> Result<Option<BenefitEstimate>, EstimateProjectionError> {
        Ok(self.store.get(id)?)
    }

    /// All stored estimates, in no particular order.
    pub fn list(&self) -> Result<Vec<BenefitEstimate>, EstimateProjectionError> {
        Ok(self.store.list()?)
    }

    /// Apply a published envelope carrying a JSON payload.
    pub fn apply_envelope(&self, envelope: &EventEnvelope<JsonValue>) -> Result<(), EstimateProjectionError> {
        match decode(envelope)? {
            Some(event) => self.apply_event(envelope.aggregate_id(), envelope.sequence_number(), &event),
            None => Ok(()),
        }
    }

    /// Apply an already-decoded envelope.
    pub fn apply_typed(
        &self,
        envelope: &EventEnvelope<BenefitEstimateEvent>,
    ) -> Result<(), EstimateProjectionError> {
        self.apply_event(envelope.aggregate_id(), envelope.sequence_number(), envelope.payload())
    }

    fn apply_event(
        &self,
        aggregate_id: AggregateId,
        seq: u64,
        event: &BenefitEstimateEvent,
    ) -> Result<(), EstimateProjectionError> {
        let estimate_id = owning_estimate(aggregate_id, event)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| EstimateProjectionError::Poisoned)?;

        let mut estimate = self
            .store
            .get(&estimate_id)?
            .unwrap_or_else(|| BenefitEstimate::empty(estimate_id));

        if fold(&mut estimate, seq, event, &self.config)? {
            self.store.upsert(estimate_id, estimate)?;
        }
        Ok(())
    }

    /// Rebuild every estimate from scratch by replaying envelopes.
    ///
    /// Replay order is deterministic: aggregate id, then sequence number.
    /// The new snapshots are built aside and swapped in only when the whole
    /// feed folded cleanly; on error the store keeps its previous content.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), EstimateProjectionError> {
        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (e.aggregate_id(), e.sequence_number()));

        let mut rebuilt: HashMap<EstimateId, BenefitEstimate> = HashMap::new();
        for env in &envs {
            let Some(event) = decode(env)? else { continue };
            let estimate_id = owning_estimate(env.aggregate_id(), &event)?;
            let estimate = rebuilt
                .entry(estimate_id)
                .or_insert_with(|| BenefitEstimate::empty(estimate_id));
            fold(estimate, env.sequence_number(), &event, &self.config)?;
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| EstimateProjectionError::Poisoned)?;
        let estimates = rebuilt.len();
        self.store.replace_all(rebuilt.into_iter().collect())?;

        info!(envelopes = envs.len(), estimates, "benefits estimates rebuilt");
        Ok(())
    }
}

/// Decode a JSON envelope; `None` when it belongs to another aggregate type.
fn decode(envelope: &EventEnvelope<JsonValue>) -> Result<Option<BenefitEstimateEvent>, EstimateProjectionError> {
    if envelope.aggregate_type() != AGGREGATE_TYPE {
        debug!(
            aggregate_type = envelope.aggregate_type(),
            "ignoring envelope for another aggregate type"
        );
        return Ok(None);
    }

    serde_json::from_value(envelope.payload().clone())
        .map(Some)
        .map_err(|e| EstimateProjectionError::Deserialize(e.to_string()))
}

fn owning_estimate(
    aggregate_id: AggregateId,
    event: &BenefitEstimateEvent,
) -> Result<EstimateId, EstimateProjectionError> {
    let estimate_id = event.estimate_id();
    if estimate_id.0 != aggregate_id {
        return Err(EstimateProjectionError::AggregateMismatch {
            envelope: aggregate_id,
            event: estimate_id.0,
        });
    }
    Ok(estimate_id)
}

/// Fold one event into `estimate`. Returns `false` for a redelivered event.
fn fold(
    estimate: &mut BenefitEstimate,
    seq: u64,
    event: &BenefitEstimateEvent,
    config: &BenefitsConfig,
) -> Result<bool, EstimateProjectionError> {
    let estimate_id = estimate.estimate_id();
    let last = estimate.version();
    if last > 0 && seq <= last {
        debug!(
            estimate_id = %estimate_id,
            sequence_number = seq,
            last_applied = last,
            "skipping already applied event"
        );
        return Ok(false);
    }

    if let Err(err) = estimate.apply(seq, event, config) {
        warn!(
            estimate_id = %estimate_id,
            sequence_number = seq,
            event_type = event.event_type(),
            error = %err,
            "benefits estimate rejected event"
        );
        return Err(err.into());
    }

    debug!(
        estimate_id = %estimate_id,
        sequence_number = seq,
        event_type = event.event_type(),
        annual_benefits_cost = %estimate.annual_benefits_cost(),
        deduction_per_paycheck = %estimate.deduction_per_paycheck(),
        "benefits estimate updated"
    );
    Ok(true)
}
