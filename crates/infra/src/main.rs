//! `benefits-replay`: fold a JSON-lines envelope feed into benefits estimates.
//!
//! Usage: `benefits-replay [FILE]` (reads stdin when FILE is missing or `-`).
//! Prints the resulting estimates as a JSON array on stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value as JsonValue;
use tracing::info;

use benefits_estimate::{BenefitEstimate, EstimateId};
use benefits_events::EventEnvelope;
use benefits_infra::config;
use benefits_infra::projections::BenefitEstimatesProjection;
use benefits_infra::read_model::InMemoryReadModelStore;

fn main() -> anyhow::Result<()> {
    benefits_observability::init();

    let config = config::load_from_env().context("loading benefits configuration")?;
    info!(
        employee_base_cost = %config.employee_base_cost,
        dependent_base_cost = %config.dependent_base_cost,
        discount = ?config.discount,
        "benefits configuration loaded"
    );

    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) if path != "-" => {
            let file = File::open(&path).with_context(|| format!("opening {path}"))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(io::stdin().lock()),
    };

    let projection = BenefitEstimatesProjection::new(
        InMemoryReadModelStore::<EstimateId, BenefitEstimate>::new(),
        Arc::new(config),
    );

    let mut applied = 0usize;
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("reading line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let envelope: EventEnvelope<JsonValue> = serde_json::from_str(&line)
            .with_context(|| format!("line {line_no}: malformed envelope"))?;
        projection
            .apply_envelope(&envelope)
            .with_context(|| format!("line {line_no}: envelope not applied"))?;
        applied += 1;
    }

    let mut estimates = projection.list().context("reading estimates")?;
    estimates.sort_by_key(BenefitEstimate::estimate_id);
    info!(envelopes = applied, estimates = estimates.len(), "replay complete");

    serde_json::to_writer_pretty(io::stdout().lock(), &estimates)?;
    println!();
    Ok(())
}
