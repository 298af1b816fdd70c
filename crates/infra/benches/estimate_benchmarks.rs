use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use benefits_core::AggregateId;
use benefits_estimate::{
    AGGREGATE_TYPE, BenefitEstimate, BenefitEstimateEvent, BenefitsConfig, DependentAdded,
    DependentRemoved, EstimateCreated, EstimateId, MaritalStatus, SalarySpecified,
};
use benefits_events::EventEnvelope;
use benefits_infra::projections::BenefitEstimatesProjection;
use benefits_infra::read_model::InMemoryReadModelStore;

/// Creation followed by `len - 1` events cycling through salary/add/remove.
fn history(id: EstimateId, len: usize) -> Vec<BenefitEstimateEvent> {
    let mut events = vec![BenefitEstimateEvent::EstimateCreated(EstimateCreated {
        estimate_id: id,
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        marital_status: MaritalStatus::Married,
        occurred_at: Utc::now(),
    })];

    for i in 1..len {
        let child = format!("Kid{}", i % 7);
        let event = match i % 3 {
            0 => BenefitEstimateEvent::SalarySpecified(SalarySpecified {
                estimate_id: id,
                annual_salary: Decimal::from(50_000 + i as i64),
                paychecks_per_year: 26,
                occurred_at: Utc::now(),
            }),
            1 => BenefitEstimateEvent::DependentAdded(DependentAdded {
                estimate_id: id,
                first_name: child,
                last_name: "Lee".to_string(),
                occurred_at: Utc::now(),
            }),
            _ => BenefitEstimateEvent::DependentRemoved(DependentRemoved {
                estimate_id: id,
                first_name: child,
                last_name: "lee".to_string(),
                occurred_at: Utc::now(),
            }),
        };
        events.push(event);
    }
    events
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_replay");
    let config = BenefitsConfig::default();

    for len in [10usize, 100, 1000].iter() {
        let id = EstimateId::new(AggregateId::new());
        let events = history(id, *len);

        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::new("fold", len), &events, |b, events| {
            b.iter(|| {
                black_box(BenefitEstimate::replay(id, (1u64..).zip(events.iter()), &config).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_projection_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_rebuild");
    group.sample_size(20);

    for aggregates in [10usize, 100].iter() {
        let envelopes: Vec<EventEnvelope<JsonValue>> = (0..*aggregates)
            .flat_map(|_| {
                let id = EstimateId::new(AggregateId::new());
                history(id, 50)
                    .into_iter()
                    .zip(1u64..)
                    .map(move |(event, seq)| {
                        EventEnvelope::new(
                            uuid::Uuid::now_v7(),
                            id.0,
                            AGGREGATE_TYPE,
                            seq,
                            serde_json::to_value(event).unwrap(),
                        )
                    })
            })
            .collect();

        group.throughput(Throughput::Elements(envelopes.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("rebuild_from_scratch", aggregates),
            &envelopes,
            |b, envelopes| {
                let projection = BenefitEstimatesProjection::new(
                    InMemoryReadModelStore::new(),
                    Arc::new(BenefitsConfig::default()),
                );
                b.iter(|| {
                    projection.rebuild_from_scratch(envelopes.iter().cloned()).unwrap();
                    black_box(projection.list().unwrap().len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_replay, bench_projection_rebuild);
criterion_main!(benches);
