//! Property-based tests for weighting, normalization and aggregation.

use proptest::prelude::*;

use attainment::domain::models::{MappingEntry, ResolvedWeight, ScoreRecord};
use attainment::services::{aggregate, normalize, PriorityWeightResolver};
use attainment::{EntityId, Priority, PriorityWeights, StudentId};
use chrono::Utc;

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn entries(max: usize) -> impl Strategy<Value = Vec<MappingEntry>> {
    prop::collection::vec(priority(), 1..max).prop_map(|ps| {
        ps.into_iter()
            .enumerate()
            .map(|(i, priority)| MappingEntry {
                child_id: EntityId(i as i64 + 1),
                priority,
            })
            .collect()
    })
}

fn base_weights() -> impl Strategy<Value = PriorityWeights> {
    (0.01f64..10.0, 0.01f64..10.0, 0.01f64..10.0).prop_map(|(high, medium, low)| PriorityWeights {
        high,
        medium,
        low,
    })
}

proptest! {
    #[test]
    fn weights_sum_to_one(entries in entries(40), weights in base_weights()) {
        let resolved = PriorityWeightResolver::new(weights).resolve(&entries).unwrap();
        let total: f64 = resolved.iter().map(|w| w.weight).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert_eq!(resolved.len(), entries.len());
        for (w, e) in resolved.iter().zip(&entries) {
            prop_assert_eq!(w.child_id, e.child_id);
            prop_assert!(w.weight > 0.0 && w.weight <= 1.0);
        }
    }

    #[test]
    fn normalized_scores_are_in_unit_interval(max in 0.01f64..1000.0, frac in 0.0f64..=1.0) {
        let obtained = max * frac;
        let value = normalize(obtained, max).unwrap();
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn marks_above_max_are_rejected(max in 0.01f64..1000.0, extra in 0.001f64..100.0) {
        prop_assert!(normalize(max + extra, max).is_err());
    }

    #[test]
    fn parent_scores_stay_in_unit_interval(
        entries in entries(20),
        child_values in prop::collection::vec(prop::option::of(0.0f64..=1.0), 20),
    ) {
        let resolved: Vec<ResolvedWeight> = PriorityWeightResolver::default().resolve(&entries).unwrap();
        let student = StudentId(1);
        let scores: Vec<ScoreRecord> = resolved
            .iter()
            .zip(&child_values)
            .filter_map(|(w, v)| v.map(|value| ScoreRecord {
                student_id: student,
                entity_id: w.child_id,
                value,
                updated_at: Utc::now(),
            }))
            .collect();

        let agg = aggregate(&[student], &resolved, &scores);
        prop_assert_eq!(agg.scores.len(), 1);
        prop_assert_eq!(agg.missing, resolved.len() - scores.len());
        prop_assert!(agg.scores[0].value >= 0.0);
        prop_assert!(agg.scores[0].value <= 1.0 + 1e-9);
    }
}
