use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{MappingEntry, PriorityWeights, ResolvedWeight};

/// Turns priority classes into weights that sum to 1 over one batch.
///
/// weight_i = base(priority_i) / Σ base(priority_j)
///
/// Normalization only sees the batch it is given, never mapping rows stored
/// for the same parent by earlier submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityWeightResolver {
    weights: PriorityWeights,
}

impl PriorityWeightResolver {
    pub const fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    pub const fn weights(&self) -> &PriorityWeights {
        &self.weights
    }

    /// Resolve normalized weights, preserving input order.
    pub fn resolve(&self, entries: &[MappingEntry]) -> DomainResult<Vec<ResolvedWeight>> {
        let total: f64 = entries.iter().map(|e| self.weights.base(e.priority)).sum();

        if entries.is_empty() || !total.is_finite() || total <= 0.0 {
            return Err(DomainError::InvalidInput(
                "Invalid weight calculation, check input values.".to_string(),
            ));
        }

        Ok(entries
            .iter()
            .map(|e| ResolvedWeight {
                child_id: e.child_id,
                weight: self.weights.base(e.priority) / total,
            })
            .collect())
    }
}
