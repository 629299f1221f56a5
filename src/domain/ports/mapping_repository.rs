//! Mapping repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EntityId, MappingRecord, PropagationCommit, TierTransition};

/// Repository interface for weight mappings and the scores derived from them.
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Apply a propagation run atomically.
    ///
    /// Mapping rows (per the commit's mode) and every parent score are
    /// written in one transaction. On error nothing from the commit is
    /// visible.
    async fn commit(&self, commit: &PropagationCommit) -> DomainResult<()>;

    /// Stored mapping rows for a parent, ordered by child id.
    async fn for_parent(
        &self,
        transition: TierTransition,
        parent_id: EntityId,
    ) -> DomainResult<Vec<MappingRecord>>;
}
