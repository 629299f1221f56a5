pub mod catalog;
pub mod config;
pub mod mapping;
pub mod score;
pub mod tier;

pub use catalog::{
    AcademicScope, AssessmentCriterion, Cohort, EntityId, LearningOutcome, ReportOutcome, Student,
    StudentId, TermScope,
};
pub use config::{
    Config, DatabaseConfig, LoggingConfig, PriorityWeights, PropagationConfig, ServerConfig,
};
pub use mapping::{
    MappingBatch, MappingEntry, MappingMode, MappingRecord, Priority, ResolvedWeight,
};
pub use score::{
    MarkSubmission, ParentScore, PropagationCommit, PropagationOutcome, ScoreRecord,
};
pub use tier::{Tier, TierTransition};
