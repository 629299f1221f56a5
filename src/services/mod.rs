pub mod catalog_service;
pub mod parent_locks;
pub mod priority_weights;
pub mod propagation_engine;
pub mod reference_validator;
pub mod score_normalizer;
pub mod score_reader;

pub use catalog_service::CatalogService;
pub use parent_locks::ParentLocks;
pub use priority_weights::PriorityWeightResolver;
pub use propagation_engine::{aggregate, Aggregation, PropagationEngine, PropagationRequest};
pub use reference_validator::ReferenceValidator;
pub use score_normalizer::{normalize, ScoreNormalizer};
pub use score_reader::ScoreReader;
