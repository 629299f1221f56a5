//! Attainment - assessment score propagation
//!
//! Raw marks on assessment criteria are normalized and rolled up through
//! weighted mappings into learning-outcome scores, and from there into
//! report-outcome scores.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and repository ports
//! - **Service Layer** (`services`): normalization, weighting and propagation
//! - **Adapters** (`adapters`): SQLite repositories and the HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Cohort, Config, EntityId, MappingMode, Priority, PriorityWeights, StudentId, Tier,
    TierTransition,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{PropagationEngine, ScoreNormalizer};
