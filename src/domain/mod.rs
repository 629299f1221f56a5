//! Domain layer for the attainment service
//!
//! This module contains the score hierarchy model, errors and the ports
//! through which services reach storage.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
