//! Catalog domain model: students, cohorts and the scored entities.

use serde::{Deserialize, Serialize};

/// Server-assigned student identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct StudentId(pub i64);

/// Server-assigned identifier of a criterion, learning outcome or report outcome.
///
/// Ids are only unique within their tier's table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct EntityId(pub i64);

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A class section in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cohort {
    pub year: i64,
    pub class: i64,
    pub section: String,
}

impl Cohort {
    pub fn new(year: i64, class: i64, section: impl Into<String>) -> Self {
        Self {
            year,
            class,
            section: section.into(),
        }
    }
}

impl std::fmt::Display for Cohort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "year={} class={} section={}", self.year, self.class, self.section)
    }
}

/// Full scope of a criterion or learning outcome definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcademicScope {
    pub subject: String,
    pub year: i64,
    pub quarter: String,
}

impl AcademicScope {
    pub fn new(subject: impl Into<String>, year: i64, quarter: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            year,
            quarter: quarter.into(),
        }
    }

    /// The (subject, quarter) part used when validating mapped children.
    pub fn term(&self) -> TermScope {
        TermScope {
            subject: self.subject.clone(),
            quarter: self.quarter.clone(),
        }
    }
}

/// Subject and quarter that every child of a mapping batch must belong to.
///
/// Children are matched on subject and quarter only; the cohort's year
/// selects students, not children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermScope {
    pub subject: String,
    pub quarter: String,
}

impl TermScope {
    pub fn new(subject: impl Into<String>, quarter: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            quarter: quarter.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssessmentCriterion {
    pub id: EntityId,
    pub name: String,
    pub max_marks: f64,
    pub subject: String,
    pub year: i64,
    pub quarter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearningOutcome {
    pub id: EntityId,
    pub name: String,
    pub subject: String,
    pub year: i64,
    pub quarter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportOutcome {
    pub id: EntityId,
    pub name: String,
}
