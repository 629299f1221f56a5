//! Tier model.
//!
//! Scores live in three tiers: assessment criteria at the bottom, learning
//! outcomes in the middle, report outcomes on top. A `TierTransition` names
//! one parent/child edge of that hierarchy and carries every table and column
//! identifier the stores need, so the propagation algorithm is written once
//! and applied at both edges.

use serde::{Deserialize, Serialize};

/// One level of the score hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Assessment criteria (raw marks, normalized to [0, 1]).
    Criterion,
    /// Learning outcomes (weighted over criteria).
    LearningOutcome,
    /// Report outcomes (weighted over learning outcomes).
    ReportOutcome,
}

impl Tier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Criterion => "criterion",
            Self::LearningOutcome => "learning_outcome",
            Self::ReportOutcome => "report_outcome",
        }
    }

    /// Table holding the tier's entity definitions.
    pub const fn entity_table(&self) -> &'static str {
        match self {
            Self::Criterion => "assessment_criterias",
            Self::LearningOutcome => "learning_outcomes",
            Self::ReportOutcome => "report_outcomes",
        }
    }

    /// Table holding per-student scores for the tier.
    pub const fn score_table(&self) -> &'static str {
        match self {
            Self::Criterion => "ac_scores",
            Self::LearningOutcome => "lo_scores",
            Self::ReportOutcome => "ro_scores",
        }
    }

    /// Column that names the tier's entity in score and mapping tables.
    pub const fn id_column(&self) -> &'static str {
        match self {
            Self::Criterion => "ac_id",
            Self::LearningOutcome => "lo_id",
            Self::ReportOutcome => "ro_id",
        }
    }

    /// Whether the tier's entities carry a (subject, year, quarter) scope.
    pub const fn is_scoped(&self) -> bool {
        !matches!(self, Self::ReportOutcome)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent/child edge along which scores propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTransition {
    /// Learning outcome scores aggregated from criterion scores.
    CriteriaToLearningOutcome,
    /// Report outcome scores aggregated from learning outcome scores.
    LearningOutcomesToReportOutcome,
}

impl TierTransition {
    pub const fn parent(&self) -> Tier {
        match self {
            Self::CriteriaToLearningOutcome => Tier::LearningOutcome,
            Self::LearningOutcomesToReportOutcome => Tier::ReportOutcome,
        }
    }

    pub const fn child(&self) -> Tier {
        match self {
            Self::CriteriaToLearningOutcome => Tier::Criterion,
            Self::LearningOutcomesToReportOutcome => Tier::LearningOutcome,
        }
    }

    pub const fn mapping_table(&self) -> &'static str {
        match self {
            Self::CriteriaToLearningOutcome => "lo_ac_mapping",
            Self::LearningOutcomesToReportOutcome => "ro_lo_mapping",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CriteriaToLearningOutcome => "lo_ac",
            Self::LearningOutcomesToReportOutcome => "ro_lo",
        }
    }
}

impl std::fmt::Display for TierTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
