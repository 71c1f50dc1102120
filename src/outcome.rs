//! Per-item results for loops that skip failures instead of aborting.

use std::fmt;

/// What happened to one item of a multi-item run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed { item: String },
    Skipped { item: String, reason: String },
}

impl ItemOutcome {
    pub fn completed(item: impl Into<String>) -> Self {
        Self::Completed { item: item.into() }
    }

    pub fn skipped(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skipped {
            item: item.into(),
            reason: reason.into(),
        }
    }

    pub fn item(&self) -> &str {
        match self {
            Self::Completed { item } | Self::Skipped { item, .. } => item,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Counts of completed and skipped items, printed once at the end of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub completed: usize,
    pub skipped: usize,
}

impl OutcomeSummary {
    pub fn from_outcomes(outcomes: &[ItemOutcome]) -> Self {
        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        Self {
            completed,
            skipped: outcomes.len() - completed,
        }
    }
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} completed, {} skipped", self.completed, self.skipped)
    }
}
