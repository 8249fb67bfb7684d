//! Quota accounting.

use serde::{Deserialize, Serialize};
use std::fmt;

use lingcorp_models::CandidateItem;

use crate::progress::format_duration;

/// Unit a quota is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaUnit {
    /// One per accepted item
    Count,
    /// Seconds of accepted media
    Duration,
}

impl QuotaUnit {
    /// Contribution of one item, `None` when the item carries no measure
    /// in this unit.
    pub fn measure(&self, item: &CandidateItem) -> Option<u64> {
        match self {
            QuotaUnit::Count => Some(1),
            QuotaUnit::Duration => item.duration_seconds,
        }
    }

    /// Human-readable amount in this unit.
    pub fn format(&self, amount: u64) -> String {
        match self {
            QuotaUnit::Count => amount.to_string(),
            QuotaUnit::Duration => format_duration(amount),
        }
    }
}

impl fmt::Display for QuotaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaUnit::Count => write!(f, "count"),
            QuotaUnit::Duration => write!(f, "duration"),
        }
    }
}

/// Accumulated measure against a limit.
///
/// `accumulated` only grows, and only through [`QuotaState::offer`], so it
/// is always the sum of the measures of the offered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    accumulated: u64,
    limit: u64,
    unit: QuotaUnit,
}

impl QuotaState {
    pub fn new(unit: QuotaUnit, limit: u64) -> Self {
        Self {
            accumulated: 0,
            limit,
            unit,
        }
    }

    /// Count an accepted item.
    ///
    /// Returns `false`, leaving the state untouched, when the item has no
    /// measure in this unit. The cap on single items is enforced earlier by
    /// validation; the quota only decides when to stop asking for more.
    pub fn offer(&mut self, item: &CandidateItem) -> bool {
        match self.unit.measure(item) {
            Some(amount) => {
                self.accumulated = self.accumulated.saturating_add(amount);
                true
            }
            None => false,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.accumulated >= self.limit
    }

    /// How much is still missing.
    pub fn shortfall(&self) -> u64 {
        self.limit.saturating_sub(self.accumulated)
    }

    pub fn accumulated(&self) -> u64 {
        self.accumulated
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn unit(&self) -> QuotaUnit {
        self.unit
    }
}

impl fmt::Display for QuotaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            self.unit.format(self.accumulated),
            self.unit.format(self.limit)
        )
    }
}
