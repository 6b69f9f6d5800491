//! Gamble-free goals and progress toward them.
//!
//! A user has at most one active goal; saving a new one replaces the old.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The user's current target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
  pub user_id:     String,
  /// Number of consecutive gamble-free days the user is aiming for.
  pub target_days: u32,
  /// In the user's own words; shown back to them as motivation.
  pub reason:      String,
  pub start_date:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::RecoveryStore::upsert_goal`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
  #[serde(default = "crate::anonymous_user")]
  pub user_id:     String,
  pub target_days: u32,
  pub reason:      String,
  #[serde(default)]
  pub start_date:  Option<DateTime<Utc>>,
}

impl NewGoal {
  pub fn new(user_id: impl Into<String>, target_days: u32, reason: impl Into<String>) -> Self {
    Self {
      user_id: user_id.into(),
      target_days,
      reason: reason.into(),
      start_date: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.user_id.trim().is_empty() {
      return Err(Error::EmptyUserId);
    }
    if self.target_days == 0 {
      return Err(Error::NonPositiveTargetDays);
    }
    if self.reason.trim().is_empty() {
      return Err(Error::EmptyReason);
    }
    Ok(())
  }

  /// Materialise into a stored goal. `start_date` defaults to now.
  pub fn into_goal(self) -> Goal {
    let now = Utc::now();
    Goal {
      user_id:     self.user_id,
      target_days: self.target_days,
      reason:      self.reason.trim().to_owned(),
      start_date:  self.start_date.unwrap_or(now),
      updated_at:  now,
    }
  }
}

/// How far the current streak has come toward the goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
  pub streak:      u32,
  pub target_days: u32,
  /// `streak / target_days`, clamped to `0.0..=1.0`.
  pub fraction:    f64,
  pub reached:     bool,
}

impl GoalProgress {
  pub fn new(streak: u32, goal: &Goal) -> Self {
    let target = goal.target_days.max(1);
    Self {
      streak,
      target_days: goal.target_days,
      fraction: (f64::from(streak) / f64::from(target)).min(1.0),
      reached: streak >= target,
    }
  }
}
