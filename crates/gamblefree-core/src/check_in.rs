//! Daily check-ins: the user's record of urge intensity and whether they
//! gambled on a given day.
//!
//! Check-ins are immutable once stored. A user may record more than one per
//! day; the streak calculator decides which one is authoritative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Urge scale ──────────────────────────────────────────────────────────────

/// Self-reported urge intensity on the daily check-in scale, `0..=4`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize,
  Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct UrgeLevel(u8);

impl UrgeLevel {
  pub const MAX: u8 = 4;

  pub fn new(level: u8) -> Result<Self> {
    if level > Self::MAX {
      return Err(Error::UrgeLevelOutOfRange(level));
    }
    Ok(Self(level))
  }

  pub fn get(self) -> u8 { self.0 }

  pub fn emoji(self) -> &'static str {
    ["😌", "😐", "😟", "😰", "😤"][usize::from(self.0)]
  }

  pub fn label(self) -> &'static str {
    match self.0 {
      0 => "No urge",
      1 => "Mild",
      2 => "Moderate",
      3 => "Strong",
      _ => "Very strong",
    }
  }
}

impl TryFrom<u8> for UrgeLevel {
  type Error = Error;

  fn try_from(level: u8) -> Result<Self> { Self::new(level) }
}

impl From<UrgeLevel> for u8 {
  fn from(level: UrgeLevel) -> Self { level.0 }
}

// ─── CheckIn ─────────────────────────────────────────────────────────────────

/// A stored daily check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
  pub check_in_id: Uuid,
  pub user_id:     String,
  /// The moment the check-in refers to. Calendar-day logic converts this to
  /// the user's local time zone.
  pub date:        DateTime<Utc>,
  pub urge_level:  UrgeLevel,
  pub gambled:     bool,
  /// Money lost on the day; only ever present when `gambled` is true.
  pub amount:      Option<Decimal>,
  pub notes:       Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

// ─── NewCheckIn ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecoveryStore::record_check_in`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckIn {
  #[serde(default = "crate::anonymous_user")]
  pub user_id:    String,
  /// Defaults to the submission time when omitted.
  #[serde(default = "Utc::now")]
  pub date:       DateTime<Utc>,
  pub urge_level: UrgeLevel,
  pub gambled:    bool,
  #[serde(default)]
  pub amount:     Option<Decimal>,
  #[serde(default)]
  pub notes:      Option<String>,
}

impl NewCheckIn {
  /// A gamble-free check-in for `date` with no notes.
  pub fn new(
    user_id: impl Into<String>,
    date: DateTime<Utc>,
    urge_level: UrgeLevel,
    gambled: bool,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      date,
      urge_level,
      gambled,
      amount: None,
      notes: None,
    }
  }

  /// Check the record invariants: a non-empty user, and an amount that is
  /// non-negative and only present on a day the user gambled.
  pub fn validate(&self) -> Result<()> {
    if self.user_id.trim().is_empty() {
      return Err(Error::EmptyUserId);
    }
    if let Some(amount) = self.amount {
      if !self.gambled {
        return Err(Error::AmountWithoutGamble);
      }
      if amount < Decimal::ZERO {
        return Err(Error::NegativeAmount(amount));
      }
    }
    Ok(())
  }

  /// Materialise into a stored record with server-assigned identity.
  ///
  /// Blank notes are dropped.
  pub fn into_check_in(self) -> CheckIn {
    CheckIn {
      check_in_id: Uuid::new_v4(),
      user_id:     self.user_id,
      date:        self.date,
      urge_level:  self.urge_level,
      gambled:     self.gambled,
      amount:      self.amount,
      notes:       self.notes.filter(|n| !n.trim().is_empty()),
      created_at:  Utc::now(),
    }
  }
}
