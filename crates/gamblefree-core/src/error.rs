//! Error types for `gamblefree-core`.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures for user-submitted records.
///
/// These are non-fatal: the API reports them inline and the user resubmits.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("user id must not be empty")]
  EmptyUserId,

  #[error("urge level {0} is outside the 0-4 scale")]
  UrgeLevelOutOfRange(u8),

  #[error("amount must not be negative: {0}")]
  NegativeAmount(Decimal),

  #[error("an amount can only be recorded when gambled is true")]
  AmountWithoutGamble,

  #[error("target days must be at least 1")]
  NonPositiveTargetDays,

  #[error("goal reason must not be empty")]
  EmptyReason,

  #[error("if-then rule must name both a trigger and an action")]
  IncompleteIfThen,

  #[error("unknown event type: {0:?}")]
  UnknownEventKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
