//! The `RecoveryStore` trait.
//!
//! Implemented by storage backends (`gamblefree-store-sqlite` for the local
//! fallback, `gamblefree-store-remote` for the hosted database). Exactly one
//! backend is selected at startup and injected into the API; nothing above
//! this trait knows which one it is talking to.

use std::future::Future;

use crate::{
  check_in::{CheckIn, NewCheckIn},
  event::{Event, NewEvent},
  goal::{Goal, NewGoal},
  plan::{NewPlan, Plan},
};

/// Abstraction over a persistence backend.
///
/// Check-ins and events are append-only. Goals and plans are upserted: at
/// most one of each per user, a new one replacing the prior.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecoveryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Check-ins ─────────────────────────────────────────────────────────

  /// Persist a new check-in. Identity and `created_at` are assigned by the
  /// store.
  fn record_check_in(
    &self,
    input: NewCheckIn,
  ) -> impl Future<Output = Result<CheckIn, Self::Error>> + Send + '_;

  /// All of a user's check-ins dated within the last `lookback_days` days.
  /// Order is unspecified.
  fn list_check_ins<'a>(
    &'a self,
    user_id: &'a str,
    lookback_days: u32,
  ) -> impl Future<Output = Result<Vec<CheckIn>, Self::Error>> + Send + 'a;

  // ── Goals ─────────────────────────────────────────────────────────────

  /// Replace the user's goal.
  fn upsert_goal(
    &self,
    input: NewGoal,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  fn get_goal<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + 'a;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// Replace the user's If-Then plan.
  fn upsert_plan(
    &self,
    input: NewPlan,
  ) -> impl Future<Output = Result<Plan, Self::Error>> + Send + '_;

  fn get_plan<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Plan>, Self::Error>> + Send + 'a;

  // ── Telemetry ─────────────────────────────────────────────────────────

  /// Append a telemetry event.
  fn log_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;
}
