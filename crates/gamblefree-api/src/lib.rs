//! JSON REST API for the gamble-free recovery companion.
//!
//! Exposes an axum [`Router`] backed by any
//! [`gamblefree_core::store::RecoveryStore`] plus a [`Coach`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gamblefree_api::api_router(state))
//! ```

pub mod check_ins;
pub mod coach;
pub mod error;
pub mod events;
pub mod goals;
pub mod learn;
pub mod plans;
pub mod quick_help;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use gamblefree_coach::Coach;
use gamblefree_core::{event::NewEvent, store::RecoveryStore};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  pub coach:      Arc<Coach>,
  /// Zone used for calendar days when a request does not name one.
  pub default_tz: Tz,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      coach:      Arc::clone(&self.coach),
      default_tz: self.default_tz,
    }
  }
}

impl<S: RecoveryStore> ApiState<S> {
  pub fn new(store: S, coach: Coach) -> Self {
    Self {
      store:      Arc::new(store),
      coach:      Arc::new(coach),
      default_tz: chrono_tz::UTC,
    }
  }

  pub fn with_default_tz(mut self, tz: Tz) -> Self {
    self.default_tz = tz;
    self
  }

  /// The current instant in the caller's IANA time zone, or the default zone
  /// when the request names none.
  pub(crate) fn now_in(&self, tz: Option<&str>) -> Result<DateTime<Tz>, ApiError> {
    let tz = match tz {
      Some(name) => name
        .parse::<Tz>()
        .map_err(|_| ApiError::BadRequest(format!("unknown time zone {name:?}")))?,
      None => self.default_tz,
    };
    Ok(Utc::now().with_timezone(&tz))
  }

  /// Record a telemetry event. Failures are logged and swallowed so that
  /// telemetry never fails a request.
  pub(crate) async fn log(&self, event: NewEvent) {
    let kind = event.kind;
    if let Err(error) = self.store.log_event(event).await {
      tracing::warn!(%error, %kind, "failed to record event");
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RecoveryStore + 'static,
{
  Router::new()
    // Check-ins and streak
    .route(
      "/check-ins",
      get(check_ins::list::<S>).post(check_ins::create::<S>),
    )
    .route("/streak", get(check_ins::streak::<S>))
    .route("/home", get(check_ins::home::<S>))
    // Goals and plans
    .route("/goals", put(goals::upsert::<S>))
    .route("/goals/{user_id}", get(goals::get_one::<S>))
    .route("/plans", put(plans::upsert::<S>))
    .route("/plans/{user_id}", get(plans::get_one::<S>))
    // Telemetry
    .route("/events", post(events::create::<S>))
    // Coach
    .route("/coach", post(coach::respond::<S>))
    .route("/coach/greeting", get(coach::greeting::<S>))
    // Static content
    .route("/learn/cards", get(learn::list))
    .route("/learn/cards/{id}", get(learn::get_one::<S>))
    .route("/learn/categories", get(learn::categories))
    .route("/quick-help", get(quick_help::menu::<S>))
    .route("/quick-help/step", post(quick_help::step::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
