//! The guided urge flow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/quick-help` | Menu plus a fresh session; logs `quick_help_accessed` |
//! | `POST` | `/quick-help/step` | `{ session, action }`; logs the events the step emits |
//!
//! The server keeps no flow state: the client echoes the session back on
//! every step.

use axum::{Json, extract::State};
use gamblefree_core::{
  anonymous_user,
  quick_help::{
    ACTIVITIES, FEATURED_ACTIVITIES, FlowAction, MAX_FLOW_URGE, NextStop, TIMER_SECONDS,
    TRIGGERS, UrgeSession,
  },
  store::RecoveryStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  error::{ApiError, JsonBody, QueryParams},
};

#[derive(Debug, Deserialize)]
pub struct MenuParams {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct QuickHelpMenu {
  pub activities:          &'static [&'static str],
  pub featured_activities: usize,
  pub triggers:            &'static [&'static str],
  pub timer_seconds:       u32,
  pub max_urge:            u8,
  pub session:             UrgeSession,
}

/// `GET /quick-help[?user_id=<id>]`
pub async fn menu<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<MenuParams>,
) -> Json<QuickHelpMenu> {
  let (session, opened) = UrgeSession::open(params.user_id);
  state.log(opened).await;
  Json(QuickHelpMenu {
    activities: &ACTIVITIES,
    featured_activities: FEATURED_ACTIVITIES,
    triggers: &TRIGGERS,
    timer_seconds: TIMER_SECONDS,
    max_urge: MAX_FLOW_URGE,
    session,
  })
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
  pub session: UrgeSession,
  #[serde(flatten)]
  pub action:  FlowAction,
}

#[derive(Debug, Serialize)]
pub struct StepView {
  pub session: UrgeSession,
  pub next:    Option<NextStop>,
}

/// `POST /quick-help/step`
pub async fn step<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<StepRequest>,
) -> Result<Json<StepView>, ApiError> {
  let StepRequest { mut session, action } = body;
  let transition = session.apply(action)?;
  for event in transition.events {
    state.log(event).await;
  }
  Ok(Json(StepView { session, next: transition.next }))
}
