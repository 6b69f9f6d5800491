//! Handlers for check-ins and the views derived from them.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/check-ins` | Body: `NewCheckIn`; logs `daily_checkin` |
//! | `GET`  | `/check-ins` | `?user_id&days` (default 7) |
//! | `GET`  | `/streak` | `?user_id&tz` (IANA zone name) |
//! | `GET`  | `/home` | Streak, goal and progress toward it |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use gamblefree_core::{
  anonymous_user,
  check_in::{CheckIn, NewCheckIn},
  event::{EventKind, NewEvent},
  goal::{Goal, GoalProgress},
  store::RecoveryStore,
  streak::current_streak,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  error::{ApiError, JsonBody, QueryParams},
};

/// Lookback for `GET /check-ins` when `days` is omitted.
pub const DEFAULT_LIST_DAYS: u32 = 7;

/// Lookback used when computing the streak.
pub const STREAK_WINDOW_DAYS: u32 = 90;

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /check-ins`
pub async fn create<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewCheckIn>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let check_in = state
    .store
    .record_check_in(body)
    .await
    .map_err(ApiError::store)?;

  state
    .log(
      NewEvent::new(&check_in.user_id, EventKind::DailyCheckin)
        .with("urge_level", check_in.urge_level.get())
        .with("gambled", check_in.gambled),
    )
    .await;

  Ok((StatusCode::CREATED, Json(check_in)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
  pub days:    Option<u32>,
}

/// `GET /check-ins?user_id=<id>[&days=<n>]`, newest first.
pub async fn list<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<CheckIn>>, ApiError> {
  let mut check_ins = state
    .store
    .list_check_ins(&params.user_id, params.days.unwrap_or(DEFAULT_LIST_DAYS))
    .await
    .map_err(ApiError::store)?;
  check_ins.sort_by(|a, b| b.date.cmp(&a.date));
  Ok(Json(check_ins))
}

// ─── Streak & home ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StreakParams {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
  /// The caller's IANA zone, e.g. `America/New_York`. Calendar days are
  /// counted in this zone, daylight-saving shifts included.
  pub tz:      Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StreakView {
  pub streak: u32,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
  pub streak:   u32,
  pub goal:     Option<Goal>,
  pub progress: Option<GoalProgress>,
}

async fn streak_for<S: RecoveryStore>(
  state: &ApiState<S>,
  params: &StreakParams,
) -> Result<u32, ApiError> {
  let now = state.now_in(params.tz.as_deref())?;
  let check_ins = state
    .store
    .list_check_ins(&params.user_id, STREAK_WINDOW_DAYS)
    .await
    .map_err(ApiError::store)?;
  Ok(current_streak(&check_ins, &now))
}

/// `GET /streak?user_id=<id>[&tz=<zone>]`
pub async fn streak<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<StreakParams>,
) -> Result<Json<StreakView>, ApiError> {
  let streak = streak_for(&state, &params).await?;
  Ok(Json(StreakView { streak }))
}

/// `GET /home?user_id=<id>[&tz=<zone>]`
pub async fn home<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<StreakParams>,
) -> Result<Json<HomeView>, ApiError> {
  let streak = streak_for(&state, &params).await?;
  let goal = state
    .store
    .get_goal(&params.user_id)
    .await
    .map_err(ApiError::store)?;
  let progress = goal.as_ref().map(|g| GoalProgress::new(streak, g));
  Ok(Json(HomeView { streak, goal, progress }))
}
