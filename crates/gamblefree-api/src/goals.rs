//! Handlers for `/goals` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/goals` | Body: `NewGoal`; replaces any prior goal |
//! | `GET`  | `/goals/{user_id}` | 404 if the user has no goal |

use axum::{
  Json,
  extract::{Path, State},
};
use gamblefree_core::{
  goal::{Goal, NewGoal},
  store::RecoveryStore,
};

use crate::{
  ApiState,
  error::{ApiError, JsonBody},
};

/// `PUT /goals`
pub async fn upsert<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewGoal>,
) -> Result<Json<Goal>, ApiError> {
  body.validate()?;
  let goal = state.store.upsert_goal(body).await.map_err(ApiError::store)?;
  Ok(Json(goal))
}

/// `GET /goals/{user_id}`
pub async fn get_one<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Goal>, ApiError> {
  let goal = state
    .store
    .get_goal(&user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no goal for {user_id}")))?;
  Ok(Json(goal))
}
