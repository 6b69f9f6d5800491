//! `POST /events`: telemetry reported by the client, such as urge-flow
//! timer transitions.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use gamblefree_core::{event::NewEvent, store::RecoveryStore};

use crate::{
  ApiState,
  error::{ApiError, JsonBody},
};

/// `POST /events`, body: `{"user_id":"...","type":"timer_started","metadata":{...}}`
pub async fn create<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  if body.user_id.trim().is_empty() {
    return Err(gamblefree_core::Error::EmptyUserId.into());
  }
  let event = state.store.log_event(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}
