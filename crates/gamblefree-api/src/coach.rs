//! Handlers for the coach conversation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/coach/greeting` | Opening turn; logs `coach_opened` |
//! | `POST` | `/coach` | Body: `{ user_id?, message, history[] }`; never a 5xx |

use axum::{
  Json,
  extract::State,
};
use gamblefree_coach::{CoachMessage, CoachReply};
use gamblefree_core::{
  anonymous_user,
  event::{EventKind, NewEvent},
  store::RecoveryStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  error::{ApiError, JsonBody, QueryParams},
};

#[derive(Debug, Deserialize)]
pub struct UserParams {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
}

/// `GET /coach/greeting[?user_id=<id>]`
pub async fn greeting<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<UserParams>,
) -> Json<CoachMessage> {
  state.log(NewEvent::new(params.user_id, EventKind::CoachOpened)).await;
  Json(CoachMessage::greeting())
}

#[derive(Debug, Deserialize)]
pub struct CoachRequest {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
  pub message: String,
  /// Prior turns, oldest first. Only the most recent few are used.
  #[serde(default)]
  pub history: Vec<CoachMessage>,
}

/// `POST /coach`
///
/// The coach runs on its own task; if that task dies the caller still gets
/// the fixed error reply rather than a server error.
pub async fn respond<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CoachRequest>,
) -> Result<Json<CoachReply>, ApiError> {
  if body.message.trim().is_empty() {
    return Err(ApiError::BadRequest("message must not be empty".into()));
  }

  let coach = state.coach.clone();
  let message = body.message.clone();
  let history = body.history;
  let reply = match tokio::spawn(async move { coach.respond(&message, &history).await }).await
  {
    Ok(reply) => reply,
    Err(error) => {
      tracing::error!(%error, "coach task failed");
      CoachReply::error()
    }
  };

  state
    .log(
      NewEvent::new(body.user_id, EventKind::CoachMessage)
        .with("user_message", body.message)
        .with("is_urgent", reply.is_urgent),
    )
    .await;

  Ok(Json(reply))
}
