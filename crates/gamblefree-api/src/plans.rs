//! Handlers for `/plans` endpoints: the user's If-Then relapse-prevention
//! plan.

use axum::{
  Json,
  extract::{Path, State},
};
use gamblefree_core::{
  plan::{NewPlan, Plan},
  store::RecoveryStore,
};

use crate::{
  ApiState,
  error::{ApiError, JsonBody},
};

/// `PUT /plans`
pub async fn upsert<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewPlan>,
) -> Result<Json<Plan>, ApiError> {
  body.validate()?;
  let plan = state.store.upsert_plan(body).await.map_err(ApiError::store)?;
  Ok(Json(plan))
}

/// `GET /plans/{user_id}`
pub async fn get_one<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Plan>, ApiError> {
  let plan = state
    .store
    .get_plan(&user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no plan for {user_id}")))?;
  Ok(Json(plan))
}
