//! Handlers for the educational card library.

use axum::{
  Json,
  extract::{Path, State},
};
use gamblefree_core::{
  anonymous_user,
  event::{EventKind, NewEvent},
  learn::{self, LearnCard},
  store::RecoveryStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  error::{ApiError, QueryParams},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
}

/// `GET /learn/cards[?category=<name>]`
pub async fn list(
  QueryParams(params): QueryParams<ListParams>,
) -> Json<Vec<&'static LearnCard>> {
  let cards = match params.category.as_deref() {
    Some(category) => learn::by_category(category),
    None => learn::all().iter().collect(),
  };
  Json(cards)
}

#[derive(Debug, Deserialize)]
pub struct ViewParams {
  #[serde(default = "anonymous_user")]
  pub user_id: String,
}

/// `GET /learn/cards/{id}[?user_id=<id>]`; logs `learn_card_viewed`.
pub async fn get_one<S: RecoveryStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  QueryParams(params): QueryParams<ViewParams>,
) -> Result<Json<&'static LearnCard>, ApiError> {
  let card = learn::by_id(&id)
    .ok_or_else(|| ApiError::NotFound(format!("card {id} not found")))?;
  state
    .log(
      NewEvent::new(params.user_id, EventKind::LearnCardViewed)
        .with("card_id", card.id.as_str())
        .with("card_title", card.title.as_str()),
    )
    .await;
  Ok(Json(card))
}

/// `GET /learn/categories`
pub async fn categories() -> Json<Vec<&'static str>> { Json(learn::categories()) }
