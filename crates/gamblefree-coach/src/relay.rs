//! The server-side relay: a small worker that holds the generation
//! credentials and answers `POST /coach`.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  message::{CoachMessage, Role},
  prompt::SYSTEM_PROMPT,
  reply::{CoachReply, ReplySource},
};

/// A backend that turns a message plus recent history into a finished reply.
pub trait RelayBackend: Send + Sync {
  fn relay<'a>(
    &'a self,
    message: &'a str,
    history: &'a [CoachMessage],
  ) -> impl Future<Output = Result<CoachReply>> + Send + 'a;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
  message:       &'a str,
  history:       Vec<RelayTurn<'a>>,
  system_prompt: &'a str,
}

#[derive(Serialize)]
struct RelayTurn<'a> {
  role:    Role,
  content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayResponse {
  response:      String,
  #[serde(default)]
  quick_replies: Option<Vec<String>>,
  #[serde(default)]
  is_urgent:     Option<bool>,
}

/// HTTP client for the relay endpoint.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RelayClient {
  client:   Client,
  base_url: String,
}

impl RelayClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self) -> String {
    format!("{}/coach", self.base_url.trim_end_matches('/'))
  }
}

impl RelayBackend for RelayClient {
  /// `POST <relay>/coach` with `{ message, history, systemPrompt }`.
  async fn relay(&self, message: &str, history: &[CoachMessage]) -> Result<CoachReply> {
    let body = RelayRequest {
      message,
      history: history
        .iter()
        .map(|turn| RelayTurn { role: turn.role, content: &turn.content })
        .collect(),
      system_prompt: SYSTEM_PROMPT,
    };
    let resp = self.client.post(self.url()).json(&body).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status { backend: "relay", status: resp.status().as_u16() });
    }
    let data: RelayResponse = resp.json().await?;
    Ok(CoachReply {
      response:      data.response,
      quick_replies: data.quick_replies.unwrap_or_default(),
      is_urgent:     data.is_urgent.unwrap_or(false),
      source:        ReplySource::Relay,
    })
  }
}
