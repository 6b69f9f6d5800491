//! Direct completion backend: the Gemini `generateContent` endpoint.
//!
//! Used only when the relay is absent or failing. The backend applies its own
//! content-safety thresholds beneath the local gate.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

const SAFETY_CATEGORIES: [&str; 3] = [
  "HARM_CATEGORY_HARASSMENT",
  "HARM_CATEGORY_HATE_SPEECH",
  "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// A backend that completes a single prompt into raw text.
pub trait CompletionBackend: Send + Sync {
  fn complete<'a>(&'a self, prompt: &'a str)
  -> impl Future<Output = Result<String>> + Send + 'a;
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub temperature:       f32,
  pub top_k:             u32,
  pub top_p:             f32,
  pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self { temperature: 0.7, top_k: 40, top_p: 0.95, max_output_tokens: 200 }
  }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key:    String,
  pub model:      String,
  /// Overridable for tests; defaults to [`DEFAULT_BASE_URL`].
  pub base_url:   String,
  pub timeout:    Duration,
  pub generation: GenerationConfig,
}

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:    api_key.into(),
      model:      DEFAULT_MODEL.to_owned(),
      base_url:   DEFAULT_BASE_URL.to_owned(),
      timeout:    Duration::from_secs(30),
      generation: GenerationConfig::default(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
  contents:          [Content<'a>; 1],
  generation_config: GenerationConfig,
  safety_settings:   Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
  role:  &'static str,
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting {
  category:  &'static str,
  threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: String,
}

impl GenerateResponse {
  /// Concatenated text of the first candidate.
  fn text(self) -> Option<String> {
    let content = self.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }
}

impl CompletionBackend for GeminiClient {
  async fn complete(&self, prompt: &str) -> Result<String> {
    let body = GenerateRequest {
      contents:          [Content { role: "user", parts: [Part { text: prompt }] }],
      generation_config: self.config.generation,
      safety_settings:   SAFETY_CATEGORIES
        .into_iter()
        .map(|category| SafetySetting { category, threshold: SAFETY_THRESHOLD })
        .collect(),
    };
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", &self.config.api_key)
      .json(&body)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Error::Status { backend: "gemini", status: resp.status().as_u16() });
    }
    let data: GenerateResponse = resp.json().await?;
    data.text().ok_or(Error::EmptyCompletion)
  }
}
