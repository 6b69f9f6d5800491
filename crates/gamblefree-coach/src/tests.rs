//! Fallback-chain tests with counting fakes, and wire tests for the HTTP
//! backends against mock servers.

use std::{
  sync::atomic::{AtomicUsize, Ordering},
  time::Duration,
};

use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_partial_json, header, method, path},
};

use crate::{
  Coach, CoachMessage, CoachReply, Error, ReplySource, Result,
  gemini::{CompletionBackend, GeminiClient, GeminiConfig},
  relay::{RelayBackend, RelayClient},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeRelay {
  calls: AtomicUsize,
  fail:  bool,
  seen:  AtomicUsize,
}

impl RelayBackend for FakeRelay {
  async fn relay(&self, message: &str, history: &[CoachMessage]) -> Result<CoachReply> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.seen.store(history.len(), Ordering::SeqCst);
    if self.fail {
      return Err(Error::Status { backend: "relay", status: 502 });
    }
    Ok(CoachReply {
      response:      format!("relayed: {message}"),
      quick_replies: Vec::new(),
      is_urgent:     false,
      source:        ReplySource::Relay,
    })
  }
}

#[derive(Default)]
struct FakeDirect {
  calls: AtomicUsize,
  fail:  bool,
}

impl CompletionBackend for FakeDirect {
  async fn complete(&self, _prompt: &str) -> Result<String> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(Error::EmptyCompletion);
    }
    Ok("That urge is real.\nQuick replies: Start timer, Check triggers, Distract me".into())
  }
}

fn failing_relay() -> FakeRelay { FakeRelay { fail: true, ..Default::default() } }

fn failing_direct() -> FakeDirect { FakeDirect { fail: true, ..Default::default() } }

fn calls<T>(backend: &Option<T>, count: impl Fn(&T) -> usize) -> usize {
  backend.as_ref().map_or(0, count)
}

// ─── Gate short-circuits ─────────────────────────────────────────────────────

#[tokio::test]
async fn urgent_message_never_reaches_a_backend() {
  let coach = Coach::new(Some(FakeRelay::default()), Some(FakeDirect::default()));
  let reply = coach.respond("I want to end it all", &[]).await;

  assert!(reply.is_urgent);
  assert_eq!(reply, CoachReply::urgent());
  assert_eq!(calls(&coach.relay, |r| r.calls.load(Ordering::SeqCst)), 0);
  assert_eq!(calls(&coach.direct, |d| d.calls.load(Ordering::SeqCst)), 0);
}

#[tokio::test]
async fn tip_request_never_reaches_a_backend() {
  let coach = Coach::new(Some(FakeRelay::default()), Some(FakeDirect::default()));
  let reply = coach.respond("what's the best card counting system", &[]).await;

  assert_eq!(reply, CoachReply::blocked());
  assert_eq!(calls(&coach.relay, |r| r.calls.load(Ordering::SeqCst)), 0);
  assert_eq!(calls(&coach.direct, |d| d.calls.load(Ordering::SeqCst)), 0);
}

// ─── Fallback chain ──────────────────────────────────────────────────────────

#[tokio::test]
async fn relay_is_preferred() {
  let coach = Coach::new(Some(FakeRelay::default()), Some(FakeDirect::default()));
  let reply = coach.respond("rough day", &[]).await;

  assert_eq!(reply.source, ReplySource::Relay);
  assert_eq!(reply.response, "relayed: rough day");
  assert!(reply.quick_replies.is_empty());
  assert_eq!(calls(&coach.direct, |d| d.calls.load(Ordering::SeqCst)), 0);
}

#[tokio::test]
async fn relay_sees_at_most_six_turns() {
  let coach = Coach::new(Some(FakeRelay::default()), None::<FakeDirect>);
  let history: Vec<_> = (0..9).map(|i| CoachMessage::user(format!("turn {i}"))).collect();
  coach.respond("still here", &history).await;

  assert_eq!(calls(&coach.relay, |r| r.seen.load(Ordering::SeqCst)), 6);
}

#[tokio::test]
async fn relay_failure_falls_back_to_direct() {
  let coach = Coach::new(Some(failing_relay()), Some(FakeDirect::default()));
  let reply = coach.respond("I have a strong urge", &[]).await;

  assert_eq!(reply.source, ReplySource::Direct);
  assert_eq!(reply.response, "That urge is real.");
  assert_eq!(reply.quick_replies, ["Start timer", "Check triggers", "Distract me"]);
  assert_eq!(calls(&coach.relay, |r| r.calls.load(Ordering::SeqCst)), 1);
  assert_eq!(calls(&coach.direct, |d| d.calls.load(Ordering::SeqCst)), 1);
}

#[tokio::test]
async fn both_failing_yields_offline_reply() {
  let coach = Coach::new(Some(failing_relay()), Some(failing_direct()));
  assert_eq!(coach.respond("hello", &[]).await, CoachReply::offline());
}

#[tokio::test]
async fn relay_failure_without_direct_yields_offline_reply() {
  let coach = Coach::new(Some(failing_relay()), None::<FakeDirect>);
  assert_eq!(coach.respond("hello", &[]).await, CoachReply::offline());
}

#[tokio::test]
async fn no_backends_yields_offline_reply() {
  let coach = Coach::offline();
  assert!(!coach.has_relay() && !coach.has_direct());
  assert_eq!(coach.respond("hello", &[]).await.source, ReplySource::Offline);
}

// ─── Relay wire format ───────────────────────────────────────────────────────

#[tokio::test]
async fn relay_client_posts_message_history_and_prompt() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/coach"))
    .and(body_partial_json(json!({
      "message": "rough day",
      "history": [{ "role": "user", "content": "hi" }],
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "response": "I'm sorry it's been rough.",
      "quickReplies": ["Tell me more"],
      "isUrgent": false,
    })))
    .expect(1)
    .mount(&server)
    .await;

  let client = RelayClient::new(server.uri(), Duration::from_secs(5)).unwrap();
  let reply = client.relay("rough day", &[CoachMessage::user("hi")]).await.unwrap();

  assert_eq!(reply.source, ReplySource::Relay);
  assert_eq!(reply.quick_replies, ["Tell me more"]);

  let requests = server.received_requests().await.unwrap();
  let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
  assert!(body["systemPrompt"].as_str().unwrap().starts_with("You are Gamble-Free Coach"));
}

#[tokio::test]
async fn relay_reply_without_quick_replies_is_accepted() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/coach"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "response": "ok", "quickReplies": null })),
    )
    .mount(&server)
    .await;

  let client = RelayClient::new(server.uri(), Duration::from_secs(5)).unwrap();
  let reply = client.relay("hi", &[]).await.unwrap();
  assert!(reply.quick_replies.is_empty());
  assert!(!reply.is_urgent);
}

#[tokio::test]
async fn relay_server_error_falls_through_to_offline() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/coach"))
    .respond_with(ResponseTemplate::new(500))
    .expect(1)
    .mount(&server)
    .await;

  let relay = RelayClient::new(server.uri(), Duration::from_secs(5)).unwrap();
  let coach: Coach = Coach::new(Some(relay), None);
  assert_eq!(coach.respond("hello", &[]).await, CoachReply::offline());
}

// ─── Gemini wire format ──────────────────────────────────────────────────────

fn gemini(server: &MockServer) -> GeminiClient {
  let mut config = GeminiConfig::new("test-key");
  config.base_url = server.uri();
  config.timeout = Duration::from_secs(5);
  GeminiClient::new(config).unwrap()
}

#[tokio::test]
async fn gemini_sends_sampling_and_safety_settings() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1beta/models/gemini-pro:generateContent"))
    .and(header("x-goog-api-key", "test-key"))
    .and(body_partial_json(json!({
      "contents": [{ "role": "user", "parts": [{ "text": "prompt text" }] }],
      "generationConfig": { "topK": 40, "maxOutputTokens": 200 },
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "candidates": [{ "content": { "parts": [{ "text": "Breathe. " }, { "text": "Then walk." }] } }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let text = gemini(&server).complete("prompt text").await.unwrap();
  assert_eq!(text, "Breathe. Then walk.");

  let requests = server.received_requests().await.unwrap();
  let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
  let settings = body["safetySettings"].as_array().unwrap();
  assert_eq!(settings.len(), 3);
  assert!(settings.iter().all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
}

#[tokio::test]
async fn gemini_without_candidates_is_an_error() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "promptFeedback": { "blockReason": "SAFETY" }
    })))
    .mount(&server)
    .await;

  let err = gemini(&server).complete("prompt").await.unwrap_err();
  assert!(matches!(err, Error::EmptyCompletion));
}

#[tokio::test]
async fn gemini_status_is_reported() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(403))
    .mount(&server)
    .await;

  let err = gemini(&server).complete("prompt").await.unwrap_err();
  assert!(matches!(err, Error::Status { backend: "gemini", status: 403 }));
}
