//! In-process router tests against an in-memory SQLite store.

use std::time::Duration as StdDuration;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use gamblefree_coach::{Coach, relay::RelayClient};
use gamblefree_core::event::EventKind;
use gamblefree_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

use crate::{ApiState, api_router};

async fn make_state() -> ApiState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  ApiState::new(store, Coach::offline())
}

async fn send(
  state: &ApiState<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn check_in(user: &str, days_ago: i64, gambled: bool) -> Value {
  json!({
    "user_id": user,
    "date": Utc::now() - Duration::days(days_ago),
    "urge_level": 2,
    "gambled": gambled,
  })
}

async fn event_kinds(state: &ApiState<SqliteStore>, user: &str) -> Vec<EventKind> {
  state
    .store
    .list_events(user)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.kind)
    .collect()
}

// ─── Check-ins ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_check_in_returns_201_and_logs_event() {
  let state = make_state().await;
  let (status, body) = send(&state, "POST", "/check-ins", Some(check_in("alice", 0, false))).await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["user_id"], "alice");
  assert!(body["check_in_id"].is_string());
  assert_eq!(event_kinds(&state, "alice").await, [EventKind::DailyCheckin]);
}

#[tokio::test]
async fn check_in_defaults_to_anonymous_user() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/check-ins",
    Some(json!({ "urge_level": 0, "gambled": false })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["user_id"], "anonymous");
}

#[tokio::test]
async fn amount_without_gamble_is_400() {
  let state = make_state().await;
  let mut input = check_in("alice", 0, false);
  input["amount"] = json!(20);

  let (status, body) = send(&state, "POST", "/check-ins", Some(input)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("amount"));
  assert!(event_kinds(&state, "alice").await.is_empty());
}

#[tokio::test]
async fn out_of_scale_urge_level_is_400_json() {
  let state = make_state().await;
  let mut input = check_in("alice", 0, false);
  input["urge_level"] = json!(7);

  let (status, body) = send(&state, "POST", "/check-ins", Some(input)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("urge level 7"));
  assert!(event_kinds(&state, "alice").await.is_empty());
}

#[tokio::test]
async fn missing_field_is_400_json() {
  let state = make_state().await;
  let (status, body) =
    send(&state, "POST", "/check-ins", Some(json!({ "urge_level": 1 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("gambled"));
}

#[tokio::test]
async fn non_json_body_is_400_json() {
  let state = make_state().await;
  let resp = api_router(state.clone())
    .oneshot(
      Request::builder()
        .method("PUT")
        .uri("/goals")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_check_ins_newest_first_within_window() {
  let state = make_state().await;
  for days_ago in [3, 0, 10] {
    send(&state, "POST", "/check-ins", Some(check_in("alice", days_ago, false))).await;
  }

  let (status, body) = send(&state, "GET", "/check-ins?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  let rows = body.as_array().unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows[0]["date"].as_str() > rows[1]["date"].as_str());

  let (_, body) = send(&state, "GET", "/check-ins?user_id=alice&days=30", None).await;
  assert_eq!(body.as_array().unwrap().len(), 3);
}

// ─── Streak & home ────────────────────────────────────────────────────────────

#[tokio::test]
async fn streak_stops_at_slip() {
  let state = make_state().await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 0, false))).await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 1, false))).await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 2, true))).await;

  let (status, body) = send(&state, "GET", "/streak?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["streak"], 2);
}

#[tokio::test]
async fn streak_for_unknown_user_is_zero() {
  let state = make_state().await;
  let (_, body) = send(&state, "GET", "/streak?user_id=nobody&tz=America/New_York", None).await;
  assert_eq!(body["streak"], 0);
}

#[tokio::test]
async fn unknown_time_zone_is_400() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/streak?tz=Mars/Olympus_Mons", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("Mars/Olympus_Mons"));
}

#[tokio::test]
async fn streak_in_named_zone_counts_local_days() {
  let state = make_state().await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 0, false))).await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 1, false))).await;

  for tz in ["UTC", "Pacific/Auckland", "America/New_York"] {
    let (status, body) =
      send(&state, "GET", &format!("/streak?user_id=alice&tz={tz}"), None).await;
    assert_eq!(status, StatusCode::OK, "tz = {tz}");
    assert!(body["streak"].as_u64().unwrap() >= 1, "tz = {tz}");
  }
}

#[tokio::test]
async fn malformed_query_is_400_json() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/check-ins?days=soon", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn home_reports_goal_progress() {
  let state = make_state().await;
  let (_, body) = send(&state, "GET", "/home?user_id=alice", None).await;
  assert_eq!(body["goal"], Value::Null);
  assert_eq!(body["progress"], Value::Null);

  send(&state, "POST", "/check-ins", Some(check_in("alice", 0, false))).await;
  send(&state, "POST", "/check-ins", Some(check_in("alice", 1, false))).await;
  send(
    &state,
    "PUT",
    "/goals",
    Some(json!({ "user_id": "alice", "target_days": 4, "reason": "rent" })),
  )
  .await;

  let (status, body) = send(&state, "GET", "/home?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["streak"], 2);
  assert_eq!(body["goal"]["reason"], "rent");
  assert_eq!(body["progress"]["fraction"], 0.5);
  assert_eq!(body["progress"]["reached"], false);
}

// ─── Goals & plans ────────────────────────────────────────────────────────────

#[tokio::test]
async fn goal_missing_then_upserted() {
  let state = make_state().await;
  let (status, _) = send(&state, "GET", "/goals/alice", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  for days in [7, 30] {
    let (status, _) = send(
      &state,
      "PUT",
      "/goals",
      Some(json!({ "user_id": "alice", "target_days": days, "reason": "family" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, body) = send(&state, "GET", "/goals/alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["target_days"], 30);
}

#[tokio::test]
async fn zero_day_goal_is_400() {
  let state = make_state().await;
  let (status, _) = send(
    &state,
    "PUT",
    "/goals",
    Some(json!({ "user_id": "alice", "target_days": 0, "reason": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_roundtrip_and_incomplete_rule() {
  let state = make_state().await;
  let (status, _) = send(
    &state,
    "PUT",
    "/plans",
    Some(json!({
      "user_id": "alice",
      "if_then": [{ "trigger": "Payday", "action": "" }],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &state,
    "PUT",
    "/plans",
    Some(json!({
      "user_id": "alice",
      "triggers": ["Payday", " "],
      "if_then": [{ "trigger": "Payday", "action": "Move money to savings" }],
      "support_contacts": ["Sam"],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, body) = send(&state, "GET", "/plans/alice", None).await;
  assert_eq!(body["triggers"], json!(["Payday"]));
  assert_eq!(body["if_then"][0]["action"], "Move money to savings");
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn client_events_are_recorded() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/events",
    Some(json!({
      "user_id": "alice",
      "type": "timer_started",
      "metadata": { "urge_level": 4, "activity": "Do 10 burpees" },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["type"], "timer_started");
  assert_eq!(event_kinds(&state, "alice").await, [EventKind::TimerStarted]);
}

#[tokio::test]
async fn unknown_event_type_is_rejected() {
  let state = make_state().await;
  let (status, body) =
    send(&state, "POST", "/events", Some(json!({ "type": "jackpot" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("jackpot"));
}

// ─── Coach ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn greeting_logs_coach_opened() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/coach/greeting?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["role"], "assistant");
  assert_eq!(body["quick_replies"].as_array().unwrap().len(), 3);
  assert_eq!(event_kinds(&state, "alice").await, [EventKind::CoachOpened]);
}

#[tokio::test]
async fn urgent_message_is_flagged_and_logged() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/coach",
    Some(json!({ "user_id": "alice", "message": "I want to end it all" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["is_urgent"], true);
  assert_eq!(body["source"], "safety");

  let events = state.store.list_events("alice").await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].kind, EventKind::CoachMessage);
  assert_eq!(events[0].metadata["is_urgent"], true);
}

#[tokio::test]
async fn coach_without_backends_is_offline_not_an_error() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/coach",
    Some(json!({
      "message": "I feel bored tonight",
      "history": [{ "role": "user", "content": "hi" }],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "offline");
  assert_eq!(body["quick_replies"], json!(["Quick Help", "Learn", "Try again"]));
}

#[tokio::test]
async fn blank_message_is_400() {
  let state = make_state().await;
  let (status, _) = send(&state, "POST", "/coach", Some(json!({ "message": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn coach_uses_configured_relay() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "response": "Let's ride it out together.",
      "quickReplies": ["Start timer"],
    })))
    .expect(1)
    .mount(&server)
    .await;

  let relay = RelayClient::new(server.uri(), StdDuration::from_secs(5)).unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  let state = ApiState::new(store, Coach::new(Some(relay), None));

  let (status, body) = send(&state, "POST", "/coach", Some(json!({ "message": "urge" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "relay");
  assert_eq!(body["quick_replies"], json!(["Start timer"]));
}

// ─── Static content ───────────────────────────────────────────────────────────

#[tokio::test]
async fn learn_cards_filter_and_lookup() {
  let state = make_state().await;
  let (_, body) = send(&state, "GET", "/learn/cards", None).await;
  assert_eq!(body.as_array().unwrap().len(), 12);

  let (_, body) = send(&state, "GET", "/learn/cards?category=Protection", None).await;
  let ids: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["id"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(ids, ["money-guardrails", "self-exclusion"]);

  let (_, body) = send(&state, "GET", "/learn/categories", None).await;
  assert_eq!(body[0], "Understanding");
}

#[tokio::test]
async fn viewing_a_card_logs_event() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/learn/cards/urge-surfing?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["category"], "Mindfulness");

  let events = state.store.list_events("alice").await.unwrap();
  assert_eq!(events[0].kind, EventKind::LearnCardViewed);
  assert_eq!(events[0].metadata["card_id"], "urge-surfing");

  let (status, _) = send(&state, "GET", "/learn/cards/no-such-card", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quick_help_menu() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/quick-help?user_id=alice", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["activities"].as_array().unwrap().len(), 12);
  assert_eq!(body["triggers"][1], "Payday");
  assert_eq!(body["timer_seconds"], 600);
  assert_eq!(body["session"]["step"], "assess");
  assert_eq!(event_kinds(&state, "alice").await, [EventKind::QuickHelpAccessed]);
}

async fn step(
  state: &ApiState<SqliteStore>,
  session: &Value,
  action: Value,
) -> (StatusCode, Value) {
  let mut body = action;
  body["session"] = session.clone();
  send(state, "POST", "/quick-help/step", Some(body)).await
}

#[tokio::test]
async fn quick_help_flow_runs_through_steps() {
  let state = make_state().await;
  let (_, menu) = send(&state, "GET", "/quick-help?user_id=alice", None).await;
  let mut session = menu["session"].clone();

  let (status, body) = step(&state, &session, json!({ "action": "start_timer" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("activity"));

  for action in [
    json!({ "action": "set_urge", "level": 4 }),
    json!({ "action": "set_trigger", "trigger": "Payday" }),
    json!({ "action": "choose_activity", "activity": "Do 10 burpees" }),
    json!({ "action": "start_timer" }),
    json!({ "action": "elapsed", "seconds": 600 }),
  ] {
    let (status, body) = step(&state, &session, action).await;
    assert_eq!(status, StatusCode::OK);
    session = body["session"].clone();
  }
  assert_eq!(session["step"], "complete");

  let (status, body) = step(
    &state,
    &session,
    json!({ "action": "finish", "still_have_urge": true }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["next"], "coach");

  assert_eq!(event_kinds(&state, "alice").await, [
    EventKind::QuickHelpAccessed,
    EventKind::TimerStarted,
    EventKind::TimerCompleted,
    EventKind::QuickHelpCompleted,
  ]);
}
