//! Append-only telemetry events.
//!
//! Events are written by the application and never read back by it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The kinds of interaction the application records.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
  DailyCheckin,
  QuickHelpAccessed,
  TimerStarted,
  TimerCompleted,
  QuickHelpCompleted,
  LearnCardViewed,
  CoachOpened,
  CoachMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:  Uuid,
  pub user_id:   String,
  #[serde(rename = "type")]
  pub kind:      EventKind,
  pub metadata:  Map<String, Value>,
  /// Server-assigned.
  pub timestamp: DateTime<Utc>,
}

/// Input to [`crate::store::RecoveryStore::log_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
  #[serde(default = "crate::anonymous_user")]
  pub user_id:  String,
  #[serde(rename = "type")]
  pub kind:     EventKind,
  #[serde(default)]
  pub metadata: Map<String, Value>,
}

impl NewEvent {
  pub fn new(user_id: impl Into<String>, kind: EventKind) -> Self {
    Self { user_id: user_id.into(), kind, metadata: Map::new() }
  }

  /// Attach a metadata entry.
  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.metadata.insert(key.to_owned(), value.into());
    self
  }

  pub fn into_event(self) -> Event {
    Event {
      event_id:  Uuid::new_v4(),
      user_id:   self.user_id,
      kind:      self.kind,
      metadata:  self.metadata,
      timestamp: Utc::now(),
    }
  }
}
