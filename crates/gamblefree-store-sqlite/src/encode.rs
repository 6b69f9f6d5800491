//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 UTC strings so that lexical order in
//! SQL matches chronological order. Decimals are stored as strings to keep
//! exact cents. List and map fields are compact JSON.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use gamblefree_core::{
  check_in::{CheckIn, UrgeLevel},
  event::{Event, EventKind},
  goal::Goal,
  plan::{IfThen, Plan},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_event_kind(kind: EventKind) -> String { kind.to_string() }

pub fn decode_event_kind(s: &str) -> Result<EventKind> {
  EventKind::from_str(s)
    .map_err(|_| gamblefree_core::Error::UnknownEventKind(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `check_ins` row.
pub struct RawCheckIn {
  pub check_in_id: String,
  pub user_id:     String,
  pub date:        String,
  pub urge_level:  u8,
  pub gambled:     bool,
  pub amount:      Option<String>,
  pub notes:       Option<String>,
  pub created_at:  String,
}

impl RawCheckIn {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      check_in_id: row.get(0)?,
      user_id:     row.get(1)?,
      date:        row.get(2)?,
      urge_level:  row.get(3)?,
      gambled:     row.get(4)?,
      amount:      row.get(5)?,
      notes:       row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_check_in(self) -> Result<CheckIn> {
    Ok(CheckIn {
      check_in_id: decode_uuid(&self.check_in_id)?,
      user_id:     self.user_id,
      date:        decode_dt(&self.date)?,
      urge_level:  UrgeLevel::new(self.urge_level)?,
      gambled:     self.gambled,
      amount:      self.amount.as_deref().map(Decimal::from_str).transpose()?,
      notes:       self.notes,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `goals` row.
pub struct RawGoal {
  pub user_id:     String,
  pub target_days: u32,
  pub reason:      String,
  pub start_date:  String,
  pub updated_at:  String,
}

impl RawGoal {
  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      user_id:     self.user_id,
      target_days: self.target_days,
      reason:      self.reason,
      start_date:  decode_dt(&self.start_date)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `plans` row.
pub struct RawPlan {
  pub user_id:          String,
  pub triggers:         String,
  pub if_then:          String,
  pub support_contacts: String,
  pub updated_at:       String,
}

impl RawPlan {
  pub fn into_plan(self) -> Result<Plan> {
    let if_then: Vec<IfThen> = serde_json::from_str(&self.if_then)?;
    Ok(Plan {
      user_id: self.user_id,
      triggers: serde_json::from_str(&self.triggers)?,
      if_then,
      support_contacts: serde_json::from_str(&self.support_contacts)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:  String,
  pub user_id:   String,
  pub kind:      String,
  pub metadata:  String,
  pub timestamp: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:  decode_uuid(&self.event_id)?,
      user_id:   self.user_id,
      kind:      decode_event_kind(&self.kind)?,
      metadata:  serde_json::from_str(&self.metadata)?,
      timestamp: decode_dt(&self.timestamp)?,
    })
  }
}
