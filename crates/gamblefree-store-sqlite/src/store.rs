//! [`SqliteStore`], the SQLite implementation of [`RecoveryStore`].

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::OptionalExtension as _;

use gamblefree_core::{
  check_in::{CheckIn, NewCheckIn},
  event::{Event, NewEvent},
  goal::{Goal, NewGoal},
  plan::{NewPlan, Plan},
  store::RecoveryStore,
};

use crate::{
  encode::{
    encode_dt, encode_event_kind, encode_uuid, RawCheckIn, RawEvent, RawGoal,
    RawPlan,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A recovery store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecoveryStore impl ──────────────────────────────────────────────────────

impl RecoveryStore for SqliteStore {
  type Error = crate::Error;

  // ── Check-ins ─────────────────────────────────────────────────────────────

  async fn record_check_in(&self, input: NewCheckIn) -> Result<CheckIn> {
    input.validate()?;
    let check_in = input.into_check_in();

    let id_str         = encode_uuid(check_in.check_in_id);
    let user_id        = check_in.user_id.clone();
    let date_str       = encode_dt(check_in.date);
    let urge_level     = check_in.urge_level.get();
    let gambled        = check_in.gambled;
    let amount_str     = check_in.amount.map(|a| a.to_string());
    let notes          = check_in.notes.clone();
    let created_at_str = encode_dt(check_in.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO check_ins (
             check_in_id, user_id, date, urge_level, gambled,
             amount, notes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            user_id,
            date_str,
            urge_level,
            gambled,
            amount_str,
            notes,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(check_in)
  }

  async fn list_check_ins(
    &self,
    user_id:       &str,
    lookback_days: u32,
  ) -> Result<Vec<CheckIn>> {
    let user_id    = user_id.to_owned();
    let cutoff_str = encode_dt(Utc::now() - Duration::days(i64::from(lookback_days)));

    let raws: Vec<RawCheckIn> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT check_in_id, user_id, date, urge_level, gambled,
                  amount, notes, created_at
           FROM check_ins
           WHERE user_id = ?1 AND date >= ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, cutoff_str], RawCheckIn::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckIn::into_check_in).collect()
  }

  // ── Goals ─────────────────────────────────────────────────────────────────

  async fn upsert_goal(&self, input: NewGoal) -> Result<Goal> {
    input.validate()?;
    let goal = input.into_goal();

    let user_id        = goal.user_id.clone();
    let target_days    = goal.target_days;
    let reason         = goal.reason.clone();
    let start_date_str = encode_dt(goal.start_date);
    let updated_at_str = encode_dt(goal.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (user_id, target_days, reason, start_date, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id) DO UPDATE SET
             target_days = excluded.target_days,
             reason      = excluded.reason,
             start_date  = excluded.start_date,
             updated_at  = excluded.updated_at",
          rusqlite::params![user_id, target_days, reason, start_date_str, updated_at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(goal)
  }

  async fn get_goal(&self, user_id: &str) -> Result<Option<Goal>> {
    let user_id = user_id.to_owned();

    let raw: Option<RawGoal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, target_days, reason, start_date, updated_at
               FROM goals WHERE user_id = ?1",
              rusqlite::params![user_id],
              |row| {
                Ok(RawGoal {
                  user_id:     row.get(0)?,
                  target_days: row.get(1)?,
                  reason:      row.get(2)?,
                  start_date:  row.get(3)?,
                  updated_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn upsert_plan(&self, input: NewPlan) -> Result<Plan> {
    input.validate()?;
    let plan = input.into_plan();

    let user_id          = plan.user_id.clone();
    let triggers         = serde_json::to_string(&plan.triggers)?;
    let if_then          = serde_json::to_string(&plan.if_then)?;
    let support_contacts = serde_json::to_string(&plan.support_contacts)?;
    let updated_at_str   = encode_dt(plan.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO plans (user_id, triggers, if_then, support_contacts, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id) DO UPDATE SET
             triggers         = excluded.triggers,
             if_then          = excluded.if_then,
             support_contacts = excluded.support_contacts,
             updated_at       = excluded.updated_at",
          rusqlite::params![user_id, triggers, if_then, support_contacts, updated_at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(plan)
  }

  async fn get_plan(&self, user_id: &str) -> Result<Option<Plan>> {
    let user_id = user_id.to_owned();

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, triggers, if_then, support_contacts, updated_at
               FROM plans WHERE user_id = ?1",
              rusqlite::params![user_id],
              |row| {
                Ok(RawPlan {
                  user_id:          row.get(0)?,
                  triggers:         row.get(1)?,
                  if_then:          row.get(2)?,
                  support_contacts: row.get(3)?,
                  updated_at:       row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  // ── Telemetry ─────────────────────────────────────────────────────────────

  async fn log_event(&self, input: NewEvent) -> Result<Event> {
    let event = input.into_event();

    let id_str        = encode_uuid(event.event_id);
    let user_id       = event.user_id.clone();
    let kind_str      = encode_event_kind(event.kind);
    let metadata      = serde_json::to_string(&event.metadata)?;
    let timestamp_str = encode_dt(event.timestamp);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (event_id, user_id, type, metadata, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_id, kind_str, metadata, timestamp_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }
}

impl SqliteStore {
  /// Events recorded for `user_id`, oldest first. Telemetry is write-only for
  /// the application; this exists for diagnostics and tests.
  pub async fn list_events(&self, user_id: &str) -> Result<Vec<Event>> {
    let user_id = user_id.to_owned();
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, user_id, type, metadata, timestamp
           FROM events WHERE user_id = ?1
           ORDER BY timestamp ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok(RawEvent {
              event_id:  row.get(0)?,
              user_id:   row.get(1)?,
              kind:      row.get(2)?,
              metadata:  row.get(3)?,
              timestamp: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
