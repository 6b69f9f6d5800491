//! [`RemoteStore`], the PostgREST implementation of [`RecoveryStore`].

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use gamblefree_core::{
  check_in::{CheckIn, NewCheckIn},
  event::{Event, NewEvent},
  goal::{Goal, NewGoal},
  plan::{NewPlan, Plan},
  store::RecoveryStore,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

const CHECK_INS: &str = "check_ins";
const GOALS: &str = "goals";
const PLANS: &str = "plans";
const EVENTS: &str = "events";

/// Connection settings for the hosted database.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  /// Project URL, e.g. `https://abc.supabase.co`.
  pub base_url: String,
  /// Public (anon) API key; sent both as `apikey` and as a bearer token.
  pub api_key:  String,
  pub timeout:  Duration,
}

/// A recovery store backed by a hosted PostgREST database.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RemoteStore {
  client: Client,
  config: RemoteConfig,
}

impl RemoteStore {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, table: &str) -> String {
    format!("{}/rest/v1/{table}", self.config.base_url.trim_end_matches('/'))
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req
      .header("apikey", &self.config.api_key)
      .bearer_auth(&self.config.api_key)
  }

  async fn check(table: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(table, status = status.as_u16(), "remote store request failed");
    Err(Error::Status { table, status: status.as_u16(), body })
  }

  /// `POST /rest/v1/<table>` returning the stored row. With `upsert`, an
  /// existing row for the same `user_id` is replaced.
  async fn insert<T, R>(&self, table: &'static str, row: &T, upsert: bool) -> Result<R>
  where
    T: Serialize + Sync,
    R: DeserializeOwned,
  {
    let mut req = self.auth(self.client.post(self.url(table)));
    req = if upsert {
      req
        .query(&[("on_conflict", "user_id")])
        .header("Prefer", "resolution=merge-duplicates,return=representation")
    } else {
      req.header("Prefer", "return=representation")
    };
    let resp = req.json(&[row]).send().await?;
    let rows: Vec<R> = Self::check(table, resp).await?.json().await?;
    rows.into_iter().next().ok_or(Error::EmptyResponse(table))
  }

  /// `GET /rest/v1/<table>?select=*&user_id=eq.<id>&limit=1`
  async fn select_one<R>(&self, table: &'static str, user_id: &str) -> Result<Option<R>>
  where
    R: DeserializeOwned,
  {
    let resp = self
      .auth(self.client.get(self.url(table)))
      .query(&[
        ("select", "*".to_owned()),
        ("user_id", format!("eq.{user_id}")),
        ("limit", "1".to_owned()),
      ])
      .send()
      .await?;
    let rows: Vec<R> = Self::check(table, resp).await?.json().await?;
    Ok(rows.into_iter().next())
  }
}

// ─── RecoveryStore impl ──────────────────────────────────────────────────────

impl RecoveryStore for RemoteStore {
  type Error = Error;

  async fn record_check_in(&self, input: NewCheckIn) -> Result<CheckIn> {
    input.validate()?;
    let check_in = input.into_check_in();
    self.insert(CHECK_INS, &check_in, false).await
  }

  async fn list_check_ins(&self, user_id: &str, lookback_days: u32) -> Result<Vec<CheckIn>> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(lookback_days));
    let resp = self
      .auth(self.client.get(self.url(CHECK_INS)))
      .query(&[
        ("select", "*".to_owned()),
        ("user_id", format!("eq.{user_id}")),
        (
          "date",
          format!("gte.{}", cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        ("order", "date.desc".to_owned()),
      ])
      .send()
      .await?;
    Ok(Self::check(CHECK_INS, resp).await?.json().await?)
  }

  async fn upsert_goal(&self, input: NewGoal) -> Result<Goal> {
    input.validate()?;
    let goal = input.into_goal();
    self.insert(GOALS, &goal, true).await
  }

  async fn get_goal(&self, user_id: &str) -> Result<Option<Goal>> {
    self.select_one(GOALS, user_id).await
  }

  async fn upsert_plan(&self, input: NewPlan) -> Result<Plan> {
    input.validate()?;
    let plan = input.into_plan();
    self.insert(PLANS, &plan, true).await
  }

  async fn get_plan(&self, user_id: &str) -> Result<Option<Plan>> {
    self.select_one(PLANS, user_id).await
  }

  async fn log_event(&self, input: NewEvent) -> Result<Event> {
    let event = input.into_event();
    let resp = self
      .auth(self.client.post(self.url(EVENTS)))
      .header("Prefer", "return=minimal")
      .json(&[&event])
      .send()
      .await?;
    Self::check(EVENTS, resp).await?;
    Ok(event)
  }
}
