//! If-Then relapse-prevention plans.
//!
//! A plan pairs the user's known triggers with a pre-decided response, plus
//! the people they can reach out to. One plan per user; saving replaces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// "IF `trigger` happens, THEN I will `action`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfThen {
  pub trigger: String,
  pub action:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
  pub user_id:          String,
  pub triggers:         Vec<String>,
  pub if_then:          Vec<IfThen>,
  pub support_contacts: Vec<String>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::RecoveryStore::upsert_plan`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlan {
  #[serde(default = "crate::anonymous_user")]
  pub user_id:          String,
  #[serde(default)]
  pub triggers:         Vec<String>,
  #[serde(default)]
  pub if_then:          Vec<IfThen>,
  #[serde(default)]
  pub support_contacts: Vec<String>,
}

impl NewPlan {
  pub fn validate(&self) -> Result<()> {
    if self.user_id.trim().is_empty() {
      return Err(Error::EmptyUserId);
    }
    let incomplete = self
      .if_then
      .iter()
      .any(|r| r.trigger.trim().is_empty() || r.action.trim().is_empty());
    if incomplete {
      return Err(Error::IncompleteIfThen);
    }
    Ok(())
  }

  /// Materialise into a stored plan, dropping blank list entries.
  pub fn into_plan(self) -> Plan {
    fn non_blank(items: Vec<String>) -> Vec<String> {
      items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
    }

    Plan {
      user_id:          self.user_id,
      triggers:         non_blank(self.triggers),
      if_then:          self.if_then,
      support_contacts: non_blank(self.support_contacts),
      updated_at:       Utc::now(),
    }
  }
}
