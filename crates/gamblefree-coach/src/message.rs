//! Conversation turns. These live only for the length of a session and are
//! never persisted.

use serde::{Deserialize, Serialize};

use crate::reply::CoachReply;

/// Opening line of every conversation.
pub const GREETING: &str = "Hi! I'm your Gamble-Free Coach. I'm here to support you without \
judgment. What's on your mind today?";

/// The canonical quick-reply menu.
pub const QUICK_REPLY_OPTIONS: [&str; 9] = [
  "I have an urge now",
  "Make a plan",
  "Check triggers",
  "Money guardrails",
  "I slipped",
  "Self-exclusion info",
  "Distract me",
  "Edit goals",
  "Help lines",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Assistant => "assistant",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachMessage {
  pub role:          Role,
  pub content:       String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub quick_replies: Vec<String>,
  #[serde(default)]
  pub is_urgent:     bool,
}

impl CoachMessage {
  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role:          Role::User,
      content:       content.into(),
      quick_replies: Vec::new(),
      is_urgent:     false,
    }
  }

  pub fn assistant(reply: &CoachReply) -> Self {
    Self {
      role:          Role::Assistant,
      content:       reply.response.clone(),
      quick_replies: reply.quick_replies.clone(),
      is_urgent:     reply.is_urgent,
    }
  }

  /// The assistant's opening turn, offering the first three menu entries.
  pub fn greeting() -> Self {
    Self {
      role:          Role::Assistant,
      content:       GREETING.to_owned(),
      quick_replies: QUICK_REPLY_OPTIONS[..3].iter().map(|s| (*s).to_owned()).collect(),
      is_urgent:     false,
    }
  }
}
