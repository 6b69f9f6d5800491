//! Structured coach replies and post-processing of raw completion text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Most quick replies shown under one assistant turn.
pub const MAX_QUICK_REPLIES: usize = 3;

/// Fragments this long (in characters) or longer are not usable as chips.
pub const MAX_QUICK_REPLY_CHARS: usize = 20;

const URGENT_TEXT: &str = "I'm really concerned about what you're sharing. You don't have to go \
through this alone. Please reach out for immediate support:\n\n**Crisis Line: 988** (call or \
text)\n**Crisis Text Line: Text HOME to 741741**\n\nWould you like me to help you find local \
mental health resources?";

const BLOCKED_TEXT: &str = "I can't provide gambling strategies or tips. I'm here to help you \
reduce or quit gambling, not to help you gamble more effectively. The reality is that gambling \
is designed for the house to win in the long run. Let's focus on what you really want to \
achieve - is it excitement, money, or something else? There are healthier ways to reach those \
goals.";

const OFFLINE_TEXT: &str = "I'm here to help, but I'm having trouble connecting right now. In the \
meantime, try the Quick Help feature for immediate urge management, or explore the Learn section \
for helpful strategies.";

const ERROR_TEXT: &str = "I'm having trouble right now, but you can still use Quick Help for \
immediate support or explore the Learn section for coping strategies.";

const FALLBACK_REPLIES: [&str; 3] = ["Quick Help", "Learn", "Try again"];

static QUICK_REPLY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)quick[\s_-]?repl(?:y|ies)\s*:").expect("quick-reply label pattern is valid")
});

/// Which path produced a [`CoachReply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
  Relay,
  Direct,
  /// Urgent safety short-circuit.
  Safety,
  /// Gambling-tip refusal.
  Policy,
  Offline,
  Error,
}

/// One assistant turn, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachReply {
  pub response:      String,
  #[serde(default)]
  pub quick_replies: Vec<String>,
  #[serde(default)]
  pub is_urgent:     bool,
  pub source:        ReplySource,
}

impl CoachReply {
  fn canned(response: &str, quick_replies: [&str; 3], source: ReplySource) -> Self {
    Self {
      response: response.to_owned(),
      quick_replies: quick_replies.map(str::to_owned).to_vec(),
      is_urgent: source == ReplySource::Safety,
      source,
    }
  }

  pub fn urgent() -> Self {
    Self::canned(
      URGENT_TEXT,
      ["Find local help", "Coping strategies", "Talk to someone"],
      ReplySource::Safety,
    )
  }

  pub fn blocked() -> Self {
    Self::canned(
      BLOCKED_TEXT,
      ["Explore motivations", "Alternative activities", "Money goals"],
      ReplySource::Policy,
    )
  }

  /// No backend configured, or every backend failed.
  pub fn offline() -> Self {
    Self::canned(OFFLINE_TEXT, FALLBACK_REPLIES, ReplySource::Offline)
  }

  /// Something unexpected broke while producing a reply.
  pub fn error() -> Self { Self::canned(ERROR_TEXT, FALLBACK_REPLIES, ReplySource::Error) }

  /// Build a reply from raw completion text: pull out any embedded quick
  /// replies, strip them from the body, and fall back to keyword defaults.
  pub fn from_completion(text: &str) -> Self {
    let mut quick_replies = extract_quick_replies(text);
    if quick_replies.is_empty() {
      quick_replies = default_quick_replies(text).map(str::to_owned).to_vec();
    }
    Self {
      response: strip_quick_replies(text).to_owned(),
      quick_replies,
      is_urgent: false,
      source: ReplySource::Direct,
    }
  }
}

/// Quick replies embedded after a "Quick replies:" label, if any.
///
/// The text after the label is split on commas, bullets and newlines.
/// Fragments are trimmed of whitespace, quotes and list markers; empty or
/// overlong ones are dropped and at most [`MAX_QUICK_REPLIES`] are kept.
pub fn extract_quick_replies(text: &str) -> Vec<String> {
  let Some(label) = QUICK_REPLY_LABEL.find(text) else {
    return Vec::new();
  };
  text[label.end()..]
    .split([',', '•', '\n'])
    .map(|fragment| {
      fragment.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '-' | '*'))
    })
    .filter(|fragment| {
      !fragment.is_empty() && fragment.chars().count() < MAX_QUICK_REPLY_CHARS
    })
    .take(MAX_QUICK_REPLIES)
    .map(str::to_owned)
    .collect()
}

/// `text` with the quick-reply label and everything after it removed.
pub fn strip_quick_replies(text: &str) -> &str {
  let body = match QUICK_REPLY_LABEL.find(text) {
    Some(label) => &text[..label.start()],
    None => text,
  };
  body.trim_end_matches(|c: char| c.is_whitespace() || c == '*').trim_start()
}

/// Suggestions chosen by sniffing keywords in the reply body.
pub fn default_quick_replies(text: &str) -> [&'static str; 3] {
  let text = text.to_lowercase();
  if text.contains("urge") {
    ["Start timer", "Check triggers", "Distract me"]
  } else if text.contains("slip") || text.contains("lost") {
    ["Make new plan", "Identify trigger", "Self-compassion"]
  } else if text.contains("trigger") {
    ["Create If-Then plan", "Avoid triggers", "Coping skills"]
  } else {
    ["Tell me more", "Coping strategies", "Make a plan"]
  }
}
