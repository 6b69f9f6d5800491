//! Message classification run before any backend is contacted.

use crate::{
  reply::CoachReply,
  rules::{RuleSet, Verdict},
};

/// Where a message goes after the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Answer with crisis-line information. `rule` is the matching rule id.
  Urgent { rule: &'static str },
  /// Refuse and redirect.
  Blocked { rule: &'static str },
  /// Forward to a generation backend.
  PassThrough,
}

impl Outcome {
  /// The fixed reply for a short-circuited message, or `None` when the
  /// message should be forwarded.
  pub fn canned_reply(self) -> Option<CoachReply> {
    match self {
      Self::Urgent { .. } => Some(CoachReply::urgent()),
      Self::Blocked { .. } => Some(CoachReply::blocked()),
      Self::PassThrough => None,
    }
  }
}

/// Classify `message`. Pure; safe to call from any thread.
pub fn classify(rules: &RuleSet, message: &str) -> Outcome {
  match rules.first_match(message) {
    Some(rule) => match rule.verdict() {
      Verdict::Urgent => Outcome::Urgent { rule: rule.id() },
      Verdict::Blocked => Outcome::Blocked { rule: rule.id() },
    },
    None => Outcome::PassThrough,
  }
}
