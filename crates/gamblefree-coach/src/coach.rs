//! [`Coach`]: the gate plus the relay → direct → offline fallback chain.

use crate::{
  gate::{self, Outcome},
  gemini::{CompletionBackend, GeminiClient},
  message::CoachMessage,
  prompt,
  relay::{RelayBackend, RelayClient},
  reply::CoachReply,
  rules::RuleSet,
};

/// The coach, built once at startup with whichever backends are configured.
pub struct Coach<R = RelayClient, C = GeminiClient> {
  rules:             RuleSet,
  pub(crate) relay:  Option<R>,
  pub(crate) direct: Option<C>,
}

impl Coach {
  /// A coach with no backends. Every forwarded message gets the offline reply.
  pub fn offline() -> Self { Self::new(None, None) }
}

impl<R: RelayBackend, C: CompletionBackend> Coach<R, C> {
  pub fn new(relay: Option<R>, direct: Option<C>) -> Self {
    Self { rules: RuleSet::default(), relay, direct }
  }

  /// Replace the default rule table.
  pub fn with_rules(mut self, rules: RuleSet) -> Self {
    self.rules = rules;
    self
  }

  pub fn rules(&self) -> &RuleSet { &self.rules }

  pub fn has_relay(&self) -> bool { self.relay.is_some() }

  pub fn has_direct(&self) -> bool { self.direct.is_some() }

  /// Answer `message`. Always resolves to a reply.
  pub async fn respond(&self, message: &str, history: &[CoachMessage]) -> CoachReply {
    let outcome = gate::classify(&self.rules, message);
    match outcome {
      Outcome::Urgent { rule } | Outcome::Blocked { rule } => {
        tracing::info!(
          rule,
          rules_version = self.rules.version(),
          urgent = matches!(outcome, Outcome::Urgent { .. }),
          "message short-circuited by safety gate"
        );
      }
      Outcome::PassThrough => {}
    }
    if let Some(reply) = outcome.canned_reply() {
      return reply;
    }

    let history = prompt::recent(history);

    if let Some(relay) = &self.relay {
      match relay.relay(message, history).await {
        Ok(reply) => return reply,
        Err(error) => {
          tracing::warn!(%error, "relay unavailable, trying direct backend");
        }
      }
    }

    if let Some(direct) = &self.direct {
      let prompt = prompt::build_prompt(message, history);
      match direct.complete(&prompt).await {
        Ok(text) => return CoachReply::from_completion(&text),
        Err(error) => tracing::error!(%error, "direct backend failed"),
      }
    }

    CoachReply::offline()
  }
}
