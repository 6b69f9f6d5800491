//! The safety rule table: a versioned list of `pattern → verdict` entries.
//!
//! Adding coverage means adding a [`Rule`]; the gate's control flow does not
//! change. Bump [`DEFAULT_VERSION`] whenever the default table changes so
//! logged decisions can be traced back to the rules that made them.

use regex::Regex;
use serde::Serialize;

/// Version of the table built by [`RuleSet::default`].
pub const DEFAULT_VERSION: u32 = 3;

/// What a matching rule does to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  /// Self-harm or crisis language. Answered with crisis-line information.
  Urgent,
  /// A request for gambling strategies or tips. Refused and redirected.
  Blocked,
}

/// One entry in the table. Patterns are case-insensitive.
#[derive(Debug, Clone)]
pub struct Rule {
  id:      &'static str,
  verdict: Verdict,
  pattern: Regex,
}

impl Rule {
  pub fn new(
    id: &'static str,
    verdict: Verdict,
    pattern: &str,
  ) -> Result<Self, regex::Error> {
    let pattern = Regex::new(&format!("(?i){pattern}"))?;
    Ok(Self { id, verdict, pattern })
  }

  /// Stable identifier, safe to log in place of the message text.
  pub fn id(&self) -> &'static str { self.id }

  pub fn verdict(&self) -> Verdict { self.verdict }

  pub fn matches(&self, message: &str) -> bool { self.pattern.is_match(message) }
}

/// An ordered, versioned collection of [`Rule`]s.
#[derive(Debug, Clone)]
pub struct RuleSet {
  version: u32,
  rules:   Vec<Rule>,
}

impl RuleSet {
  pub fn new(version: u32, rules: Vec<Rule>) -> Self { Self { version, rules } }

  pub fn version(&self) -> u32 { self.version }

  pub fn rules(&self) -> &[Rule] { &self.rules }

  /// The first rule matching `message`. Urgent rules are always consulted
  /// before blocked ones, whatever their position in the table.
  pub fn first_match(&self, message: &str) -> Option<&Rule> {
    [Verdict::Urgent, Verdict::Blocked].into_iter().find_map(|verdict| {
      self
        .rules
        .iter()
        .filter(|rule| rule.verdict == verdict)
        .find(|rule| rule.matches(message))
    })
  }
}

impl Default for RuleSet {
  fn default() -> Self {
    let table = [
      (
        "crisis.suicidal",
        Verdict::Urgent,
        r"suicid(?:e|al)|kill myself|end it all|want to die",
      ),
      (
        "crisis.self_harm",
        Verdict::Urgent,
        r"self[\s-]?harm|hurt(?:ing)? myself|cutting|cut myself",
      ),
      ("crisis.overdose", Verdict::Urgent, r"overdos(?:e|ed|ing)|\bod\b"),
      (
        "tips.winning",
        Verdict::Blocked,
        r"how to win|winning strateg(?:y|ies)|beat the odds",
      ),
      (
        "tips.sure_bet",
        Verdict::Blocked,
        r"best bet|sure bet|guaranteed win",
      ),
      (
        "tips.hacks",
        Verdict::Blocked,
        r"casino tricks?|slot machine hacks?",
      ),
      (
        "tips.systems",
        Verdict::Blocked,
        r"betting system|martingale|card counting",
      ),
    ];
    let rules = table
      .into_iter()
      .map(|(id, verdict, pattern)| {
        Rule::new(id, verdict, pattern).expect("built-in rule patterns are valid")
      })
      .collect();
    Self::new(DEFAULT_VERSION, rules)
  }
}
