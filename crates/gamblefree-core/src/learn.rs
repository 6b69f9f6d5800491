//! The educational card library.
//!
//! Cards are static content compiled into the binary from
//! `data/learn_cards.json`.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSection {
  pub title: String,
  pub text:  String,
}

/// A short lesson on one coping or awareness skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnCard {
  /// Stable slug, e.g. `"urge-surfing"`.
  pub id:       String,
  pub title:    String,
  /// Approximate reading time, e.g. `"3 min"`.
  pub duration: String,
  pub category: String,
  pub intro:    String,
  pub sections: Vec<CardSection>,
  /// A concrete exercise for the coming week.
  pub practice: String,
}

static CARDS: LazyLock<Vec<LearnCard>> = LazyLock::new(|| {
  serde_json::from_str(include_str!("../data/learn_cards.json"))
    .expect("embedded learn card data is valid JSON")
});

/// Every card, in curriculum order.
pub fn all() -> &'static [LearnCard] { &CARDS }

pub fn by_id(id: &str) -> Option<&'static LearnCard> {
  CARDS.iter().find(|c| c.id == id)
}

/// Cards in `category`. Matching is exact.
pub fn by_category(category: &str) -> Vec<&'static LearnCard> {
  CARDS.iter().filter(|c| c.category == category).collect()
}

/// Distinct categories in first-seen order.
pub fn categories() -> Vec<&'static str> {
  let mut seen: Vec<&'static str> = Vec::new();
  for card in CARDS.iter() {
    if !seen.contains(&card.category.as_str()) {
      seen.push(&card.category);
    }
  }
  seen
}
