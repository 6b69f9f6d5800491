//! The recovery coach: a local safety gate in front of a generative backend.
//!
//! Every message is classified against a [`rules::RuleSet`] first. Crisis and
//! gambling-tip messages get a fixed reply without any network call. Anything
//! else goes to the relay endpoint, then to the direct completion backend,
//! and finally to a fixed offline reply. [`Coach::respond`] never fails.

pub mod coach;
pub mod error;
pub mod gate;
pub mod gemini;
pub mod message;
pub mod prompt;
pub mod relay;
pub mod reply;
pub mod rules;

pub use coach::Coach;
pub use error::{Error, Result};
pub use message::{CoachMessage, Role};
pub use reply::{CoachReply, ReplySource};

#[cfg(test)]
mod tests;
