//! Error type for `gamblefree-store-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid record: {0}")]
  Validation(#[from] gamblefree_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The database answered with a non-success status.
  #[error("{table}: HTTP {status}: {body}")]
  Status {
    table:  &'static str,
    status: u16,
    body:   String,
  },

  /// An insert asked for the stored row back but got none.
  #[error("{0}: empty response")]
  EmptyResponse(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
