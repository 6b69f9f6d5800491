use thiserror::Error;

/// Failures from a generation backend. These never reach the user: the coach
/// turns them into the next fallback hop.
#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{backend} returned status {status}")]
  Status { backend: &'static str, status: u16 },

  #[error("completion contained no text")]
  EmptyCompletion,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
