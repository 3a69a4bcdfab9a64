//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown person field: {0:?}")]
  UnknownField(String),

  #[error("field {0:?} has no uniqueness constraint")]
  NotUnique(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
