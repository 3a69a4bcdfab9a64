//! Error type for `roster-store-sqlite`.

use roster_core::{person::UniqueField, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A write hit one of the `UNIQUE` columns of `people`.
  #[error("the {} has already been taken", .0.column())]
  Conflict(UniqueField),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match unique_violation(&e) {
      Some(field) => Error::Conflict(field),
      None => Error::Database(e),
    }
  }
}

impl StoreError for Error {
  fn conflict(&self) -> Option<UniqueField> {
    match self {
      Error::Conflict(field) => Some(*field),
      _ => None,
    }
  }
}

/// Recognise SQLite's `UNIQUE constraint failed: people.<column>` failure.
fn unique_violation(e: &tokio_rusqlite::Error) -> Option<UniqueField> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    Some(message),
  )) = e
  else {
    return None;
  };
  if code.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  message
    .strip_prefix("UNIQUE constraint failed: people.")?
    .parse()
    .ok()
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
