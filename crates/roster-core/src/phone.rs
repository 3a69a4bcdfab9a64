//! Phone records owned by a [`Person`](crate::person::Person).
//!
//! Phones are only reachable through their owner and are removed with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::person::PersonId;

pub type PhoneId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
  pub id:         PhoneId,
  pub person_id:  PersonId,
  pub number:     String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::PersonStore::add_phone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhone {
  pub number: String,
}
