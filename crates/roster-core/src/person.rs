//! The person record and its field names.
//!
//! A person is a flat record. Writes go through [`NewPerson`] (every field
//! present) or [`PersonChanges`] (a sparse patch); identifiers and timestamps
//! are always assigned by the store.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Store-assigned identifier of a [`Person`].
pub type PersonId = i64;

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          PersonId,
  pub name:        String,
  pub email:       String,
  /// As submitted, bare (`52998224725`) or punctuated (`529.982.247-25`).
  pub cpf:         String,
  pub dob:         NaiveDate,
  pub nationality: String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PersonStore::create_person`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:        String,
  pub email:       String,
  pub cpf:         String,
  pub dob:         NaiveDate,
  pub nationality: String,
}

/// A sparse update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonChanges {
  pub name:        Option<String>,
  pub email:       Option<String>,
  pub cpf:         Option<String>,
  pub dob:         Option<NaiveDate>,
  pub nationality: Option<String>,
}

impl PersonChanges {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// The pending value for a uniquely-constrained column, if any.
  pub fn unique_value(&self, field: UniqueField) -> Option<&str> {
    match field {
      UniqueField::Email => self.email.as_deref(),
      UniqueField::Cpf => self.cpf.as_deref(),
    }
  }

  /// Merge the changes into `person`, leaving unset fields untouched.
  pub fn apply_to(self, person: &mut Person) {
    if let Some(name) = self.name {
      person.name = name;
    }
    if let Some(email) = self.email {
      person.email = email;
    }
    if let Some(cpf) = self.cpf {
      person.cpf = cpf;
    }
    if let Some(dob) = self.dob {
      person.dob = dob;
    }
    if let Some(nationality) = self.nationality {
      person.nationality = nationality;
    }
  }
}

// ─── Field names ─────────────────────────────────────────────────────────────

/// A writable attribute of [`Person`].
///
/// Declaration order is the order fields are validated and reported in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
  Name,
  Email,
  Cpf,
  Dob,
  Nationality,
}

impl Field {
  pub const ALL: [Field; 5] =
    [Field::Name, Field::Email, Field::Cpf, Field::Dob, Field::Nationality];

  /// The JSON key and column name of the field.
  pub fn as_str(self) -> &'static str {
    match self {
      Field::Name => "name",
      Field::Email => "email",
      Field::Cpf => "cpf",
      Field::Dob => "dob",
      Field::Nationality => "nationality",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Field {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Field::ALL
      .into_iter()
      .find(|f| f.as_str() == s)
      .ok_or_else(|| Error::UnknownField(s.to_owned()))
  }
}

/// A field that must be unique across all people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
  Email,
  Cpf,
}

impl UniqueField {
  pub const ALL: [UniqueField; 2] = [UniqueField::Email, UniqueField::Cpf];

  pub fn field(self) -> Field {
    match self {
      UniqueField::Email => Field::Email,
      UniqueField::Cpf => Field::Cpf,
    }
  }

  pub fn column(self) -> &'static str { self.field().as_str() }
}

impl TryFrom<Field> for UniqueField {
  type Error = Error;

  fn try_from(field: Field) -> Result<Self, Self::Error> {
    match field {
      Field::Email => Ok(UniqueField::Email),
      Field::Cpf => Ok(UniqueField::Cpf),
      other => Err(Error::NotUnique(other.as_str().to_owned())),
    }
  }
}

impl FromStr for UniqueField {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse::<Field>()?.try_into() }
}
