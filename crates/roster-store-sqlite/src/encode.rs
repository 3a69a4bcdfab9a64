//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and dates as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{person::Person, phone::Phone};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str =
  "id, name, email, cpf, dob, nationality, created_at, updated_at";

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub id:          i64,
  pub name:        String,
  pub email:       String,
  pub cpf:         String,
  pub dob:         String,
  pub nationality: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:          row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      cpf:         row.get(3)?,
      dob:         row.get(4)?,
      nationality: row.get(5)?,
      created_at:  row.get(6)?,
      updated_at:  row.get(7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          self.id,
      name:        self.name,
      email:       self.email,
      cpf:         self.cpf,
      dob:         decode_date(&self.dob)?,
      nationality: self.nationality,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawPhone::from_row`].
pub const PHONE_COLUMNS: &str = "id, person_id, number, created_at, updated_at";

/// Raw values read directly from a `phones` row.
pub struct RawPhone {
  pub id:         i64,
  pub person_id:  i64,
  pub number:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPhone {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPhone {
      id:         row.get(0)?,
      person_id:  row.get(1)?,
      number:     row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_phone(self) -> Result<Phone> {
    Ok(Phone {
      id:         self.id,
      person_id:  self.person_id,
      number:     self.number,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
