//! Request validation for people.
//!
//! Validation runs in two stages. [`Rules::check`] looks at the payload alone
//! and is free of side effects; [`Rules::validate`] runs it and then asks the
//! store whether the unique fields are still free. A request that fails any
//! rule is rejected as a whole.
//!
//! | Field | Rules |
//! |-------|-------|
//! | `name` | string, at most 255 characters |
//! | `email` | string, email syntax, at most 255 characters, unique |
//! | `cpf` | string (create only), valid CPF, unique |
//! | `dob` | `YYYY-MM-DD` or RFC 3339, not after today |
//! | `nationality` | string, at most 255 characters |
//!
//! In [`Mode::Create`] every field is required. In [`Mode::Update`] a field
//! is only checked when its key is present, and uniqueness ignores the
//! record being updated.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::ValidateEmail as _;

use crate::{
  cpf,
  person::{Field, NewPerson, PersonChanges, PersonId, UniqueField},
  store::PersonStore,
};

/// Maximum length, in characters, of the free-text fields.
pub const MAX_LENGTH: usize = 255;

// ─── Mode ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Every field required.
  Create,
  /// Every field optional; `except` is the record being updated.
  Update { except: PersonId },
}

impl Mode {
  fn except(self) -> Option<PersonId> {
    match self {
      Mode::Create => None,
      Mode::Update { except } => Some(except),
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failed rules keyed by field, each with its messages in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, Vec<String>>);

impl ValidationErrors {
  /// The error reported when `field` collides with another person.
  pub fn taken(field: UniqueField) -> Self {
    let mut errors = Self::default();
    errors.add(field.field(), msg::taken(field.field()));
    errors
  }

  pub fn add(&mut self, field: Field, message: String) {
    self.0.entry(field).or_default().push(message);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  /// Messages for `field`; empty if it passed.
  pub fn get(&self, field: Field) -> &[String] {
    self.0.get(&field).map(Vec::as_slice).unwrap_or_default()
  }

  /// Total number of messages across all fields.
  pub fn len(&self) -> usize { self.0.values().map(Vec::len).sum() }

  /// One-line summary: the first message plus a count of the rest.
  pub fn summary(&self) -> String {
    let Some(first) = self.0.values().flatten().next() else {
      return "The given data was invalid.".to_owned();
    };
    match self.len() - 1 {
      0 => first.clone(),
      1 => format!("{first} (and 1 more error)"),
      n => format!("{first} (and {n} more errors)"),
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.summary())
  }
}

/// Why [`Rules::validate`] refused a payload.
#[derive(Debug, Error)]
pub enum Rejection<E> {
  #[error("{0}")]
  Invalid(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] E),
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// The rule set for one request.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
  mode:  Mode,
  /// Latest acceptable date of birth.
  today: NaiveDate,
}

impl Rules {
  pub fn new(mode: Mode, today: NaiveDate) -> Self { Self { mode, today } }

  pub fn create(today: NaiveDate) -> Self { Self::new(Mode::Create, today) }

  pub fn update(id: PersonId, today: NaiveDate) -> Self {
    Self::new(Mode::Update { except: id }, today)
  }

  /// Apply every rule that does not need the store.
  ///
  /// On success the returned changes hold the trimmed strings. Keys other
  /// than the five person fields are ignored.
  pub fn check(
    &self,
    payload: &Map<String, Value>,
  ) -> Result<PersonChanges, ValidationErrors> {
    let (changes, errors) = self.check_fields(payload);
    if errors.is_empty() { Ok(changes) } else { Err(errors) }
  }

  /// [`check`](Self::check), then reject email or CPF values already held
  /// by another person.
  pub async fn validate<S: PersonStore>(
    &self,
    store: &S,
    payload: &Map<String, Value>,
  ) -> Result<PersonChanges, Rejection<S::Error>> {
    let (changes, mut errors) = self.check_fields(payload);

    for unique in UniqueField::ALL {
      if errors.contains(unique.field()) {
        continue;
      }
      let Some(value) = changes.unique_value(unique) else {
        continue;
      };
      if store
        .is_taken(unique, value, self.mode.except())
        .await
        .map_err(Rejection::Store)?
      {
        errors.add(unique.field(), msg::taken(unique.field()));
      }
    }

    if errors.is_empty() {
      Ok(changes)
    } else {
      Err(Rejection::Invalid(errors))
    }
  }

  fn check_fields(
    &self,
    payload: &Map<String, Value>,
  ) -> (PersonChanges, ValidationErrors) {
    let mut errors = ValidationErrors::default();
    let mut changes = PersonChanges::default();

    if let Some(name) = self.text(payload, Field::Name, &mut errors) {
      check_length(Field::Name, name, &mut errors);
      changes.name = Some(name.to_owned());
    }

    if let Some(email) = self.text(payload, Field::Email, &mut errors) {
      if !email.validate_email() {
        errors.add(Field::Email, msg::email(Field::Email));
      }
      check_length(Field::Email, email, &mut errors);
      changes.email = Some(email.to_owned());
    }

    if let Some(raw) = self.text(payload, Field::Cpf, &mut errors) {
      if cpf::is_valid(raw) {
        changes.cpf = Some(raw.to_owned());
      } else {
        errors.add(Field::Cpf, msg::cpf(Field::Cpf));
      }
    }

    if let Some(raw) = self.text(payload, Field::Dob, &mut errors) {
      match parse_date(raw) {
        // An unreadable date cannot be compared with today either.
        None => {
          errors.add(Field::Dob, msg::date(Field::Dob));
          errors.add(Field::Dob, msg::before_or_equal_today(Field::Dob));
        }
        Some(dob) if dob > self.today => {
          errors.add(Field::Dob, msg::before_or_equal_today(Field::Dob))
        }
        Some(dob) => changes.dob = Some(dob),
      }
    }

    if let Some(nationality) = self.text(payload, Field::Nationality, &mut errors)
    {
      check_length(Field::Nationality, nationality, &mut errors);
      changes.nationality = Some(nationality.to_owned());
    }

    (changes, errors)
  }

  /// The trimmed, non-blank string value of `field`, or `None` after
  /// recording why there is none.
  ///
  /// An absent key is only an error in create mode. A blank or `null` value
  /// counts as absent when creating and as the wrong type when updating.
  fn text<'a>(
    &self,
    payload: &'a Map<String, Value>,
    field: Field,
    errors: &mut ValidationErrors,
  ) -> Option<&'a str> {
    let value = match payload.get(field.as_str()) {
      None if self.mode == Mode::Create => {
        errors.add(field, msg::required(field));
        return None;
      }
      None => return None,
      Some(value) => value,
    };

    let blank = match value {
      Value::String(s) if !s.trim().is_empty() => return Some(s.trim()),
      Value::String(_) | Value::Null => true,
      _ => false,
    };

    if blank && self.mode == Mode::Create {
      errors.add(field, msg::required(field));
    } else {
      for message in msg::wrong_type(field, self.mode) {
        errors.add(field, message);
      }
    }
    None
  }
}

impl TryFrom<PersonChanges> for NewPerson {
  type Error = ValidationErrors;

  /// Promote a complete set of changes, reporting any missing field as
  /// required.
  fn try_from(changes: PersonChanges) -> Result<Self, Self::Error> {
    match changes {
      PersonChanges {
        name: Some(name),
        email: Some(email),
        cpf: Some(cpf),
        dob: Some(dob),
        nationality: Some(nationality),
      } => Ok(NewPerson { name, email, cpf, dob, nationality }),
      partial => {
        let mut errors = ValidationErrors::default();
        let present = [
          partial.name.is_some(),
          partial.email.is_some(),
          partial.cpf.is_some(),
          partial.dob.is_some(),
          partial.nationality.is_some(),
        ];
        for (field, present) in Field::ALL.into_iter().zip(present) {
          if !present {
            errors.add(field, msg::required(field));
          }
        }
        Err(errors)
      }
    }
  }
}

fn check_length(field: Field, value: &str, errors: &mut ValidationErrors) {
  if value.chars().count() > MAX_LENGTH {
    errors.add(field, msg::max(field));
  }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
  })
}

mod msg {
  use crate::person::Field;

  use super::{MAX_LENGTH, Mode};

  pub fn required(f: Field) -> String { format!("The {f} field is required.") }

  pub fn string(f: Field) -> String { format!("The {f} field must be a string.") }

  /// Messages for a value that is not a usable string.
  ///
  /// Dates have no string rule, and a CPF only has one when creating; the
  /// format rules that follow fail as well.
  pub fn wrong_type(f: Field, mode: Mode) -> Vec<String> {
    match (f, mode) {
      (Field::Dob, _) => vec![date(f), before_or_equal_today(f)],
      (Field::Cpf, Mode::Create) => vec![string(f), cpf(f)],
      (Field::Cpf, Mode::Update { .. }) => vec![cpf(f)],
      _ => vec![string(f)],
    }
  }

  pub fn max(f: Field) -> String {
    format!("The {f} field must not be greater than {MAX_LENGTH} characters.")
  }

  pub fn email(f: Field) -> String {
    format!("The {f} field must be a valid email address.")
  }

  pub fn taken(f: Field) -> String { format!("The {f} has already been taken.") }

  pub fn cpf(f: Field) -> String { format!("The {f} field is not a valid CPF.") }

  pub fn date(f: Field) -> String { format!("The {f} field must be a valid date.") }

  pub fn before_or_equal_today(f: Field) -> String {
    format!("The {f} field must be a date before or equal to today.")
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn object(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      other => panic!("not an object: {other}"),
    }
  }

  fn valid() -> Map<String, Value> {
    object(json!({
      "name":        "Ana Souza",
      "email":       "ana@example.com",
      "cpf":         "529.982.247-25",
      "dob":         "1990-04-12",
      "nationality": "Brazil",
    }))
  }

  #[test]
  fn create_accepts_a_valid_payload() {
    let changes = Rules::create(today()).check(&valid()).unwrap();
    let person = NewPerson::try_from(changes).unwrap();
    assert_eq!(person.name, "Ana Souza");
    assert_eq!(person.cpf, "529.982.247-25");
    assert_eq!(person.dob, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
  }

  #[test]
  fn create_requires_every_field() {
    let errors = Rules::create(today()).check(&Map::new()).unwrap_err();
    assert!(Field::ALL.iter().all(|f| errors.contains(*f)));
    assert_eq!(errors.len(), Field::ALL.len());
    assert_eq!(errors.get(Field::Email), ["The email field is required."]);
    assert_eq!(
      errors.summary(),
      "The name field is required. (and 4 more errors)"
    );
  }

  #[test]
  fn blank_and_null_count_as_missing_on_create() {
    let mut payload = valid();
    payload.insert("name".into(), json!("   "));
    payload.insert("nationality".into(), Value::Null);
    let errors = Rules::create(today()).check(&payload).unwrap_err();
    assert_eq!(errors.get(Field::Name), ["The name field is required."]);
    assert_eq!(
      errors.get(Field::Nationality),
      ["The nationality field is required."]
    );
  }

  #[test]
  fn non_strings_are_rejected() {
    let mut payload = valid();
    payload.insert("name".into(), json!(42));
    payload.insert("dob".into(), json!(["1990-04-12"]));
    let errors = Rules::create(today()).check(&payload).unwrap_err();
    assert_eq!(errors.get(Field::Name), ["The name field must be a string."]);
    assert_eq!(
      errors.get(Field::Dob),
      [
        "The dob field must be a valid date.",
        "The dob field must be a date before or equal to today.",
      ]
    );
  }

  #[test]
  fn cpf_type_rule_only_applies_on_create() {
    let mut payload = valid();
    payload.insert("cpf".into(), json!(52998224725_u64));
    let errors = Rules::create(today()).check(&payload).unwrap_err();
    assert_eq!(
      errors.get(Field::Cpf),
      ["The cpf field must be a string.", "The cpf field is not a valid CPF."]
    );

    let errors = Rules::update(7, today())
      .check(&object(json!({ "cpf": 52998224725_u64 })))
      .unwrap_err();
    assert_eq!(errors.get(Field::Cpf), ["The cpf field is not a valid CPF."]);
  }

  #[test]
  fn long_values_are_rejected() {
    let mut payload = valid();
    payload.insert("nationality".into(), json!("x".repeat(256)));
    let local = "a".repeat(250);
    payload.insert("email".into(), json!(format!("{local}@example.com")));
    let errors = Rules::create(today()).check(&payload).unwrap_err();
    assert!(errors.contains(Field::Nationality));
    assert!(
      errors
        .get(Field::Email)
        .contains(&"The email field must not be greater than 255 characters.".to_owned())
    );
  }

  #[test]
  fn length_counts_characters_not_bytes() {
    let mut payload = valid();
    payload.insert("name".into(), json!("ç".repeat(255)));
    assert!(Rules::create(today()).check(&payload).is_ok());
  }

  #[test]
  fn invalid_email_and_cpf() {
    let mut payload = valid();
    payload.insert("email".into(), json!("not-an-email"));
    payload.insert("cpf".into(), json!("12345678901"));
    let errors = Rules::create(today()).check(&payload).unwrap_err();
    assert_eq!(
      errors.get(Field::Email),
      ["The email field must be a valid email address."]
    );
    assert_eq!(errors.get(Field::Cpf), ["The cpf field is not a valid CPF."]);
    assert_eq!(errors.len(), 2);
  }

  #[test]
  fn dob_boundaries() {
    let rules = Rules::create(today());

    let mut payload = valid();
    payload.insert("dob".into(), json!("2024-06-01"));
    assert!(rules.check(&payload).is_ok());

    payload.insert("dob".into(), json!("2024-06-02"));
    let errors = rules.check(&payload).unwrap_err();
    assert_eq!(
      errors.get(Field::Dob),
      ["The dob field must be a date before or equal to today."]
    );

    for unreadable in ["2024-02-30", "garbage"] {
      payload.insert("dob".into(), json!(unreadable));
      let errors = rules.check(&payload).unwrap_err();
      assert_eq!(
        errors.get(Field::Dob),
        [
          "The dob field must be a valid date.",
          "The dob field must be a date before or equal to today.",
        ],
        "{unreadable}"
      );
    }

    payload.insert("dob".into(), json!("1990-04-12T10:00:00Z"));
    let changes = rules.check(&payload).unwrap();
    assert_eq!(changes.dob, NaiveDate::from_ymd_opt(1990, 4, 12));
  }

  #[test]
  fn update_allows_partial_payloads() {
    let rules = Rules::update(7, today());
    let changes = rules.check(&object(json!({ "name": "  Bia  " }))).unwrap();
    assert_eq!(changes.name.as_deref(), Some("Bia"));
    assert!(changes.email.is_none());
    assert!(rules.check(&Map::new()).unwrap().is_empty());
  }

  #[test]
  fn update_rejects_null_and_blank() {
    let rules = Rules::update(7, today());
    let errors = rules
      .check(&object(json!({ "name": null, "email": "" })))
      .unwrap_err();
    assert_eq!(errors.get(Field::Name), ["The name field must be a string."]);
    assert_eq!(errors.get(Field::Email), ["The email field must be a string."]);
  }

  #[test]
  fn update_applies_field_rules() {
    let errors = Rules::update(7, today())
      .check(&object(json!({ "cpf": "12345678901", "dob": "2030-01-01" })))
      .unwrap_err();
    assert!(errors.contains(Field::Cpf));
    assert!(errors.contains(Field::Dob));
    assert!(!errors.contains(Field::Name));
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let mut payload = valid();
    payload.insert("id".into(), json!(99));
    payload.insert("phones".into(), json!([]));
    assert!(Rules::create(today()).check(&payload).is_ok());
  }

  #[test]
  fn incomplete_changes_do_not_promote() {
    let errors = NewPerson::try_from(PersonChanges {
      name: Some("Ana".into()),
      ..Default::default()
    })
    .unwrap_err();
    assert!(!errors.contains(Field::Name));
    assert_eq!(errors.len(), 4);
  }

  #[test]
  fn summary_counts_remaining_messages() {
    let mut errors = ValidationErrors::taken(UniqueField::Cpf);
    assert_eq!(errors.summary(), "The cpf has already been taken.");
    errors.add(Field::Name, "first".into());
    assert_eq!(errors.summary(), "first (and 1 more error)");
    assert_eq!(errors.to_string(), errors.summary());
  }

  #[test]
  fn serializes_in_field_order() {
    let errors = Rules::create(today())
      .check(&object(json!({ "nationality": 1 })))
      .unwrap_err();
    let json = serde_json::to_string(&errors).unwrap();
    let name_at = json.find("\"name\"").unwrap();
    let nationality_at = json.find("\"nationality\"").unwrap();
    assert!(name_at < nationality_at, "{json}");
  }
}
