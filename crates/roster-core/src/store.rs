//! The `PersonStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  page::{Page, PageRequest},
  person::{NewPerson, Person, PersonChanges, PersonId, UniqueField},
  phone::{NewPhone, Phone},
};

/// Errors produced by a [`PersonStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The unique column a write collided with, if that is why it failed.
  ///
  /// Validation checks uniqueness before writing, but a concurrent write can
  /// still win the race; the backend's own constraint is the final word.
  fn conflict(&self) -> Option<UniqueField> { None }
}

/// Abstraction over a people directory backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  // ── People ────────────────────────────────────────────────────────────

  /// Return one page of people ordered by ascending id.
  fn list_people(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + '_;

  fn count_people(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Persist a new person. The id and timestamps are set by the store.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Merge `changes` into an existing person and refresh `updated_at`.
  /// Returns `None` if the person does not exist.
  fn update_person(
    &self,
    id: PersonId,
    changes: PersonChanges,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Permanently remove a person and their phones. Returns `false` if the
  /// person did not exist.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether any person other than `except` already holds `value` in
  /// `field`.
  fn is_taken<'a>(
    &'a self,
    field: UniqueField,
    value: &'a str,
    except: Option<PersonId>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Phones ────────────────────────────────────────────────────────────

  /// Attach a phone to a person. Returns `None` if the person does not
  /// exist.
  fn add_phone(
    &self,
    person_id: PersonId,
    input: NewPhone,
  ) -> impl Future<Output = Result<Option<Phone>, Self::Error>> + Send + '_;

  /// All phones owned by a person, ordered by ascending id.
  fn list_phones(
    &self,
    person_id: PersonId,
  ) -> impl Future<Output = Result<Vec<Phone>, Self::Error>> + Send + '_;
}
