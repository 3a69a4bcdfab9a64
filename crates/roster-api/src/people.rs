//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/people` | Optional `?page=N`; 15 per page |
//! | `POST`   | `/people` | Body: every person field; returns 201 |
//! | `GET`    | `/people/{id}` | 404 if not found |
//! | `PUT`    | `/people/{id}` | Body: any subset of the fields; also `PATCH` |
//! | `DELETE` | `/people/{id}` | 204, empty body |
//!
//! Write bodies are validated by [`Rules`]; failures return 422 with a
//! field → messages map.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use roster_core::{
  page::{Page, PageRequest},
  person::{NewPerson, Person, PersonId},
  store::PersonStore,
  validation::Rules,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

fn today() -> NaiveDate { Utc::now().date_naive() }

fn not_found(id: PersonId) -> ApiError {
  ApiError::NotFound(format!("person {id} not found"))
}

/// Write bodies must be JSON objects.
fn object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
  body
    .as_object()
    .ok_or_else(|| ApiError::BadRequest("expected a JSON object".to_owned()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// 1-based page number; defaults to the first page.
  pub page: Option<u32>,
}

/// `GET /people[?page=N]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Person>>, ApiError>
where
  S: PersonStore,
{
  let page = store
    .list_people(PageRequest::new(params.page.unwrap_or(1)))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Show ─────────────────────────────────────────────────────────────────────

/// `GET /people/{id}`
pub async fn show<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people`: 201 with the stored [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let payload = object(&body)?;
  let changes = Rules::create(today()).validate(store.as_ref(), payload).await?;
  let input = NewPerson::try_from(changes).map_err(ApiError::Invalid)?;

  let person = store.create_person(input).await.map_err(ApiError::store)?;
  tracing::info!(id = person.id, "person created");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT|PATCH /people/{id}`: only the fields present in the body change.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
  Json(body): Json<Value>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let payload = object(&body)?;

  // An unknown id is a 404 even when the body would not validate.
  store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  let changes = Rules::update(id, today())
    .validate(store.as_ref(), payload)
    .await?;

  let person = store
    .update_person(id, changes)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(id, "person updated");
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /people/{id}`: 204 with no body.
pub async fn destroy<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
{
  if !store.delete_person(id).await.map_err(ApiError::store)? {
    return Err(not_found(id));
  }
  tracing::info!(id, "person deleted");
  Ok(StatusCode::NO_CONTENT)
}
