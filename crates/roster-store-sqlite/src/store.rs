//! [`SqliteStore`], the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use roster_core::{
  page::{Page, PageRequest},
  person::{NewPerson, Person, PersonChanges, PersonId, UniqueField},
  phone::{NewPhone, Phone},
  store::PersonStore,
};

use crate::{
  encode::{
    encode_date, encode_dt, RawPerson, RawPhone, PERSON_COLUMNS, PHONE_COLUMNS,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self, page: PageRequest) -> Result<Page<Person>> {
    let limit  = page.limit() as i64;
    let offset = page.offset() as i64;

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let people = raws
      .into_iter()
      .map(RawPerson::into_person)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(page, people, total.max(0) as u64))
  }

  async fn count_people(&self) -> Result<u64> {
    let total: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?)
      })
      .await?;
    Ok(total.max(0) as u64)
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            rusqlite::params![id],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let now    = Utc::now();
    let at_str = encode_dt(now);

    let (id, input) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (
             name, email, cpf, dob, nationality, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            input.name,
            input.email,
            input.cpf,
            encode_date(input.dob),
            input.nationality,
            at_str,
          ],
        )?;
        Ok((conn.last_insert_rowid(), input))
      })
      .await?;

    Ok(Person {
      id,
      name:        input.name,
      email:       input.email,
      cpf:         input.cpf,
      dob:         input.dob,
      nationality: input.nationality,
      created_at:  now,
      updated_at:  now,
    })
  }

  async fn update_person(
    &self,
    id:      PersonId,
    changes: PersonChanges,
  ) -> Result<Option<Person>> {
    let Some(mut person) = self.get_person(id).await? else {
      return Ok(None);
    };
    // Nothing to write; the record and its `updated_at` stay as they are.
    if changes.is_empty() {
      return Ok(Some(person));
    }
    changes.apply_to(&mut person);
    person.updated_at = Utc::now();

    let row = person.clone();
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE people
              SET name = ?1, email = ?2, cpf = ?3, dob = ?4,
                  nationality = ?5, updated_at = ?6
            WHERE id = ?7",
          rusqlite::params![
            row.name,
            row.email,
            row.cpf,
            encode_date(row.dob),
            row.nationality,
            encode_dt(row.updated_at),
            row.id,
          ],
        )?)
      })
      .await?;

    // Zero rows means the person was deleted between the read and the write.
    Ok((updated > 0).then_some(person))
  }

  async fn delete_person(&self, id: PersonId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM people WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn is_taken(
    &self,
    field:  UniqueField,
    value:  &str,
    except: Option<PersonId>,
  ) -> Result<bool> {
    let value = value.to_owned();
    // `field.column()` is one of a closed set of static column names.
    let sql = format!(
      "SELECT EXISTS (
         SELECT 1 FROM people WHERE {} = ?1 AND (?2 IS NULL OR id != ?2)
       )",
      field.column()
    );

    let taken = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![value, except], |r| r.get(0))?)
      })
      .await?;
    Ok(taken)
  }

  // ── Phones ────────────────────────────────────────────────────────────────

  async fn add_phone(
    &self,
    person_id: PersonId,
    input:     NewPhone,
  ) -> Result<Option<Phone>> {
    let now    = Utc::now();
    let at_str = encode_dt(now);
    let number = input.number.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM people WHERE id = ?1)",
          rusqlite::params![person_id],
          |r| r.get(0),
        )?;
        if !exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO phones (person_id, number, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![person_id, number, at_str],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| Phone {
      id,
      person_id,
      number: input.number,
      created_at: now,
      updated_at: now,
    }))
  }

  async fn list_phones(&self, person_id: PersonId) -> Result<Vec<Phone>> {
    let raws: Vec<RawPhone> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PHONE_COLUMNS} FROM phones WHERE person_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![person_id], RawPhone::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPhone::into_phone).collect()
  }
}
