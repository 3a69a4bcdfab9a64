//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    cpf         TEXT NOT NULL UNIQUE,   -- as submitted
    dob         TEXT NOT NULL,          -- YYYY-MM-DD
    nationality TEXT NOT NULL,
    created_at  TEXT NOT NULL,          -- RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

-- Phones belong to exactly one person and go away with it.
CREATE TABLE IF NOT EXISTS phones (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    person_id   INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    number      TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS phones_person_idx ON phones(person_id);

PRAGMA user_version = 1;
";
