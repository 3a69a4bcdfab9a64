//! Domain types, validation rules, and the storage trait for Roster.
//!
//! Nothing here knows about HTTP or SQL. The store and API crates both build
//! on these types.

// `PersonStore` uses native `async fn` in traits; its futures are `Send` by
// construction in every implementation we ship.
#![allow(async_fn_in_trait)]

pub mod cpf;
pub mod error;
pub mod page;
pub mod person;
pub mod phone;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
