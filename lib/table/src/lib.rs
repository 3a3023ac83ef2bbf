//! Thin CRUD client for a hosted relational data service.
//!
//! The service exposes named tables over a REST dialect (PostgREST
//! style: `?col=eq.val` filters, `Prefer: return=representation`).
//! Rows travel as plain JSON objects; schema and column mapping are the
//! caller's concern.
//!
//! [`TableStore`] is the seam: [`RestStore`] talks to the real service,
//! [`MemStore`] backs tests with the same filter semantics.

pub mod error;
pub mod mem;
pub mod rest;
pub mod traits;

pub use error::TableError;
pub use mem::MemStore;
pub use rest::RestStore;
pub use traits::{Filter, Op, Order, Query, TableStore};
