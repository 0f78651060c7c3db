//! # sqlx-crud-core
//!
//! A dialect-aware CRUD convenience layer over a generic relational
//! access primitive.
//!
//! ## Core Components
//!
//! - **[`Dialect`]** (re-exported): per-database SQL grammar for
//!   pagination, column introspection, and recursive queries
//! - **[`builder`]**: pure statement builders — equality predicates,
//!   safely-partitioned `IN` lists, INSERT/UPDATE/DELETE text with
//!   positional values
//! - **[`page`]**: page arithmetic and [`PageResult`] metadata
//! - **[`params`]**: named-parameter expansion and placeholder numbering
//! - **[`Record`] / [`TableMapping`]**: declared (not reflected) record
//!   mappings, memoized per type
//! - **[`Executor`]**: the boundary trait a driver crate implements
//! - **[`DbContext`]**: the facade composing all of the above
//!
//! ## Architecture
//!
//! Statement text is assembled by pure functions and only then handed to
//! the executor together with its bound values — nothing partially built
//! is ever executed, and identifiers are validated before interpolation.
//! The context owns exactly two pieces of shared state, both
//! compute-once-then-freeze: the resolved dialect and the per-type table
//! mappings. Failures from the executor propagate unchanged; empty-input
//! operations short-circuit to zero-effect results instead of erroring.

pub mod builder;
mod context;
mod error;
mod executor;
mod ident;
mod mapping;
pub mod page;
pub mod params;

pub use builder::{OrderColumn, SAFE_IN_SIZE, SortDirection};
pub use context::DbContext;
pub use error::{Error, Result};
pub use executor::{Executor, Row};
pub use mapping::{MappingCache, Record, TableMapping};
pub use page::PageResult;
pub use sqlx_crud_dialect::Dialect;
