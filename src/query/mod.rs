//! Typed collection queries.
//!
//! A [`CollectionQuery`] records builder calls as [`QueryOperation`]s. A
//! terminal call compiles them into a [`QueryModel`], renders the model into
//! query parameters and fetches the collection page by page through the
//! data store.
//!
//! The remote API only understands conjunctions of constant comparisons with
//! at most one constraint per field. Range comparisons on one field merge
//! into a single range term:
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use idm_client::query::{compile, field, render, QueryOperation};
//!
//! let since = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
//! let until = Utc.with_ymd_and_hms(2015, 2, 1, 0, 0, 0).unwrap();
//! let model = compile(&[QueryOperation::Where(
//!     field("createdAt").gte(since) & field("createdAt").lt(until),
//! )])
//! .unwrap();
//!
//! assert_eq!(
//!     render(&model, 25),
//!     vec![
//!         ("limit".to_string(), "25".to_string()),
//!         ("createdAt".to_string(), "[2015-01-01T00:00:00Z,2015-02-01T00:00:00Z)".to_string()),
//!     ]
//! );
//! ```
//!
//! Disjunctions, negations, not-equal comparisons and field-to-field
//! comparisons fail to compile with a [`QueryError`](crate::error::QueryError).

pub mod compiler;
pub mod executor;
pub mod model;
pub mod predicate;
pub mod render;


pub use compiler::compile;
pub use executor::{CollectionQuery, PageIterator};
pub use model::{
    MatchKind, OrderByTerm, QueryModel, QueryOperation, RangeBound, ResultOperator, SortDirection,
    WhereTerm,
};
pub use predicate::{CompareOp, ComparePredicate, Field, Operand, Predicate, QueryValue, field};
pub use render::{render, to_query_string};
