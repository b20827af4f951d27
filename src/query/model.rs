//! Query operations and the compiled query model.

use super::predicate::{Predicate, QueryValue};
use crate::resource::ExpandTerm;
use std::fmt;

/// Sort direction of an order-by term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Terminal operator applied to the query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultOperator {
    Any,
    Count,
    LongCount,
    First { default_if_empty: bool },
    Single { default_if_empty: bool },
}

/// One builder call, recorded in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperation {
    /// Free-text search across the collection (`q=`).
    Search(String),
    Where(Predicate),
    OrderBy { field: String, direction: SortDirection },
    ThenBy { field: String, direction: SortDirection },
    Skip(usize),
    Take(usize),
    PageSize(usize),
    Expand(ExpandTerm),
    Result(ResultOperator),
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperation::Search(text) => write!(f, "Search(\"{}\")", text),
            QueryOperation::Where(predicate) => write!(f, "Where({})", predicate),
            QueryOperation::OrderBy { field, direction } => write!(f, "OrderBy({}, {:?})", field, direction),
            QueryOperation::ThenBy { field, direction } => write!(f, "ThenBy({}, {:?})", field, direction),
            QueryOperation::Skip(count) => write!(f, "Skip({})", count),
            QueryOperation::Take(count) => write!(f, "Take({})", count),
            QueryOperation::PageSize(size) => write!(f, "PageSize({})", size),
            QueryOperation::Expand(term) => write!(f, "Expand({})", term),
            QueryOperation::Result(operator) => write!(f, "{:?}", operator),
        }
    }
}

/// One end of a range term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBound {
    pub value: QueryValue,
    pub inclusive: bool,
}

/// Which wildcard pattern a match term uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    StartsWith,
    EndsWith,
    Contains,
}

/// One field constraint in the compiled query. At most one per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereTerm {
    Equals {
        field: String,
        value: QueryValue,
    },
    Match {
        field: String,
        value: QueryValue,
        kind: MatchKind,
    },
    Range {
        field: String,
        lower: Option<RangeBound>,
        upper: Option<RangeBound>,
    },
}

impl WhereTerm {
    pub fn field(&self) -> &str {
        match self {
            WhereTerm::Equals { field, .. }
            | WhereTerm::Match { field, .. }
            | WhereTerm::Range { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByTerm {
    pub field: String,
    pub direction: SortDirection,
}

/// A compiled collection query, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryModel {
    /// Free-text search term.
    pub filter: Option<String>,
    pub offset: Option<usize>,
    /// Page size sent to the server.
    pub limit: Option<usize>,
    /// Total number of items to return across all pages.
    pub max_items: Option<usize>,
    pub where_terms: Vec<WhereTerm>,
    pub order_by_terms: Vec<OrderByTerm>,
    pub expand_terms: Vec<ExpandTerm>,
    pub result_operator: Option<ResultOperator>,
}

impl QueryModel {
    /// Whether a `take(0)` caps the query to no items at all.
    pub fn selects_nothing(&self) -> bool {
        self.max_items == Some(0)
    }
}
