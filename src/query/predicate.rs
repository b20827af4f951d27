//! Predicate AST for collection queries.
//!
//! Predicates are plain data. Nothing here checks whether the server can
//! evaluate a predicate; that happens when the query is compiled.

use crate::resource::ResourceStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A constant compared against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Status(ResourceStatus),
}

impl fmt::Display for QueryValue {
    /// Wire form of the value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(value) => f.write_str(value),
            QueryValue::Integer(value) => write!(f, "{}", value),
            QueryValue::Boolean(value) => write!(f, "{}", value),
            QueryValue::DateTime(value) => {
                f.write_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            QueryValue::Status(status) => f.write_str(status.as_str()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(i64::from(value))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(value: DateTime<Utc>) -> Self {
        QueryValue::DateTime(value)
    }
}

impl From<ResourceStatus> for QueryValue {
    fn from(value: ResourceStatus) -> Self {
        QueryValue::Status(value)
    }
}

///
/// CompareOp
///

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    EndsWith,
    Contains,
}

impl CompareOp {
    /// Whether the operator bounds a range.
    pub fn is_range(self) -> bool {
        matches!(self, CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::StartsWith => "starts_with",
            CompareOp::EndsWith => "ends_with",
            CompareOp::Contains => "contains",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Constant(QueryValue),
    /// Another field of the same resource. Not evaluable by the server.
    Field(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(QueryValue::String(value)) => write!(f, "\"{}\"", value),
            Operand::Constant(value) => write!(f, "{}", value),
            Operand::Field(field) => f.write_str(field),
        }
    }
}

///
/// ComparePredicate
///

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub operand: Operand,
}

/// A boolean condition over resource fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare(ComparePredicate),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    fn compare(field: &str, op: CompareOp, operand: Operand) -> Self {
        Predicate::Compare(ComparePredicate {
            field: field.to_string(),
            op,
            operand,
        })
    }

    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare(cmp) => write!(f, "{} {} {}", cmp.field, cmp.op.symbol(), cmp.operand),
            Predicate::And(left, right) => write!(f, "({} && {})", left, right),
            Predicate::Or(left, right) => write!(f, "({} || {})", left, right),
            Predicate::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

/// A named resource field, the starting point of a predicate.
///
/// ```rust
/// use idm_client::query::field;
/// use idm_client::resource::ResourceStatus;
///
/// let predicate = field("status").eq(ResourceStatus::Enabled) & field("email").ends_with("@example.com");
/// assert_eq!(predicate.to_string(), "(status == ENABLED && email ends_with \"@example.com\")");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field(String);

/// Refer to the field `name` (wire name, e.g. `createdAt`).
pub fn field(name: impl Into<String>) -> Field {
    Field(name.into())
}

impl Field {
    pub fn name(&self) -> &str {
        &self.0
    }

    fn constant(&self, op: CompareOp, value: impl Into<QueryValue>) -> Predicate {
        Predicate::compare(&self.0, op, Operand::Constant(value.into()))
    }

    pub fn eq(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Eq, value)
    }

    pub fn ne(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Ne, value)
    }

    pub fn gt(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Gt, value)
    }

    pub fn gte(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Gte, value)
    }

    pub fn lt(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Lt, value)
    }

    pub fn lte(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Lte, value)
    }

    pub fn starts_with(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::StartsWith, value)
    }

    pub fn ends_with(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::EndsWith, value)
    }

    pub fn contains(&self, value: impl Into<QueryValue>) -> Predicate {
        self.constant(CompareOp::Contains, value)
    }

    /// Compare against another field.
    pub fn compare_field(&self, op: CompareOp, other: &Field) -> Predicate {
        Predicate::compare(&self.0, op, Operand::Field(other.0.clone()))
    }
}
