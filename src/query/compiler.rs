//! Lowering of recorded query operations into a [`QueryModel`].
//!
//! Compilation validates everything the server cannot express, so a query
//! that compiles always renders and executes without query errors. Range
//! comparisons on one field are merged here into a single range term.

use super::model::{
    MatchKind, OrderByTerm, QueryModel, QueryOperation, RangeBound, WhereTerm,
};
use super::predicate::{CompareOp, ComparePredicate, Operand, Predicate, QueryValue};
use crate::data_store::builder::MAX_PAGE_SIZE;
use crate::error::{QueryError, QueryResult};
use log::trace;

/// Compile `operations`, given in call order.
pub fn compile(operations: &[QueryOperation]) -> QueryResult<QueryModel> {
    let mut compiler = QueryCompiler::default();
    for operation in operations {
        compiler.visit(operation)?;
    }
    let model = compiler.finish();
    trace!("Compiled {} query operations into {:?}", operations.len(), model);
    Ok(model)
}

#[derive(Default)]
struct QueryCompiler {
    model: QueryModel,
    page_size: Option<usize>,
}

impl QueryCompiler {
    fn visit(&mut self, operation: &QueryOperation) -> QueryResult<()> {
        if let Some(operator) = self.model.result_operator {
            return Err(QueryError::not_supported(format!(
                "{} after terminal operator {:?}",
                operation, operator
            )));
        }

        match operation {
            QueryOperation::Search(text) => {
                if self.model.filter.is_some() {
                    return Err(QueryError::not_supported(format!(
                        "{}: only one search term per query",
                        operation
                    )));
                }
                self.model.filter = Some(text.clone());
            }
            QueryOperation::Where(predicate) => {
                let mut comparisons = Vec::new();
                flatten(predicate, &mut comparisons)?;
                for comparison in comparisons {
                    self.add_term(comparison)?;
                }
            }
            QueryOperation::OrderBy { field, direction } => {
                if !self.model.order_by_terms.is_empty() {
                    return Err(QueryError::not_supported(format!(
                        "{}: use ThenBy for secondary orderings",
                        operation
                    )));
                }
                self.model.order_by_terms.push(OrderByTerm {
                    field: field.clone(),
                    direction: *direction,
                });
            }
            QueryOperation::ThenBy { field, direction } => {
                if self.model.order_by_terms.is_empty() {
                    return Err(QueryError::not_supported(format!(
                        "{} without a preceding OrderBy",
                        operation
                    )));
                }
                self.model.order_by_terms.push(OrderByTerm {
                    field: field.clone(),
                    direction: *direction,
                });
            }
            QueryOperation::Skip(count) => {
                if self.model.max_items.is_some() {
                    return Err(QueryError::not_supported(format!(
                        "{} after Take",
                        operation
                    )));
                }
                let offset = self.model.offset.unwrap_or(0).checked_add(*count).ok_or_else(|| {
                    QueryError::InvalidPagination {
                        message: format!("combined skip overflows at {}", operation),
                    }
                })?;
                self.model.offset = Some(offset);
            }
            QueryOperation::Take(count) => {
                let max_items = self.model.max_items.map_or(*count, |max| max.min(*count));
                self.model.max_items = Some(max_items);
            }
            QueryOperation::PageSize(size) => {
                if *size == 0 || *size > MAX_PAGE_SIZE {
                    return Err(QueryError::InvalidPagination {
                        message: format!(
                            "page size must be between 1 and {}, got {}",
                            MAX_PAGE_SIZE, size
                        ),
                    });
                }
                self.page_size = Some(*size);
            }
            QueryOperation::Expand(term) => {
                if self.model.expand_terms.iter().any(|t| t.field == term.field) {
                    return Err(QueryError::not_supported(format!(
                        "{}: '{}' is already expanded",
                        operation, term.field
                    )));
                }
                self.model.expand_terms.push(term.clone());
            }
            QueryOperation::Result(operator) => {
                self.model.result_operator = Some(*operator);
            }
        }
        Ok(())
    }

    fn add_term(&mut self, comparison: &ComparePredicate) -> QueryResult<()> {
        let field = &comparison.field;
        let value = match &comparison.operand {
            Operand::Constant(value) => value.clone(),
            Operand::Field(_) => {
                return Err(QueryError::NonConstantOperand {
                    field: field.clone(),
                });
            }
        };

        let existing = self
            .model
            .where_terms
            .iter()
            .position(|term| term.field() == field);

        let kind = match comparison.op {
            CompareOp::Ne => {
                return Err(QueryError::not_supported(format!(
                    "{} {} {}: not-equal comparisons",
                    field,
                    comparison.op.symbol(),
                    comparison.operand
                )));
            }
            CompareOp::Eq => None,
            CompareOp::StartsWith => Some(MatchKind::StartsWith),
            CompareOp::EndsWith => Some(MatchKind::EndsWith),
            CompareOp::Contains => Some(MatchKind::Contains),
            op if op.is_range() => {
                return match existing.map(|index| &mut self.model.where_terms[index]) {
                    Some(WhereTerm::Range { lower, upper, .. }) => {
                        merge_bound(field, comparison.op, value, lower, upper)
                    }
                    Some(_) => Err(QueryError::MultipleConstraints {
                        field: field.clone(),
                    }),
                    None => {
                        let (mut lower, mut upper) = (None, None);
                        merge_bound(field, comparison.op, value, &mut lower, &mut upper)?;
                        self.model.where_terms.push(WhereTerm::Range {
                            field: field.clone(),
                            lower,
                            upper,
                        });
                        Ok(())
                    }
                };
            }
            _ => None,
        };

        if existing.is_some() {
            return Err(QueryError::MultipleConstraints {
                field: field.clone(),
            });
        }
        let term = match kind {
            None => WhereTerm::Equals {
                field: field.clone(),
                value,
            },
            Some(kind) => WhereTerm::Match {
                field: field.clone(),
                value,
                kind,
            },
        };
        self.model.where_terms.push(term);
        Ok(())
    }

    fn finish(mut self) -> QueryModel {
        self.model.limit = match (self.page_size, self.model.max_items) {
            (_, Some(0)) => self.page_size,
            (Some(size), Some(max)) => Some(size.min(max)),
            (Some(size), None) => Some(size),
            (None, Some(max)) => Some(max.min(MAX_PAGE_SIZE)),
            (None, None) => None,
        };
        self.model
    }
}

fn merge_bound(
    field: &str,
    op: CompareOp,
    value: QueryValue,
    lower: &mut Option<RangeBound>,
    upper: &mut Option<RangeBound>,
) -> QueryResult<()> {
    let inclusive = matches!(op, CompareOp::Gte | CompareOp::Lte);
    let (slot, bound) = match op {
        CompareOp::Gt | CompareOp::Gte => (lower, "lower"),
        _ => (upper, "upper"),
    };
    if slot.is_some() {
        return Err(QueryError::RangeCollision {
            field: field.to_string(),
            bound,
        });
    }
    *slot = Some(RangeBound { value, inclusive });
    Ok(())
}

/// Collect the comparisons of a conjunction.
fn flatten<'a>(predicate: &'a Predicate, out: &mut Vec<&'a ComparePredicate>) -> QueryResult<()> {
    match predicate {
        Predicate::Compare(comparison) => {
            out.push(comparison);
            Ok(())
        }
        Predicate::And(left, right) => {
            flatten(left, out)?;
            flatten(right, out)
        }
        Predicate::Or(..) => Err(QueryError::not_supported(format!(
            "{}: disjunctions",
            predicate
        ))),
        Predicate::Not(..) => Err(QueryError::not_supported(format!(
            "{}: negations",
            predicate
        ))),
    }
}
