//! Rendering of a compiled [`QueryModel`] into query parameters.
//!
//! Parameters come out in a fixed order: `q`, `offset`, `limit`, one
//! parameter per where-term, `orderBy`, `expand`.

use super::model::{MatchKind, QueryModel, RangeBound, SortDirection, WhereTerm};
use crate::resource::options::render_expansions;

/// Render `model`. `default_limit` is used when the model sets no page size.
pub fn render(model: &QueryModel, default_limit: usize) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(filter) = &model.filter {
        params.push(("q".to_string(), filter.clone()));
    }
    if let Some(offset) = model.offset.filter(|offset| *offset > 0) {
        params.push(("offset".to_string(), offset.to_string()));
    }
    params.push((
        "limit".to_string(),
        model.limit.unwrap_or(default_limit).to_string(),
    ));

    for term in &model.where_terms {
        params.push((term.field().to_string(), render_term(term)));
    }

    if !model.order_by_terms.is_empty() {
        let order_by = model
            .order_by_terms
            .iter()
            .map(|term| match term.direction {
                SortDirection::Ascending => term.field.clone(),
                SortDirection::Descending => format!("{} desc", term.field),
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("orderBy".to_string(), order_by));
    }

    if !model.expand_terms.is_empty() {
        params.push(("expand".to_string(), render_expansions(&model.expand_terms)));
    }

    params
}

/// Render `model` as a form-encoded query string.
pub fn to_query_string(model: &QueryModel, default_limit: usize) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(render(model, default_limit))
        .finish()
}

fn render_term(term: &WhereTerm) -> String {
    match term {
        WhereTerm::Equals { value, .. } => value.to_string(),
        WhereTerm::Match { value, kind, .. } => match kind {
            MatchKind::StartsWith => format!("{}*", value),
            MatchKind::EndsWith => format!("*{}", value),
            MatchKind::Contains => format!("*{}*", value),
        },
        WhereTerm::Range { lower, upper, .. } => {
            let (open, low) = bound(lower.as_ref(), '[', '(');
            let (close, high) = bound(upper.as_ref(), ']', ')');
            format!("{}{},{}{}", open, low, high, close)
        }
    }
}

fn bound(side: Option<&RangeBound>, inclusive_mark: char, exclusive_mark: char) -> (char, String) {
    match side {
        Some(RangeBound { value, inclusive: true }) => (inclusive_mark, value.to_string()),
        Some(RangeBound { value, inclusive: false }) => (exclusive_mark, value.to_string()),
        None => (inclusive_mark, String::new()),
    }
}
