//! Response options: link expansion directives.

use std::fmt;

/// A directive to embed a linked resource or collection in the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandTerm {
    pub field: String,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ExpandTerm {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            offset: None,
            limit: None,
        }
    }

    /// Expand a collection link, paging the embedded items.
    pub fn paged(field: impl Into<String>, offset: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            field: field.into(),
            offset,
            limit,
        }
    }
}

impl fmt::Display for ExpandTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)?;
        let mut paging = Vec::new();
        if let Some(offset) = self.offset {
            paging.push(format!("offset:{}", offset));
        }
        if let Some(limit) = self.limit {
            paging.push(format!("limit:{}", limit));
        }
        if !paging.is_empty() {
            write!(f, "({})", paging.join(","))?;
        }
        Ok(())
    }
}

/// Options altering how a single resource is retrieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    expansions: Vec<ExpandTerm>,
}

impl ResponseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed the linked resource `field`.
    pub fn expand(mut self, field: impl Into<String>) -> Self {
        self.expansions.push(ExpandTerm::new(field));
        self
    }

    /// Embed a page of the linked collection `field`.
    pub fn expand_collection(
        mut self,
        field: impl Into<String>,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Self {
        self.expansions
            .push(ExpandTerm::paged(field, offset, limit));
        self
    }

    pub fn expansions(&self) -> &[ExpandTerm] {
        &self.expansions
    }

    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Query parameters for these options.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        if self.expansions.is_empty() {
            return Vec::new();
        }
        vec![("expand".to_string(), render_expansions(&self.expansions))]
    }
}

/// Join expand terms into the `expand` parameter value.
pub fn render_expansions(terms: &[ExpandTerm]) -> String {
    terms
        .iter()
        .map(ExpandTerm::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
