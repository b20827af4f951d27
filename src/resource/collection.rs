//! Collection pages.

use super::Resource;

/// Property holding the server-reported collection size.
pub const SIZE_PROPERTY: &str = "size";
pub const ITEMS_PROPERTY: &str = "items";
pub const OFFSET_PROPERTY: &str = "offset";
pub const LIMIT_PROPERTY: &str = "limit";

/// One page of a collection resource.
#[derive(Debug, Clone)]
pub struct CollectionPage<T: Resource> {
    pub href: String,
    pub offset: usize,
    pub limit: usize,
    /// Total number of items in the whole collection, as reported by the server.
    pub size: u64,
    pub items: Vec<T>,
}

impl<T: Resource> CollectionPage<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether more items exist past this page.
    pub fn has_more(&self) -> bool {
        ((self.offset + self.items.len()) as u64) < self.size
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
