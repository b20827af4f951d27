//! Resource data cells.
//!
//! A [`ResourceData`] is the mutable property bag behind one materialized
//! resource. Cloning a `ResourceData` clones the handle, not the state: every
//! facade sharing a cell sees the same properties, which is what lets the
//! identity map hand out one logical instance per href.

use crate::serializer::PropertyMap;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Property holding the resource's canonical URL.
pub const HREF_PROPERTY: &str = "href";

#[derive(Debug, Default)]
struct CellState {
    href: Option<String>,
    properties: PropertyMap,
    dirty: BTreeSet<String>,
}

/// Shared handle to a resource's locally known state.
#[derive(Clone, Default)]
pub struct ResourceData {
    cell: Arc<RwLock<CellState>>,
}

impl ResourceData {
    /// A local cell with no href, as created by `instantiate`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell holding server state; the href is read from the map.
    pub fn from_properties(properties: PropertyMap) -> Self {
        let href = href_of(&properties);
        Self {
            cell: Arc::new(RwLock::new(CellState {
                href,
                properties,
                dirty: BTreeSet::new(),
            })),
        }
    }

    /// A link placeholder knowing only its href.
    pub fn from_href(href: impl Into<String>) -> Self {
        let href = href.into();
        let mut properties = PropertyMap::new();
        properties.insert(HREF_PROPERTY.to_string(), Value::String(href));
        Self::from_properties(properties)
    }

    pub fn href(&self) -> Option<String> {
        self.cell.read().href.clone()
    }

    /// Snapshot of all properties.
    pub fn properties(&self) -> PropertyMap {
        self.cell.read().properties.clone()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.cell.read().properties.get(name).cloned()
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.cell.read().properties.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.cell.read().properties.get(name)?.as_i64()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.cell.read().properties.get(name)?.as_bool()
    }

    /// Read an RFC 3339 timestamp property.
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.get_string(name)?;
        DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The href of a link placeholder property, if `name` holds one.
    pub fn link(&self, name: &str) -> Option<String> {
        self.cell
            .read()
            .properties
            .get(name)?
            .as_object()
            .and_then(href_of)
    }

    /// Set a property and mark it dirty.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let mut state = self.cell.write();
        state.properties.insert(name.clone(), value.into());
        state.dirty.insert(name);
    }

    /// Point `name` at another resource.
    pub fn set_link(&self, name: impl Into<String>, href: impl Into<String>) {
        let mut link = PropertyMap::new();
        link.insert(HREF_PROPERTY.to_string(), Value::String(href.into()));
        self.set(name, Value::Object(link));
    }

    pub fn is_dirty(&self) -> bool {
        !self.cell.read().dirty.is_empty()
    }

    pub fn dirty_properties(&self) -> Vec<String> {
        self.cell.read().dirty.iter().cloned().collect()
    }

    /// Whether the cell holds anything besides its href.
    pub fn is_materialized(&self) -> bool {
        self.cell
            .read()
            .properties
            .keys()
            .any(|key| key != HREF_PROPERTY)
    }

    /// Replace the whole state with fresh server data and clear dirty flags.
    pub fn refresh(&self, properties: PropertyMap) {
        let mut state = self.cell.write();
        if let Some(href) = href_of(&properties) {
            state.href = Some(href);
        }
        state.properties = properties;
        state.dirty.clear();
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &ResourceData) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for ResourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.cell.read();
        f.debug_struct("ResourceData")
            .field("href", &state.href)
            .field("properties", &state.properties.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}

/// Extract the href from a property map.
pub fn href_of(properties: &PropertyMap) -> Option<String> {
    properties
        .get(HREF_PROPERTY)
        .and_then(Value::as_str)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Whether `properties` is a bare link (an href and nothing else).
pub fn is_link(properties: &PropertyMap) -> bool {
    properties.len() == 1 && href_of(properties).is_some()
}
