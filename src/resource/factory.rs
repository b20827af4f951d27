//! Construction of typed facades.

use super::collection::{
    CollectionPage, ITEMS_PROPERTY, LIMIT_PROPERTY, OFFSET_PROPERTY, SIZE_PROPERTY,
};
use super::data::href_of;
use super::{Resource, ResourceData};
use crate::error::{SdkError, SdkResult};
use crate::serializer::PropertyMap;
use serde_json::Value;

/// Builds typed resource facades over data cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceFactory;

impl ResourceFactory {
    pub fn new() -> Self {
        Self
    }

    /// A new local, unsaved resource.
    pub fn instantiate<T: Resource>(&self) -> T {
        T::instantiate()
    }

    /// Wrap an existing cell as `T`.
    pub fn create<T: Resource>(&self, data: ResourceData) -> T {
        T::from_data(data)
    }

    /// Build a collection page, materializing each item through `materialize`.
    ///
    /// `materialize` receives each item's property map and returns the cell
    /// to wrap; the data store uses it to route items through the identity map.
    pub fn create_page<T, F>(
        &self,
        href: &str,
        mut properties: PropertyMap,
        mut materialize: F,
    ) -> SdkResult<CollectionPage<T>>
    where
        T: Resource,
        F: FnMut(PropertyMap) -> SdkResult<ResourceData>,
    {
        let number = |properties: &PropertyMap, name: &str| -> Option<u64> {
            properties.get(name).and_then(Value::as_u64)
        };

        let offset = number(&properties, OFFSET_PROPERTY).unwrap_or(0) as usize;
        let limit = number(&properties, LIMIT_PROPERTY).unwrap_or(0) as usize;
        let items = match properties.remove(ITEMS_PROPERTY) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(SdkError::invalid_resource(format!(
                    "Collection '{}' has a non-array '{}' property",
                    href, ITEMS_PROPERTY
                )));
            }
        };
        let size = number(&properties, SIZE_PROPERTY).unwrap_or(items.len() as u64);

        let items = items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => materialize(map).map(T::from_data),
                _ => Err(SdkError::invalid_resource(format!(
                    "Collection '{}' contains a non-object item",
                    href
                ))),
            })
            .collect::<SdkResult<Vec<T>>>()?;

        Ok(CollectionPage {
            href: href_of(&properties).unwrap_or_else(|| href.to_string()),
            offset,
            limit,
            size,
            items,
        })
    }
}
