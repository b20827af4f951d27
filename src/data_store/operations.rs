//! Resource operations of the data store.

use super::core::DataStore;
use crate::cache::region_for_type;
use crate::error::{SdkError, SdkResult};
use crate::filter::{ResourceAction, ResourceRequest};
use crate::query::CollectionQuery;
use crate::resource::{CollectionPage, RequestContext, Resource, ResponseOptions};
use log::{debug, trace};

impl DataStore {
    /// A new local resource with no href. Nothing is sent until it is saved.
    pub fn instantiate<T: Resource>(&self) -> T {
        self.inner.factory.instantiate()
    }

    /// Fetch the resource at `href`.
    ///
    /// The identity map is consulted first, then the cache region of `T`,
    /// then the network.
    pub async fn get_resource<T: Resource>(
        &self,
        href: &str,
        context: &RequestContext,
    ) -> SdkResult<T> {
        self.ensure_live()?;
        let href = self.qualify(href);

        if let Some(data) = self.inner.identity_map.get(&href)? {
            if data.is_materialized() {
                trace!("[{}] Identity map hit for {}", context.request_id, href);
                return Ok(self.inner.factory.create(data));
            }
        }

        let request = ResourceRequest::new(ResourceAction::Get, T::TYPE_NAME, href.clone(), context);
        let response = self.send(request).await?;
        let data = self.materialize(response.body, Some(&href), T::STORE_INFINITELY)?;
        Ok(self.inner.factory.create(data))
    }

    /// Fetch the resource at `href` with expansions.
    ///
    /// Expanded requests always reach the server; the embedded resources they
    /// return are cached in their own regions.
    pub async fn get_resource_with_options<T: Resource>(
        &self,
        href: &str,
        options: &ResponseOptions,
        context: &RequestContext,
    ) -> SdkResult<T> {
        if options.is_empty() {
            return self.get_resource(href, context).await;
        }
        self.ensure_live()?;
        let href = self.qualify(href);

        let request = ResourceRequest::new(ResourceAction::Get, T::TYPE_NAME, href.clone(), context)
            .with_query(options.to_query_params());
        let response = self.send(request).await?;
        let data = self.materialize(response.body, Some(&href), T::STORE_INFINITELY)?;
        Ok(self.inner.factory.create(data))
    }

    /// Follow the link stored in `property` of `resource`.
    ///
    /// Returns `None` when the property is absent or not a link.
    pub async fn get_linked<T: Resource, R: Resource>(
        &self,
        resource: &R,
        property: &str,
        context: &RequestContext,
    ) -> SdkResult<Option<T>> {
        match resource.data().link(property) {
            Some(href) => self.get_resource(&href, context).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetch one page of the collection at `href`.
    ///
    /// Items are routed through the identity map, so an item already live
    /// in memory is returned as that same instance.
    pub async fn get_collection<T: Resource>(
        &self,
        href: &str,
        params: Vec<(String, String)>,
        context: &RequestContext,
    ) -> SdkResult<CollectionPage<T>> {
        self.ensure_live()?;
        let href = self.qualify(href);

        let request =
            ResourceRequest::new(ResourceAction::Get, T::TYPE_NAME, href.clone(), context).with_query(params);
        let response = self.send(request).await?;

        let page = self.inner.factory.create_page(&href, response.body, |item| {
            self.materialize(item, None, T::STORE_INFINITELY)
        })?;
        trace!(
            "[{}] Page of {} at offset {}: {} of {} items",
            context.request_id,
            href,
            page.offset,
            page.items.len(),
            page.size
        );
        Ok(page)
    }

    /// Create `resource` under the collection at `parent_href`.
    ///
    /// On success the resource's cell is refreshed with the server state
    /// (including its new href) and registered in the identity map.
    pub async fn create<T: Resource>(
        &self,
        parent_href: &str,
        resource: &T,
        context: &RequestContext,
    ) -> SdkResult<T> {
        self.create_with_options(parent_href, resource, &ResponseOptions::new(), context)
            .await
    }

    pub async fn create_with_options<T: Resource>(
        &self,
        parent_href: &str,
        resource: &T,
        options: &ResponseOptions,
        context: &RequestContext,
    ) -> SdkResult<T> {
        self.ensure_live()?;
        let parent_href = self.qualify(parent_href);

        let request =
            ResourceRequest::new(ResourceAction::Create, T::TYPE_NAME, parent_href.clone(), context)
                .with_query(options.to_query_params())
                .with_body(resource.data().properties());
        let response = self.send(request).await?;

        resource.data().refresh(response.body);
        if resource.href().is_none() {
            return Err(SdkError::invalid_resource(format!(
                "Server response for new resource under {} has no href",
                parent_href
            )));
        }
        let data = self.adopt(resource.data(), T::STORE_INFINITELY)?;
        debug!(
            "[{}] Created {} {}",
            context.request_id,
            T::TYPE_NAME,
            data.href().unwrap_or_default()
        );
        Ok(self.inner.factory.create(data))
    }

    /// Persist `resource`.
    ///
    /// A resource without href is created in the top-level collection of
    /// its type. Otherwise its full property set is POSTed to its href.
    pub async fn save<T: Resource>(&self, resource: &T, context: &RequestContext) -> SdkResult<T> {
        self.ensure_live()?;
        let Some(href) = resource.href() else {
            let collection = format!("/{}", region_for_type(T::TYPE_NAME));
            return self.create(&collection, resource, context).await;
        };
        let href = self.qualify(&href);

        let request = ResourceRequest::new(ResourceAction::Update, T::TYPE_NAME, href.clone(), context)
            .with_body(resource.data().properties());
        let response = self.send(request).await?;

        resource.data().refresh(response.body);
        let data = self.adopt(resource.data(), T::STORE_INFINITELY)?;
        debug!("[{}] Saved {} {}", context.request_id, T::TYPE_NAME, href);
        Ok(self.inner.factory.create(data))
    }

    /// Delete `resource` on the server and evict it from both tiers.
    ///
    /// Embedded or dependent resources are not evicted.
    pub async fn delete<T: Resource>(&self, resource: &T, context: &RequestContext) -> SdkResult<bool> {
        self.ensure_live()?;
        let href = resource
            .href()
            .map(|href| self.qualify(&href))
            .ok_or_else(|| SdkError::invalid_resource("Cannot delete a resource that has no href"))?;

        let request = ResourceRequest::new(ResourceAction::Delete, T::TYPE_NAME, href.clone(), context);
        let response = self.send(request).await?;

        self.inner.identity_map.remove(&href)?;
        debug!("[{}] Deleted {} {}", context.request_id, T::TYPE_NAME, href);
        Ok(response.is_success())
    }

    /// Start a query over the collection at `href`.
    pub fn query<T: Resource>(&self, href: &str) -> CollectionQuery<T> {
        CollectionQuery::new(self.clone(), self.qualify(href))
    }
}
