//! Query builder front-end and paged execution.

use super::compiler::compile;
use super::model::{QueryModel, QueryOperation, ResultOperator, SortDirection};
use super::predicate::{Predicate, QueryValue, field};
use super::render::render;
use crate::data_store::DataStore;
use crate::data_store::builder::MAX_PAGE_SIZE;
use crate::error::{SdkError, SdkResult};
use crate::resource::{CollectionPage, ExpandTerm, RequestContext, Resource};
use log::debug;
use std::fmt;
use std::marker::PhantomData;

/// A query over one collection resource.
///
/// Builder methods only record operations; nothing is validated or sent
/// until a terminal method runs. Compilation errors surface as
/// [`SdkError::Query`] before any request is made.
///
/// ```rust,no_run
/// # use idm_client::data_store::DataStore;
/// use idm_client::query::field;
/// use idm_client::resource::{Account, RequestContext, ResourceStatus};
///
/// # async fn example(store: DataStore) -> idm_client::error::SdkResult<()> {
/// let accounts = store
///     .query::<Account>("/directories/7/accounts")
///     .filter(field("status").eq(ResourceStatus::Enabled))
///     .order_by("surname")
///     .take(10)
///     .to_list(&RequestContext::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CollectionQuery<T: Resource> {
    store: DataStore,
    href: String,
    operations: Vec<QueryOperation>,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> CollectionQuery<T> {
    pub(crate) fn new(store: DataStore, href: String) -> Self {
        Self {
            store,
            href,
            operations: Vec::new(),
            _resource: PhantomData,
        }
    }

    fn push(mut self, operation: QueryOperation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Free-text search across the collection's searchable fields.
    pub fn search(self, text: impl Into<String>) -> Self {
        self.push(QueryOperation::Search(text.into()))
    }

    /// Keep only items matching `predicate`.
    pub fn filter(self, predicate: Predicate) -> Self {
        self.push(QueryOperation::Where(predicate))
    }

    pub fn where_eq(self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.filter(field(name).eq(value))
    }

    pub fn where_starts_with(self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.filter(field(name).starts_with(value))
    }

    pub fn where_ends_with(self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.filter(field(name).ends_with(value))
    }

    pub fn where_contains(self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.filter(field(name).contains(value))
    }

    pub fn order_by(self, name: impl Into<String>) -> Self {
        self.push(QueryOperation::OrderBy {
            field: name.into(),
            direction: SortDirection::Ascending,
        })
    }

    pub fn order_by_descending(self, name: impl Into<String>) -> Self {
        self.push(QueryOperation::OrderBy {
            field: name.into(),
            direction: SortDirection::Descending,
        })
    }

    pub fn then_by(self, name: impl Into<String>) -> Self {
        self.push(QueryOperation::ThenBy {
            field: name.into(),
            direction: SortDirection::Ascending,
        })
    }

    pub fn then_by_descending(self, name: impl Into<String>) -> Self {
        self.push(QueryOperation::ThenBy {
            field: name.into(),
            direction: SortDirection::Descending,
        })
    }

    /// Skip the first `count` items.
    pub fn skip(self, count: usize) -> Self {
        self.push(QueryOperation::Skip(count))
    }

    /// Return at most `count` items in total.
    pub fn take(self, count: usize) -> Self {
        self.push(QueryOperation::Take(count))
    }

    /// Items per request, without capping the total.
    pub fn page_size(self, size: usize) -> Self {
        self.push(QueryOperation::PageSize(size))
    }

    /// Embed the linked resource `name` in every item.
    pub fn expand(self, name: impl Into<String>) -> Self {
        self.push(QueryOperation::Expand(ExpandTerm::new(name)))
    }

    pub fn expand_collection(
        self,
        name: impl Into<String>,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Self {
        self.push(QueryOperation::Expand(ExpandTerm::paged(name, offset, limit)))
    }

    /// Collection href the query runs against.
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn operations(&self) -> &[QueryOperation] {
        &self.operations
    }

    pub fn compile(&self) -> SdkResult<QueryModel> {
        Ok(compile(&self.operations)?)
    }

    /// Parameters of the first page request.
    pub fn to_query_params(&self) -> SdkResult<Vec<(String, String)>> {
        Ok(render(&self.compile()?, self.default_limit()))
    }

    fn default_limit(&self) -> usize {
        self.store.config().default_page_size
    }

    fn compile_with(&self, operator: ResultOperator) -> SdkResult<QueryModel> {
        let mut operations = self.operations.clone();
        operations.push(QueryOperation::Result(operator));
        Ok(compile(&operations)?)
    }

    async fn first_page(&self, model: &QueryModel, context: &RequestContext) -> SdkResult<CollectionPage<T>> {
        let params = render(model, self.default_limit());
        self.store.get_collection(&self.href, params, context).await
    }

    /// Page through the results one request at a time.
    pub fn pages(&self) -> SdkResult<PageIterator<T>> {
        let model = self.compile()?;
        Ok(PageIterator::new(
            self.store.clone(),
            self.href.clone(),
            model,
            self.default_limit(),
        ))
    }

    /// Fetch every matching item, page by page.
    pub async fn to_list(&self, context: &RequestContext) -> SdkResult<Vec<T>> {
        let mut pages = self.pages()?;
        let mut items = Vec::new();
        while let Some(page) = pages.next_page(context).await? {
            items.extend(page.into_items());
        }
        debug!(
            "[{}] Query on {} returned {} items in {} requests",
            context.request_id,
            self.href,
            items.len(),
            pages.requests()
        );
        Ok(items)
    }

    /// Whether the collection has at least one matching item.
    pub async fn any(&self, context: &RequestContext) -> SdkResult<bool> {
        let model = self.compile_with(ResultOperator::Any)?;
        if model.selects_nothing() {
            return Ok(false);
        }
        Ok(!self.first_page(&model, context).await?.is_empty())
    }

    /// Server-reported number of matching items.
    pub async fn count(&self, context: &RequestContext) -> SdkResult<usize> {
        let size = self.size(ResultOperator::Count, context).await?;
        usize::try_from(size)
            .map_err(|_| SdkError::invalid_resource(format!("Collection size {} overflows usize", size)))
    }

    pub async fn long_count(&self, context: &RequestContext) -> SdkResult<u64> {
        self.size(ResultOperator::LongCount, context).await
    }

    async fn size(&self, operator: ResultOperator, context: &RequestContext) -> SdkResult<u64> {
        let model = self.compile_with(operator)?;
        Ok(self.first_page(&model, context).await?.size)
    }

    /// First matching item.
    ///
    /// # Errors
    /// [`SdkError::EmptySequence`] when nothing matches.
    pub async fn first(&self, context: &RequestContext) -> SdkResult<T> {
        self.select_first(false, context)
            .await?
            .ok_or(SdkError::EmptySequence)
    }

    pub async fn first_or_default(&self, context: &RequestContext) -> SdkResult<Option<T>> {
        self.select_first(true, context).await
    }

    async fn select_first(&self, default_if_empty: bool, context: &RequestContext) -> SdkResult<Option<T>> {
        let model = self.compile_with(ResultOperator::First { default_if_empty })?;
        if model.selects_nothing() {
            return Ok(None);
        }
        let page = self.first_page(&model, context).await?;
        Ok(page.into_items().into_iter().next())
    }

    /// The only matching item.
    ///
    /// # Errors
    /// [`SdkError::EmptySequence`] when nothing matches and
    /// [`SdkError::MoreThanOneElement`] when several items do.
    pub async fn single(&self, context: &RequestContext) -> SdkResult<T> {
        self.select_single(false, context)
            .await?
            .ok_or(SdkError::EmptySequence)
    }

    /// Like [`single`](Self::single) but `None` when nothing matches.
    pub async fn single_or_default(&self, context: &RequestContext) -> SdkResult<Option<T>> {
        self.select_single(true, context).await
    }

    async fn select_single(&self, default_if_empty: bool, context: &RequestContext) -> SdkResult<Option<T>> {
        let model = self.compile_with(ResultOperator::Single { default_if_empty })?;
        if model.selects_nothing() {
            return Ok(None);
        }
        let page = self.first_page(&model, context).await?;
        if page.len() > 1 || page.size > 1 {
            return Err(SdkError::MoreThanOneElement);
        }
        Ok(page.into_items().into_iter().next())
    }
}

impl<T: Resource> fmt::Debug for CollectionQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionQuery")
            .field("type", &T::TYPE_NAME)
            .field("href", &self.href)
            .field("operations", &self.operations)
            .finish()
    }
}

/// Sequential page fetcher for a compiled query.
///
/// Stops after a short page or once the query's `take` cap is reached.
pub struct PageIterator<T: Resource> {
    store: DataStore,
    href: String,
    model: QueryModel,
    page_size: usize,
    next_offset: usize,
    remaining: Option<usize>,
    requests: usize,
    done: bool,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> PageIterator<T> {
    fn new(store: DataStore, href: String, model: QueryModel, default_limit: usize) -> Self {
        let page_size = model.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Self {
            store,
            href,
            next_offset: model.offset.unwrap_or(0),
            remaining: model.max_items,
            page_size,
            model,
            requests: 0,
            done: false,
            _resource: PhantomData,
        }
    }

    /// Fetch the next page, or `None` once the results are exhausted.
    pub async fn next_page(&mut self, context: &RequestContext) -> SdkResult<Option<CollectionPage<T>>> {
        if self.done || self.remaining == Some(0) {
            self.done = true;
            return Ok(None);
        }

        let mut model = self.model.clone();
        model.offset = Some(self.next_offset);
        model.limit = Some(self.page_size);
        let params = render(&model, self.page_size);

        let mut page: CollectionPage<T> = self.store.get_collection(&self.href, params, context).await?;
        self.requests += 1;

        // The server may cap the limit below what was asked for.
        if page.limit > 0 && page.limit < self.page_size {
            debug!(
                "[{}] Server capped page size for {} at {}",
                context.request_id, self.href, page.limit
            );
            self.page_size = page.limit;
        }

        let fetched = page.items.len();
        if fetched < self.page_size {
            self.done = true;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            page.items.truncate(*remaining);
            *remaining -= page.items.len();
            if *remaining == 0 {
                self.done = true;
            }
        }
        self.next_offset += fetched;
        Ok(Some(page))
    }

    /// Whether the last page has been returned.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of page requests sent so far.
    pub fn requests(&self) -> usize {
        self.requests
    }
}
