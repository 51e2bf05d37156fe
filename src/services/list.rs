//! List controller: cache-first page loads with look-ahead prefetch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::domain::customer::Customer;
use crate::domain::filter::FilterState;
use crate::domain::page::PageResult;
use crate::repository::CustomerReader;
use crate::services::ServiceResult;
use crate::services::cache::{CacheKey, ListCache};
use crate::services::fetcher::{FullDatasetFetcher, PageFetcher};

/// Page sizes offered in the UI.
pub const PAGE_SIZE_OPTIONS: [usize; 6] = [10, 25, 50, 100, 500, 1000];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Falls back to [`DEFAULT_PAGE_SIZE`] for anything not in [`PAGE_SIZE_OPTIONS`].
pub fn normalize_page_size(page_size: Option<usize>) -> usize {
    page_size
        .filter(|size| PAGE_SIZE_OPTIONS.contains(size))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Filters plus the requested page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: FilterState,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new(filters: FilterState, page: usize, page_size: usize) -> Self {
        Self {
            filters,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::build(&self.filters, self.page, self.page_size)
    }

    fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Result of a tracked load.
#[derive(Clone, Debug, PartialEq)]
pub enum PageLoad {
    Current(Arc<PageResult>),
    /// A newer query was issued while this one was in flight.
    Superseded,
}

impl PageLoad {
    pub fn into_current(self) -> Option<Arc<PageResult>> {
        match self {
            PageLoad::Current(page) => Some(page),
            PageLoad::Superseded => None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one [`ListCache`] and answers "page N under the current filters".
///
/// [`ListController::load`] is stateless and is what HTTP handlers call, so
/// concurrent users never share a view. The held view (`set_filters`,
/// `set_search`, `set_query`, `load_page`) and [`PageLoad::Superseded`] serve a
/// single-user embedding such as a desktop shell or a batch tool, where one
/// caller owns the controller.
pub struct ListController<R> {
    cache: Arc<ListCache>,
    pages: PageFetcher<R>,
    full: FullDatasetFetcher<R>,
    view: Mutex<ListQuery>,
    latest: Mutex<Option<CacheKey>>,
    prefetches: Mutex<Vec<JoinHandle<()>>>,
}

impl<R> ListController<R>
where
    R: CustomerReader + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            cache: Arc::new(ListCache::new()),
            pages: PageFetcher::new(Arc::clone(&repo)),
            full: FullDatasetFetcher::new(repo),
            view: Mutex::new(ListQuery::default()),
            latest: Mutex::new(None),
            prefetches: Mutex::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &ListCache {
        &self.cache
    }

    /// Current filters, page and page size.
    pub fn query(&self) -> ListQuery {
        lock(&self.view).clone()
    }

    /// Replaces the filters and returns to the first page.
    pub fn set_filters(&self, filters: FilterState) {
        let mut view = lock(&self.view);
        view.filters = filters;
        view.page = 1;
    }

    /// Expects an already debounced search string.
    pub fn set_search(&self, search: &str) {
        let mut view = lock(&self.view);
        view.filters.search = search.trim().to_string();
        view.page = 1;
    }

    /// Resets search and filters and wipes the cache.
    pub fn clear_filters(&self) {
        {
            let mut view = lock(&self.view);
            view.filters = FilterState::default();
            view.page = 1;
        }
        self.invalidate();
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Loads `page` under the current filters and makes it the current view.
    pub async fn load_page(&self, page: usize, page_size: usize) -> ServiceResult<PageLoad> {
        let query = {
            let mut view = lock(&self.view);
            *view = ListQuery::new(view.filters.clone(), page, page_size);
            view.clone()
        };
        self.load_tracked(query).await
    }

    /// Replaces filters, page and page size in one step and loads the result.
    pub async fn set_query(&self, query: ListQuery) -> ServiceResult<PageLoad> {
        let query = ListQuery::new(query.filters, query.page, query.page_size);
        *lock(&self.view) = query.clone();
        self.load_tracked(query).await
    }

    async fn load_tracked(&self, query: ListQuery) -> ServiceResult<PageLoad> {
        let key = query.key();
        *lock(&self.latest) = Some(key.clone());

        let result = self.load(&query).await;

        if lock(&self.latest).as_ref() != Some(&key) {
            log::debug!("Discarding superseded load of page {}", query.page);
            return Ok(PageLoad::Superseded);
        }
        result.map(PageLoad::Current)
    }

    /// Untracked load: cache hit, or fetch and store. Schedules a prefetch of
    /// the following page either way.
    pub async fn load(&self, query: &ListQuery) -> ServiceResult<Arc<PageResult>> {
        let key = query.key();

        let page = match self.cache.get(&key) {
            Some(hit) => hit,
            None => {
                let seen = self.cache.generation();
                let fetched = self
                    .pages
                    .fetch_page(&query.filters, query.page, query.page_size)
                    .await
                    .map_err(|err| {
                        log::error!("Failed to load page {}: {err}", query.page);
                        err
                    })?;
                let fetched = Arc::new(fetched);
                self.cache.put_if_current(seen, key, Arc::clone(&fetched));
                fetched
            }
        };

        self.schedule_prefetch(query, &page);
        Ok(page)
    }

    fn schedule_prefetch(&self, query: &ListQuery, page: &PageResult) {
        let next = query.next_page();
        if next.page > page.total_pages(query.page_size) {
            return;
        }
        let key = next.key();
        if self.cache.contains(&key) {
            return;
        }

        let cache = Arc::clone(&self.cache);
        let fetcher = self.pages.clone();
        let seen = cache.generation();
        let handle = tokio::spawn(async move {
            match fetcher
                .fetch_page(&next.filters, next.page, next.page_size)
                .await
            {
                Ok(result) => {
                    cache.put_if_current(seen, key, Arc::new(result));
                }
                Err(err) => log::debug!("Prefetch of page {} failed: {err}", next.page),
            }
        });

        let mut handles = lock(&self.prefetches);
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    /// Waits for every prefetch scheduled so far.
    pub async fn drain_prefetches(&self) {
        let handles = std::mem::take(&mut *lock(&self.prefetches));
        for handle in handles {
            if let Err(err) = handle.await {
                log::debug!("Prefetch task ended abnormally: {err}");
            }
        }
    }

    /// Every row matching `filters`, bypassing the page cache.
    pub async fn fetch_all(&self, filters: &FilterState) -> ServiceResult<Vec<Customer>> {
        self.full.fetch_all(filters).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    use super::*;
    use crate::repository::CustomerListQuery;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;

    fn page_of(query: &CustomerListQuery) -> usize {
        query.pagination.as_ref().map(|p| p.page).unwrap_or(0)
    }

    fn result(total_count: usize) -> PageResult {
        PageResult {
            rows: vec![Customer::default()],
            total_count,
            ..PageResult::default()
        }
    }

    #[test]
    fn unknown_page_sizes_fall_back_to_default() {
        assert_eq!(normalize_page_size(Some(50)), 50);
        assert_eq!(normalize_page_size(Some(7)), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(None), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn next_page_saturates_at_the_last_representable_page() {
        let query = ListQuery::new(FilterState::default(), usize::MAX, 10);
        assert_eq!(query.next_page().page, usize::MAX);
        assert_eq!(ListQuery::default().next_page().page, 2);
    }

    #[tokio::test]
    async fn repeated_load_hits_the_cache() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .times(1)
            .returning(|_| Ok(result(3)));

        let controller = ListController::new(Arc::new(repo));
        let first = controller.load_page(1, 10).await.unwrap();
        let second = controller.load_page(1, 10).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(controller.cache().len(), 1);
    }

    #[tokio::test]
    async fn next_page_is_prefetched() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .withf(|q| page_of(q) == 1)
            .times(1)
            .returning(|_| Ok(result(15)));
        repo.expect_list_customers_page()
            .withf(|q| page_of(q) == 2)
            .times(1)
            .returning(|_| Ok(result(15)));

        let controller = ListController::new(Arc::new(repo));
        controller.load_page(1, 10).await.unwrap();
        controller.drain_prefetches().await;

        let next = ListQuery::new(FilterState::default(), 2, 10);
        assert!(controller.cache().contains(&next.key()));
        // Served from the prefetched entry; page 3 is out of range.
        controller.load_page(2, 10).await.unwrap();
        controller.drain_prefetches().await;
    }

    #[tokio::test]
    async fn last_page_does_not_prefetch() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .withf(|q| page_of(q) == 2)
            .times(1)
            .returning(|_| Ok(result(15)));

        let controller = ListController::new(Arc::new(repo));
        controller.load_page(2, 10).await.unwrap();
        controller.drain_prefetches().await;
        assert_eq!(controller.cache().len(), 1);
    }

    #[tokio::test]
    async fn prefetch_failure_leaves_current_page_alone() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .withf(|q| page_of(q) == 1)
            .times(1)
            .returning(|_| Ok(result(30)));
        repo.expect_list_customers_page()
            .withf(|q| page_of(q) == 2)
            .returning(|_| Err(RepositoryError::ConnectionError("offline".into())));

        let controller = ListController::new(Arc::new(repo));
        let load = controller.load_page(1, 10).await.unwrap();
        controller.drain_prefetches().await;

        let page = load.into_current().unwrap();
        assert_eq!(page.total_count, 30);
        assert_eq!(controller.cache().len(), 1);

        let again = controller.load_page(1, 10).await.unwrap();
        assert_eq!(again.into_current().unwrap().total_count, 30);
        controller.drain_prefetches().await;

        // The failed prefetch simply degrades to a miss that errors normally.
        let err = controller.load_page(2, 10).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn failed_fetch_does_not_poison_the_cache() {
        let calls = AtomicUsize::new(0);
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .times(2)
            .returning(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RepositoryError::DatabaseError("locked".into()))
                } else {
                    Ok(result(1))
                }
            });

        let controller = ListController::new(Arc::new(repo));
        assert!(controller.load_page(1, 10).await.is_err());
        assert!(controller.cache().is_empty());
        assert!(controller.load_page(1, 10).await.is_ok());
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .times(2)
            .returning(|_| Ok(result(1)));

        let controller = ListController::new(Arc::new(repo));
        controller.load_page(1, 10).await.unwrap();
        controller.invalidate();
        controller.load_page(1, 10).await.unwrap();
    }

    #[tokio::test]
    async fn filter_changes_reset_to_first_page() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .withf(|q| q.filters.search == "bob" && page_of(q) == 1)
            .times(1)
            .returning(|_| Ok(result(1)));

        let controller = ListController::new(Arc::new(repo));
        controller.set_search("  bob ");
        let view = controller.query();
        assert_eq!(view.page, 1);
        controller.load_page(view.page, 10).await.unwrap();

        controller.clear_filters();
        assert!(controller.query().filters == FilterState::default());
        assert!(controller.cache().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn superseded_load_is_discarded() {
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let mut repo = MockRepository::new();
        repo.expect_list_customers_page()
            .withf(|q| q.filters.search == "old")
            .times(1)
            .returning(move |_| {
                let _ = started_tx.send(());
                let _ = release_rx.recv();
                Ok(result(1))
            });
        repo.expect_list_customers_page()
            .withf(|q| q.filters.search == "new")
            .times(1)
            .returning(|_| Ok(result(2)));

        let controller = Arc::new(ListController::new(Arc::new(repo)));

        let slow = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                let filters = FilterState {
                    search: "old".into(),
                    ..FilterState::default()
                };
                controller.set_query(ListQuery::new(filters, 1, 10)).await
            })
        };
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();

        let filters = FilterState {
            search: "new".into(),
            ..FilterState::default()
        };
        let current = controller
            .set_query(ListQuery::new(filters, 1, 10))
            .await
            .unwrap();
        assert_eq!(current.into_current().unwrap().total_count, 2);

        release_tx.send(()).unwrap();
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale, PageLoad::Superseded);
        assert_eq!(controller.query().filters.search, "new");
    }
}
