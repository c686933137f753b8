//! Search + pagination reconciliation for resource list screens.
//!
//! A [`ListController`] owns a paginated "all items" query and a search
//! query that only exists while the debounced search term is non-empty.
//! It folds both into one [`ListView`]: an empty term shows the paginated
//! list, a non-empty term shows the search result, replaced wholesale once
//! it resolves.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use upbreed_client::{ApiError, ClientConfig};
use upbreed_core::pagination::{ListResponse, PageRequest, DEFAULT_PAGE_LIMIT};
use upbreed_core::query_key::{KeyFilter, QueryKey};

use crate::cache::{fetcher, QueryCache, QueryObserver};
use crate::debounce::Debounced;
use crate::state::Loadable;

/// Default quiet period before a typed search term is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Where a list screen gets its rows from.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    fn all_key(&self, page: PageRequest) -> QueryKey;

    fn search_key(&self, page: PageRequest, term: &str) -> QueryKey;

    async fn fetch_all(&self, page: PageRequest) -> Result<ListResponse<Self::Item>, ApiError>;

    async fn fetch_search(
        &self,
        page: PageRequest,
        term: &str,
    ) -> Result<ListResponse<Self::Item>, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: u32,
    pub debounce: Duration,
}

impl ListOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            limit: config.page_limit,
            debounce: config.search_debounce,
        }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

/// The rows currently shown.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveList<T> {
    Items(Vec<T>),
    /// Nothing to show; `search_term` is set when a search came back empty.
    Empty { search_term: Option<String> },
}

impl<T> ActiveList<T> {
    fn from_rows(rows: Vec<T>, search_term: Option<&str>) -> Self {
        if rows.is_empty() {
            Self::Empty {
                search_term: search_term.map(str::to_string),
            }
        } else {
            Self::Items(rows)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Items(items) => items,
            Self::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Headline of the empty state, e.g. `No Instructor Found`.
    pub fn empty_title(&self, noun: &str) -> Option<String> {
        match self {
            Self::Items(_) => None,
            Self::Empty {
                search_term: Some(term),
            } => Some(format!(
                "{noun} \"{term}\" not found! Kindly check your spelling and try again or..."
            )),
            Self::Empty { search_term: None } => Some(format!("No {noun} Found")),
        }
    }
}

/// Everything a list screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub state: Loadable<ActiveList<T>>,
    /// The debounced, trimmed term in effect.
    pub search_term: String,
    pub page: u32,
    /// Last page of the active source; 1 until it has loaded.
    pub last_page: u32,
}

impl<T> ListView<T> {
    fn initial() -> Self {
        Self {
            state: Loadable::Pending,
            search_term: String::new(),
            page: 1,
            last_page: 1,
        }
    }

    pub fn items(&self) -> &[T] {
        self.state.ready().map(ActiveList::items).unwrap_or(&[])
    }

    /// Pagination is shown only under a non-empty list.
    pub fn show_pagination(&self) -> bool {
        matches!(self.state, Loadable::Ready(ActiveList::Items(_)))
    }
}

#[derive(Debug)]
enum Command {
    Search(String),
    Page(u32),
    Retry,
}

/// Handle to a running list controller. Dropping it unmounts the list.
pub struct ListController<T> {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ListView<T>>,
    cancel: CancellationToken,
}

impl<T> ListController<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn spawn<S>(cache: QueryCache, source: Arc<S>, options: ListOptions) -> Self
    where
        S: ListSource<Item = T>,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(ListView::initial());
        let cancel = CancellationToken::new();

        let task = ListTask {
            all: observe_all(&cache, &source, PageRequest::new(1, options.limit)),
            cache,
            source,
            limit: options.limit,
            search: Debounced::new(options.debounce),
            term: String::new(),
            page: 1,
            searched: None,
            view: view_tx,
        };
        tokio::spawn(task.run(rx, cancel.clone()));

        Self {
            commands,
            view,
            cancel,
        }
    }

    /// Feed the raw search box text. Applied after the debounce period.
    pub fn set_search(&self, raw: impl Into<String>) {
        self.send(Command::Search(raw.into()));
    }

    pub fn set_page(&self, page: u32) {
        self.send(Command::Page(page));
    }

    /// Invalidate the active query so its observer re-fetches.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    pub fn view(&self) -> watch::Receiver<ListView<T>> {
        self.view.clone()
    }

    pub fn current(&self) -> ListView<T> {
        self.view.borrow().clone()
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("List controller already stopped");
        }
    }
}

impl<T> Drop for ListController<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ListTask<S: ListSource> {
    cache: QueryCache,
    source: Arc<S>,
    limit: u32,
    search: Debounced<String>,
    term: String,
    page: u32,
    all: QueryObserver<ListResponse<S::Item>>,
    searched: Option<QueryObserver<ListResponse<S::Item>>>,
    view: watch::Sender<ListView<S::Item>>,
}

impl<S: ListSource> ListTask<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        loop {
            self.publish();

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(Command::Search(raw)) => self.search.push(raw.trim().to_string()),
                    Some(Command::Page(page)) => self.change_page(page),
                    Some(Command::Retry) => self.retry(),
                    None => break,
                },
                term = self.search.settled() => self.apply_term(term),
                _ = changed(&mut self.all) => {}
                _ = changed_opt(self.searched.as_mut()) => {}
            }
        }
        tracing::debug!("List controller stopped");
    }

    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    fn apply_term(&mut self, term: String) {
        if term == self.term {
            return;
        }
        tracing::debug!(term = %term, "Search term settled");
        self.term = term;
        self.searched = (!self.term.is_empty())
            .then(|| observe_search(&self.cache, &self.source, self.request(), &self.term));
    }

    fn change_page(&mut self, page: u32) {
        let page = page.max(1);
        if page == self.page {
            return;
        }
        self.page = page;
        self.all = observe_all(&self.cache, &self.source, self.request());
        if !self.term.is_empty() {
            self.searched = Some(observe_search(&self.cache, &self.source, self.request(), &self.term));
        }
    }

    /// Invalidate the active source, plus the other one if it is the one
    /// that failed.
    fn retry(&self) {
        let active = match &self.searched {
            Some(searched) => searched,
            None => &self.all,
        };
        self.cache
            .invalidate_because(KeyFilter::exact(active.key()), "retry");
        if self.searched.is_some() && self.all.current().is_error() {
            self.cache
                .invalidate_because(KeyFilter::exact(self.all.key()), "retry");
        }
    }

    fn publish(&self) {
        let all = self.all.current();
        let (state, last_page) = match &self.searched {
            None => {
                let last_page = all.ready().map(|r| r.metadata.last_page);
                (all.map(|r| ActiveList::from_rows(r.data, None)), last_page)
            }
            Some(searched) => match (all, searched.current()) {
                (Loadable::Error(e), _) | (_, Loadable::Error(e)) => (Loadable::Error(e), None),
                (_, Loadable::Ready(r)) => {
                    let last_page = Some(r.metadata.last_page);
                    (
                        Loadable::Ready(ActiveList::from_rows(r.data, Some(&self.term))),
                        last_page,
                    )
                }
                (_, Loadable::Pending) => (Loadable::Pending, None),
            },
        };

        let previous_last_page = self.view.borrow().last_page;
        self.view.send_replace(ListView {
            state,
            search_term: self.term.clone(),
            page: self.page,
            last_page: last_page.unwrap_or(previous_last_page).max(1),
        });
    }
}

fn observe_all<S: ListSource>(
    cache: &QueryCache,
    source: &Arc<S>,
    page: PageRequest,
) -> QueryObserver<ListResponse<S::Item>> {
    let src = source.clone();
    cache.observe(
        source.all_key(page),
        fetcher(move || {
            let src = src.clone();
            async move { src.fetch_all(page).await }
        }),
    )
}

fn observe_search<S: ListSource>(
    cache: &QueryCache,
    source: &Arc<S>,
    page: PageRequest,
    term: &str,
) -> QueryObserver<ListResponse<S::Item>> {
    let src = source.clone();
    let term = term.to_string();
    cache.observe(
        source.search_key(page, &term),
        fetcher(move || {
            let src = src.clone();
            let term = term.clone();
            async move { src.fetch_search(page, &term).await }
        }),
    )
}

async fn changed<T>(observer: &mut QueryObserver<T>)
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    if !observer.changed().await {
        std::future::pending::<()>().await;
    }
}

async fn changed_opt<T>(observer: Option<&mut QueryObserver<T>>)
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    match observer {
        Some(observer) => changed(observer).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use upbreed_core::pagination::paginate;
    use upbreed_core::query_key::Resource;
    use upbreed_events::InvalidationBus;

    use super::*;
    use crate::error::FetchError;

    /// In-memory source over a list of names.
    struct Names {
        rows: Mutex<Vec<String>>,
        fail_all: Mutex<bool>,
        all_calls: AtomicUsize,
        search_calls: AtomicUsize,
    }

    impl Names {
        fn new(count: usize) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new((1..=count).map(|i| format!("name-{i}")).collect()),
                fail_all: Mutex::new(false),
                all_calls: AtomicUsize::new(0),
                search_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ListSource for Names {
        type Item = String;

        fn all_key(&self, page: PageRequest) -> QueryKey {
            QueryKey::new(Resource::Instructors)
                .with("page", Some(page.page))
                .with("limit", Some(page.limit))
        }

        fn search_key(&self, page: PageRequest, term: &str) -> QueryKey {
            self.all_key(page).with("search", Some(term))
        }

        async fn fetch_all(&self, page: PageRequest) -> Result<ListResponse<String>, ApiError> {
            self.all_calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_all.lock().unwrap() {
                return Err(ApiError::Status {
                    status: 500,
                    body: "down".into(),
                });
            }
            Ok(paginate(&self.rows.lock().unwrap(), page))
        }

        async fn fetch_search(
            &self,
            page: PageRequest,
            term: &str,
        ) -> Result<ListResponse<String>, ApiError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let hits: Vec<String> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.contains(term))
                .cloned()
                .collect();
            Ok(paginate(&hits, page))
        }
    }

    fn controller(source: Arc<Names>) -> (ListController<String>, QueryCache) {
        let cache = QueryCache::new(Arc::new(InvalidationBus::default()));
        let options = ListOptions {
            limit: 9,
            debounce: Duration::from_millis(1000),
        };
        (ListController::spawn(cache.clone(), source, options), cache)
    }

    async fn ready(view: &mut watch::Receiver<ListView<String>>) -> ListView<String> {
        view.wait_for(|v| !v.state.is_pending()).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn empty_term_shows_paginated_list() {
        let source = Names::new(20);
        let (list, _) = controller(source.clone());
        let mut view = list.view();

        let shown = ready(&mut view).await;
        assert_eq!(shown.items().len(), 9);
        assert_eq!(shown.last_page, 3);
        assert!(shown.show_pagination());
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn search_waits_for_debounce_then_replaces_list() {
        let source = Names::new(20);
        let (list, _) = controller(source.clone());
        let mut view = list.view();
        ready(&mut view).await;

        list.set_search("  name-1");
        list.set_search("  name-2 ");
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(list.current().search_term, "");

        let shown = view
            .wait_for(|v| v.search_term == "name-2" && v.state.ready().is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(shown.items(), ["name-2", "name-20"]);
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_search_result_has_search_title() {
        let source = Names::new(3);
        let (list, _) = controller(source);
        let mut view = list.view();
        ready(&mut view).await;

        list.set_search("zzz");
        let shown = view
            .wait_for(|v| v.search_term == "zzz" && !v.state.is_pending())
            .await
            .unwrap()
            .clone();
        let active = shown.state.ready().unwrap();
        assert_eq!(
            active.empty_title("Instructor").unwrap(),
            "Instructor \"zzz\" not found! Kindly check your spelling and try again or..."
        );
        assert!(!shown.show_pagination());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_catalog_has_plain_title() {
        let (list, _) = controller(Names::new(0));
        let mut view = list.view();
        let shown = ready(&mut view).await;
        assert_eq!(
            shown.state.ready().unwrap().empty_title("Instructor").unwrap(),
            "No Instructor Found"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_search_returns_to_all_items() {
        let source = Names::new(20);
        let (list, _) = controller(source);
        let mut view = list.view();
        ready(&mut view).await;

        list.set_search("name-7");
        view.wait_for(|v| v.search_term == "name-7" && v.state.ready().is_some())
            .await
            .unwrap();
        list.set_search("   ");
        let shown = view
            .wait_for(|v| v.search_term.is_empty() && v.state.ready().is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(shown.items().len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn page_two_shows_items_ten_to_eighteen() {
        let (list, _) = controller(Names::new(20));
        let mut view = list.view();
        ready(&mut view).await;

        list.set_page(2);
        let shown = view
            .wait_for(|v| v.page == 2 && v.state.ready().is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(shown.items().first().map(String::as_str), Some("name-10"));
        assert_eq!(shown.items().last().map(String::as_str), Some("name-18"));
    }

    #[tokio::test(start_paused = true)]
    async fn error_then_retry_recovers() {
        let source = Names::new(5);
        *source.fail_all.lock().unwrap() = true;
        let (list, _) = controller(source.clone());
        let mut view = list.view();

        let shown = ready(&mut view).await;
        assert_eq!(shown.state.error().and_then(FetchError::status), Some(500));

        *source.fail_all.lock().unwrap() = false;
        list.retry();
        let shown = view
            .wait_for(|v| v.state.ready().is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(shown.items().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_refreshes_the_visible_page() {
        let source = Names::new(3);
        let (list, cache) = controller(source.clone());
        let mut view = list.view();
        ready(&mut view).await;

        source.rows.lock().unwrap().retain(|r| r != "name-2");
        cache.invalidate(Resource::Instructors);

        let shown = view
            .wait_for(|v| v.items().len() == 2)
            .await
            .unwrap()
            .clone();
        assert!(!shown.items().contains(&"name-2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn unmounted_list_stops_updating() {
        let source = Names::new(3);
        let (list, cache) = controller(source.clone());
        let mut view = list.view();
        ready(&mut view).await;

        list.unmount();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(Resource::Instructors);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(source.all_calls.load(Ordering::SeqCst), 1);
    }
}
