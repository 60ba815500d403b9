use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, instrument, warn};

use crate::application::notifier::{Notifier, Toast};
use crate::application::query_cache::QueryCache;
use crate::application::search::{PageResetPolicy, SearchState};
use crate::application::{NoteCreator, NoteDeleter, NoteLister, NoteRepository};
use crate::constants::{
    CREATE_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, NOTE_CREATED_MESSAGE, NOTE_DELETED_MESSAGE,
    NO_RESULTS_MESSAGE,
};
use crate::domain::{NewNote, Note, NotePage, QueryKey, TransportError};

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserView {
    pub search_text: String,
    pub page: u32,
    pub total_pages: u32,
    pub notes: Vec<Note>,
    pub show_pagination: bool,
    pub is_loading: bool,
    pub query_error: Option<TransportError>,
    pub mutation_pending: bool,
    pub mutation_error: Option<TransportError>,
    pub is_modal_open: bool,
}

/// Completed background work, applied by [`NoteBrowser::advance`].
enum Outcome {
    Listed {
        key: QueryKey,
        result: Result<Arc<NotePage>, TransportError>,
    },
    Created {
        run: u64,
        result: Result<Note, TransportError>,
    },
    Deleted {
        run: u64,
        result: Result<Note, TransportError>,
    },
}

/// Interactive note browser: search, pagination, creation modal and delete,
/// with toasts for the outcomes.
///
/// Commands only start requests. They run in the background until the owner
/// drives them with [`advance`](Self::advance) or [`settle`](Self::settle), so
/// the view can show loading state in the meantime. While a new key loads,
/// the page shown last stays visible as a placeholder.
pub struct NoteBrowser<R: NoteRepository> {
    lister: NoteLister<R>,
    deleter: NoteDeleter<R>,
    creator: NoteCreator<R>,
    notifier: Arc<dyn Notifier>,
    search: SearchState,
    modal_open: bool,
    displayed: Option<(QueryKey, Arc<NotePage>)>,
    query_error: Option<(QueryKey, TransportError)>,
    fetching: Option<QueryKey>,
    work: FuturesUnordered<BoxFuture<'static, Outcome>>,
}

impl<R: NoteRepository + 'static> NoteBrowser<R> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<QueryCache<NotePage>>,
        notifier: Arc<dyn Notifier>,
        policy: PageResetPolicy,
    ) -> Self {
        Self {
            lister: NoteLister::new(Arc::clone(&repository), Arc::clone(&cache)),
            deleter: NoteDeleter::new(Arc::clone(&repository), Arc::clone(&cache)),
            creator: NoteCreator::new(repository, cache),
            notifier,
            search: SearchState::new(policy),
            modal_open: false,
            displayed: None,
            query_error: None,
            fetching: None,
            work: FuturesUnordered::new(),
        }
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::notes(self.search.search_text(), self.search.page())
    }

    pub fn search_text(&self) -> &str {
        self.search.search_text()
    }

    pub fn page(&self) -> u32 {
        self.search.page()
    }

    pub fn total_pages(&self) -> u32 {
        self.displayed.as_ref().map_or(0, |(_, page)| page.total_pages)
    }

    /// Whether the next `load` goes to the network.
    pub async fn needs_fetch(&self) -> bool {
        !self
            .lister
            .is_cached(self.search.search_text(), self.search.page())
            .await
    }

    pub fn has_pending_work(&self) -> bool {
        !self.work.is_empty()
    }

    /// Show the page for the current key. A fresh cache entry is applied at
    /// once; otherwise a request is started.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&mut self) {
        let key = self.query_key();
        let search = self.search.search_text().to_string();
        let page = self.search.page();

        if self.lister.is_cached(&search, page).await {
            debug!(%key, "Showing cached page");
            let result = self.lister.list_notes(&search, page).await;
            self.apply_listed(key, result);
        } else {
            self.start_fetch(key, &search, page);
        }
    }

    /// `load` followed by `settle`.
    pub async fn refresh(&mut self) {
        self.load().await;
        self.settle().await;
    }

    /// Wait for the next piece of background work and apply it. Returns
    /// `false` when nothing is running.
    ///
    /// Cancel safe: an outcome is applied as soon as it is taken.
    pub async fn advance(&mut self) -> bool {
        match self.work.next().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Run every started request, including refetches they trigger, to the end.
    pub async fn settle(&mut self) {
        while self.advance().await {}
    }

    /// Apply a debounced search value and load it if it changed.
    pub async fn commit_search(&mut self, text: impl Into<String>) -> bool {
        let changed = self.search.commit_search(text);
        if changed {
            self.load().await;
        }
        changed
    }

    pub async fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.search.go_to_page(page, self.total_pages());
        if changed {
            self.load().await;
        }
        changed
    }

    pub async fn next_page(&mut self) -> bool {
        let changed = self.search.next_page(self.total_pages());
        if changed {
            self.load().await;
        }
        changed
    }

    pub async fn prev_page(&mut self) -> bool {
        let changed = self.search.prev_page(self.total_pages());
        if changed {
            self.load().await;
        }
        changed
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Submit the creation form. The modal closes only once the server
    /// confirms.
    pub fn create_note(&mut self, note: NewNote) {
        let (run, request) = self.creator.start(&note);
        self.work
            .push(async move { Outcome::Created { run, result: request.await } }.boxed());
    }

    /// Delete a note. It stays listed until the invalidated page is refetched.
    pub fn delete_note(&mut self, note_id: &str) {
        let (run, request) = self.deleter.start(note_id);
        self.work
            .push(async move { Outcome::Deleted { run, result: request.await } }.boxed());
    }

    pub fn view(&self) -> BrowserView {
        let key = self.query_key();
        let total_pages = self.total_pages();
        let query_error = self
            .query_error
            .as_ref()
            .filter(|(failed, _)| *failed == key)
            .map(|(_, e)| e.clone());
        BrowserView {
            search_text: self.search.search_text().to_string(),
            page: self.search.page(),
            total_pages,
            notes: self
                .displayed
                .as_ref()
                .map(|(_, page)| page.notes.clone())
                .unwrap_or_default(),
            show_pagination: query_error.is_none() && total_pages > 1,
            is_loading: self.fetching.as_ref() == Some(&key)
                || (self.displayed.is_none() && query_error.is_none()),
            query_error,
            mutation_pending: self.deleter.state().is_pending() || self.creator.state().is_pending(),
            mutation_error: self.deleter.state().error().cloned(),
            is_modal_open: self.modal_open,
        }
    }

    fn start_fetch(&mut self, key: QueryKey, search: &str, page: u32) {
        debug!(%key, "Fetching page");
        let request = self.lister.list_task(search, page);
        self.fetching = Some(key.clone());
        self.work
            .push(async move { Outcome::Listed { key, result: request.await } }.boxed());
    }

    /// Mutations invalidate every page, so the current one is always refetched.
    fn refetch_current(&mut self) {
        let key = self.query_key();
        let search = self.search.search_text().to_string();
        let page = self.search.page();
        self.start_fetch(key, &search, page);
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Listed { key, result } => self.apply_listed(key, result),
            Outcome::Created { run, result } => {
                self.creator.finish(run, &result);
                match result {
                    Ok(_) => {
                        self.notifier.notify(Toast::success(NOTE_CREATED_MESSAGE));
                        self.close_modal();
                        self.refetch_current();
                    }
                    Err(_) => self.notifier.notify(Toast::error(CREATE_FAILED_MESSAGE)),
                }
            }
            Outcome::Deleted { run, result } => {
                self.deleter.finish(run, &result);
                match result {
                    Ok(_) => {
                        self.notifier.notify(Toast::success(NOTE_DELETED_MESSAGE));
                        self.refetch_current();
                    }
                    Err(_) => self.notifier.notify(Toast::error(DELETE_FAILED_MESSAGE)),
                }
            }
        }
    }

    fn apply_listed(&mut self, key: QueryKey, result: Result<Arc<NotePage>, TransportError>) {
        if self.fetching.as_ref() == Some(&key) {
            self.fetching = None;
        }
        if key != self.query_key() {
            debug!(%key, "Dropping result for a key no longer shown");
            return;
        }

        match result {
            Ok(page) => {
                self.query_error = None;
                // A new result object means a fetch completed; cache hits
                // hand back the object already on screen
                let is_new = !self
                    .displayed
                    .as_ref()
                    .is_some_and(|(_, shown)| Arc::ptr_eq(shown, &page));
                if is_new && page.is_empty() {
                    self.notifier.notify(Toast::error(NO_RESULTS_MESSAGE));
                }
                debug!(%key, notes = page.notes.len(), total_pages = page.total_pages, "Page loaded");
                self.displayed = Some((key, page));
            }
            Err(e) => {
                warn!(%key, error = %e, "Failed to load notes");
                // The placeholder only covers loading; a failed key shows no notes
                if self.displayed.as_ref().is_some_and(|(shown, _)| *shown != key) {
                    self.displayed = None;
                }
                self.query_error = Some((key, e));
            }
        }
    }
}
