// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{NoteRepository, Notifier, Toast};
use crate::constants::DEFAULT_PER_PAGE;
use crate::domain::{NewNote, Note, NotePage, TransportError};

/// Note with predictable content and tag, for fixtures.
pub fn sample_note(id: &str, title: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("Content of {title}"),
        tag: "Todo".to_string(),
    }
}

fn status_error(status: u16) -> TransportError {
    TransportError::Status {
        status,
        message: format!("Simulated {status}"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for the notes API.
///
/// Lists filter on title and content (case-insensitive) and paginate like the
/// server. Deletes really remove notes, so refetches observe them. Failures
/// and latency are configurable through the builder.
///
/// # Examples
///
/// ```
/// use notehub::util::testing::{sample_note, MockNoteRepository};
///
/// let mock = MockNoteRepository::builder()
///     .with_note(sample_note("abc", "Question"))
///     .with_delete_failure("abc", 500)
///     .build();
/// assert_eq!(mock.list_calls(), 0);
/// ```
pub struct MockNoteRepository {
    notes: Mutex<Vec<Note>>,
    pages: HashMap<(String, u32), NotePage>,
    per_page: u32,
    list_failure: Option<u16>,
    create_failure: Option<u16>,
    delete_failures: HashMap<String, u16>,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Current server-side collection.
    pub fn stored_notes(&self) -> Vec<Note> {
        lock(&self.notes).clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl NoteRepository for MockNoteRepository {
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotePage, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(status) = self.list_failure {
            return Err(status_error(status));
        }
        if let Some(result) = self.pages.get(&(search.to_string(), page)) {
            return Ok(result.clone());
        }

        let needle = search.to_lowercase();
        let matching: Vec<Note> = lock(&self.notes)
            .iter()
            .filter(|n| {
                needle.is_empty()
                    || n.title.to_lowercase().contains(&needle)
                    || n.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        let per_page = self.per_page.max(1) as usize;
        let total_pages = matching.len().div_ceil(per_page) as u32;
        let start = (page.max(1) as usize - 1) * per_page;
        let notes = matching.into_iter().skip(start).take(per_page).collect();
        Ok(NotePage { notes, total_pages })
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(status) = self.create_failure {
            return Err(status_error(status));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Note {
            id: format!("generated-{id}"),
            title: note.title.clone(),
            content: note.content.clone(),
            tag: note.tag.clone(),
        };
        lock(&self.notes).push(created.clone());
        Ok(created)
    }

    async fn delete_note(&self, id: &str) -> Result<Note, TransportError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(status) = self.delete_failures.get(id) {
            return Err(status_error(*status));
        }
        let mut notes = lock(&self.notes);
        match notes.iter().position(|n| n.id == id) {
            Some(index) => Ok(notes.remove(index)),
            None => Err(status_error(404)),
        }
    }
}

/// Builder for MockNoteRepository
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteRepositoryBuilder {
    notes: Vec<Note>,
    pages: HashMap<(String, u32), NotePage>,
    per_page: u32,
    list_failure: Option<u16>,
    create_failure: Option<u16>,
    delete_failures: HashMap<String, u16>,
    latency: Option<Duration>,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            pages: HashMap::new(),
            per_page: DEFAULT_PER_PAGE,
            list_failure: None,
            create_failure: None,
            delete_failures: HashMap::new(),
            latency: None,
        }
    }

    /// Add a note to the server-side collection
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_notes(mut self, notes: impl IntoIterator<Item = Note>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Serve a fixed result for one `(search, page)` instead of computing it
    pub fn with_page(mut self, search: &str, page: u32, result: NotePage) -> Self {
        self.pages.insert((search.to_string(), page), result);
        self
    }

    /// Make every list call fail with the given HTTP status
    pub fn with_list_failure(mut self, status: u16) -> Self {
        self.list_failure = Some(status);
        self
    }

    pub fn with_create_failure(mut self, status: u16) -> Self {
        self.create_failure = Some(status);
        self
    }

    /// Make deleting `id` fail with the given HTTP status
    pub fn with_delete_failure(mut self, id: &str, status: u16) -> Self {
        self.delete_failures.insert(id.to_string(), status);
        self
    }

    /// Delay every call, e.g. to keep requests in flight under a paused clock
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn build(self) -> MockNoteRepository {
        MockNoteRepository {
            notes: Mutex::new(self.notes),
            pages: self.pages,
            per_page: self.per_page,
            list_failure: self.list_failure,
            create_failure: self.create_failure,
            delete_failures: self.delete_failures,
            latency: self.latency,
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifier that keeps every toast for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.toasts).clone()
    }

    /// Number of toasts carrying exactly `message`.
    pub fn count(&self, message: &str) -> usize {
        lock(&self.toasts)
            .iter()
            .filter(|t| t.message == message)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        debug!(%toast, "Recorded toast");
        lock(&self.toasts).push(toast);
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "hyper_util", "reqwest", "mio", "wiremock"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[tokio::test]
    async fn given_notes_added_when_listing_all_then_returns_all_notes() {
        let mock = MockNoteRepository::builder()
            .with_note(sample_note("1", "Question 1"))
            .with_note(sample_note("2", "Question 2"))
            .build();

        let result = mock.list_notes("", 1).await.expect("List should succeed");

        assert_eq!(result.notes.len(), 2);
        assert_eq!(result.total_pages, 1);
        assert_eq!(mock.list_calls(), 1);
    }

    #[tokio::test]
    async fn given_more_notes_than_page_size_when_listing_then_paginates() {
        let mock = MockNoteRepository::builder()
            .with_per_page(2)
            .with_notes((1..=5).map(|i| sample_note(&i.to_string(), &format!("Note {i}"))))
            .build();

        let last = mock.list_notes("", 3).await.expect("List should succeed");

        assert_eq!(last.total_pages, 3);
        assert_eq!(last.notes.len(), 1);
        assert_eq!(last.notes[0].id, "5");
    }

    #[tokio::test]
    async fn given_no_matches_when_listing_then_returns_empty_page() {
        let mock = MockNoteRepository::builder()
            .with_note(sample_note("1", "Tree"))
            .build();

        let result = mock.list_notes("cat", 1).await.expect("List should succeed");

        assert!(result.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[tokio::test]
    async fn given_custom_page_when_listing_then_returns_configured_result() {
        let custom = NotePage {
            notes: vec![sample_note("999", "Custom")],
            total_pages: 4,
        };
        let mock = MockNoteRepository::builder()
            .with_page("custom", 2, custom.clone())
            .build();

        let result = mock.list_notes("custom", 2).await.expect("List should succeed");

        assert_eq!(result, custom);
    }

    #[tokio::test]
    async fn given_existing_note_when_deleting_then_removes_it_from_store() {
        let mock = MockNoteRepository::builder()
            .with_note(sample_note("1", "Doomed"))
            .build();

        let deleted = mock.delete_note("1").await.expect("Delete should succeed");

        assert_eq!(deleted.id, "1");
        assert!(mock.stored_notes().is_empty());
        assert_eq!(mock.delete_note("1").await.unwrap_err().status(), Some(404));
    }

    #[tokio::test]
    async fn given_delete_failure_configured_when_deleting_then_keeps_note() {
        let mock = MockNoteRepository::builder()
            .with_note(sample_note("abc", "Survivor"))
            .with_delete_failure("abc", 500)
            .build();

        let result = mock.delete_note("abc").await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(mock.stored_notes().len(), 1);
    }

    #[test]
    fn given_toasts_when_recording_then_counts_by_message() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Toast::success("Note deleted!"));
        notifier.notify(Toast::error("Failed to delete note."));
        notifier.notify(Toast::success("Note deleted!"));

        assert_eq!(notifier.count("Note deleted!"), 2);
        assert_eq!(notifier.toasts().len(), 3);
    }
}
