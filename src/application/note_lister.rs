use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::application::query_cache::{QueryCache, QueryState};
use crate::application::NoteRepository;
use crate::domain::{NotePage, QueryKey, TransportError};

/// Cached listing of note pages.
pub struct NoteLister<R: NoteRepository> {
    repository: Arc<R>,
    cache: Arc<QueryCache<NotePage>>,
}

impl<R: NoteRepository + 'static> NoteLister<R> {
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache<NotePage>>) -> Self {
        Self { repository, cache }
    }

    /// List one page of notes, served from the cache when the same
    /// `(search, page)` was fetched before and has not been invalidated.
    pub async fn list_notes(&self, search: &str, page: u32) -> Result<Arc<NotePage>, TransportError> {
        self.list_task(search, page).await
    }

    /// Same as [`Self::list_notes`], detached from `self` so it can run
    /// alongside other work.
    pub fn list_task(
        &self,
        search: &str,
        page: u32,
    ) -> BoxFuture<'static, Result<Arc<NotePage>, TransportError>> {
        let key = QueryKey::notes(search, page);
        let repository = Arc::clone(&self.repository);
        let cache = Arc::clone(&self.cache);
        let search = search.to_string();
        async move {
            cache
                .fetch(&key, move || async move { repository.list_notes(&search, page).await })
                .await
        }
        .boxed()
    }

    pub async fn state(&self, search: &str, page: u32) -> QueryState<NotePage> {
        self.cache.state(&QueryKey::notes(search, page)).await
    }

    pub async fn is_cached(&self, search: &str, page: u32) -> bool {
        self.cache.is_fresh(&QueryKey::notes(search, page)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{sample_note, MockNoteRepository};

    fn lister(mock: MockNoteRepository) -> (Arc<MockNoteRepository>, NoteLister<MockNoteRepository>) {
        let repo = Arc::new(mock);
        let lister = NoteLister::new(Arc::clone(&repo), Arc::new(QueryCache::new()));
        (repo, lister)
    }

    #[tokio::test]
    async fn given_no_search_when_listing_notes_then_returns_all_notes() {
        // Arrange
        let (_, lister) = lister(
            MockNoteRepository::builder()
                .with_note(sample_note("1", "First"))
                .with_note(sample_note("2", "Second"))
                .build(),
        );

        // Act
        let result = lister.list_notes("", 1).await.unwrap();

        // Assert
        assert_eq!(result.notes.len(), 2);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn given_search_query_when_listing_notes_then_returns_filtered_notes() {
        // Arrange
        let (_, lister) = lister(
            MockNoteRepository::builder()
                .with_note(sample_note("1", "What is a Tree?"))
                .with_note(sample_note("2", "What is a Graph?"))
                .build(),
        );

        // Act
        let result = lister.list_notes("Tree", 1).await.unwrap();

        // Assert
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[0].id, "1");
    }

    #[tokio::test]
    async fn given_same_page_listed_twice_when_listing_then_hits_repository_once() {
        // Arrange
        let (repo, lister) = lister(
            MockNoteRepository::builder()
                .with_note(sample_note("1", "First"))
                .build(),
        );

        // Act
        lister.list_notes("", 1).await.unwrap();
        lister.list_notes("", 1).await.unwrap();

        // Assert
        assert_eq!(repo.list_calls(), 1);
        assert!(lister.is_cached("", 1).await);
        assert!(!lister.is_cached("", 2).await);
    }

    #[tokio::test]
    async fn given_failing_repository_when_listing_then_state_reports_error() {
        // Arrange
        let (_, lister) = lister(MockNoteRepository::builder().with_list_failure(500).build());

        // Act
        let result = lister.list_notes("", 1).await;
        let state = lister.state("", 1).await;

        // Assert
        assert!(result.is_err());
        assert!(state.is_error());
        assert!(state.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn given_concurrent_listings_of_same_page_when_slow_then_shares_one_request() {
        // Arrange
        let (repo, lister) = lister(
            MockNoteRepository::builder()
                .with_note(sample_note("1", "First"))
                .with_latency(std::time::Duration::from_millis(200))
                .build(),
        );

        // Act
        let (a, b) = tokio::join!(lister.list_notes("", 1), lister.list_notes("", 1));

        // Assert
        assert_eq!(repo.list_calls(), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }
}
