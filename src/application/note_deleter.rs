use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{info, warn};

use crate::application::mutation::MutationState;
use crate::application::query_cache::QueryCache;
use crate::application::NoteRepository;
use crate::domain::{Note, NotePage, QueryKey, TransportError};

/// Delete mutation. Invalidates every cached list page on success; nothing is
/// removed from the cache optimistically.
pub struct NoteDeleter<R: NoteRepository> {
    repository: Arc<R>,
    cache: Arc<QueryCache<NotePage>>,
    state: MutationState,
    run: u64,
}

impl<R: NoteRepository + 'static> NoteDeleter<R> {
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache<NotePage>>) -> Self {
        Self {
            repository,
            cache,
            state: MutationState::Idle,
            run: 0,
        }
    }

    /// Mark the mutation pending and return the run id with the request.
    ///
    /// The request invalidates the cache itself once the server confirms, so
    /// the caller only has to hand the outcome back to [`Self::finish`].
    pub fn start(&mut self, note_id: &str) -> (u64, BoxFuture<'static, Result<Note, TransportError>>) {
        self.run += 1;
        self.state = MutationState::Pending;

        let repository = Arc::clone(&self.repository);
        let cache = Arc::clone(&self.cache);
        let note_id = note_id.to_string();
        let request = async move {
            let result = repository.delete_note(&note_id).await;
            match &result {
                Ok(_) => {
                    let invalidated = cache.invalidate(&QueryKey::notes_prefix()).await;
                    info!(%note_id, invalidated, "Deleted note");
                }
                Err(e) => warn!(%note_id, error = %e, "Failed to delete note"),
            }
            result
        }
        .boxed();
        (self.run, request)
    }

    /// Record the outcome of `run`. Only the latest run moves the state.
    pub fn finish(&mut self, run: u64, result: &Result<Note, TransportError>) {
        if run == self.run {
            self.state.finish(result);
        }
    }

    /// Delete a note and return it as the server last stored it
    pub async fn delete_note(&mut self, note_id: &str) -> Result<Note, TransportError> {
        let (run, request) = self.start(note_id);
        let result = request.await;
        self.finish(run, &result);
        result
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }
}
