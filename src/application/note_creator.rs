use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{info, warn};

use crate::application::mutation::MutationState;
use crate::application::query_cache::QueryCache;
use crate::application::NoteRepository;
use crate::domain::{NewNote, Note, NotePage, QueryKey, TransportError};

/// Create mutation. The request body is sent as entered.
pub struct NoteCreator<R: NoteRepository> {
    repository: Arc<R>,
    cache: Arc<QueryCache<NotePage>>,
    state: MutationState,
    run: u64,
}

impl<R: NoteRepository + 'static> NoteCreator<R> {
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache<NotePage>>) -> Self {
        Self {
            repository,
            cache,
            state: MutationState::Idle,
            run: 0,
        }
    }

    /// Mark the mutation pending and return the run id with the request.
    pub fn start(&mut self, note: &NewNote) -> (u64, BoxFuture<'static, Result<Note, TransportError>>) {
        self.run += 1;
        self.state = MutationState::Pending;

        let repository = Arc::clone(&self.repository);
        let cache = Arc::clone(&self.cache);
        let note = note.clone();
        let request = async move {
            let result = repository.create_note(&note).await;
            match &result {
                Ok(created) => {
                    cache.invalidate(&QueryKey::notes_prefix()).await;
                    info!(note_id = %created.id, title = %created.title, "Created note");
                }
                Err(e) => warn!(title = %note.title, error = %e, "Failed to create note"),
            }
            result
        }
        .boxed();
        (self.run, request)
    }

    pub fn finish(&mut self, run: u64, result: &Result<Note, TransportError>) {
        if run == self.run {
            self.state.finish(result);
        }
    }

    pub async fn create_note(&mut self, note: &NewNote) -> Result<Note, TransportError> {
        let (run, request) = self.start(note);
        let result = request.await;
        self.finish(run, &result);
        result
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }
}
