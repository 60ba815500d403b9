pub mod debounce;
pub mod mutation;
pub mod note_browser;
pub mod note_creator;
pub mod note_deleter;
pub mod note_lister;
pub mod notifier;
pub mod query_cache;
pub mod repository;
pub mod search;

pub use debounce::Debouncer;
pub use mutation::MutationState;
pub use note_browser::{BrowserView, NoteBrowser};
pub use note_creator::NoteCreator;
pub use note_deleter::NoteDeleter;
pub use note_lister::NoteLister;
pub use notifier::{Notifier, Toast, ToastKind};
pub use query_cache::{QueryCache, QueryState};
pub use repository::NoteRepository;
pub use search::{PageResetPolicy, SearchState};
