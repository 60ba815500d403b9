// src/constants.rs
//
// Application-wide constants. Values that users may want to change are also
// exposed through the TOML config (see `infrastructure/config.rs`).

/// Default base URL of the NoteHub API.
pub const DEFAULT_BASE_URL: &str = "https://notehub-public.goit.study/api";

/// Notes requested per page.
///
/// Used in: `infrastructure/notehub.rs`
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Quiet period in milliseconds before a search input is committed.
///
/// Used in: `application/debounce.rs`, `cli/browse.rs`
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Seconds a cache entry may go unused before it is evicted.
pub const CACHE_GC_TIME_SECS: u64 = 300;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV_VAR: &str = "NOTEHUB_TOKEN";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV_VAR: &str = "NOTEHUB_BASE_URL";

/// First segment of every list query key; invalidated after mutations.
pub const NOTES_QUERY_SCOPE: &str = "notes";

// Toast texts
pub const NO_RESULTS_MESSAGE: &str = "No movies found for your request.";
pub const NOTE_DELETED_MESSAGE: &str = "Note deleted!";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete note.";
pub const NOTE_CREATED_MESSAGE: &str = "Note created!";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create note.";

// Inline error texts
pub const QUERY_ERROR_MESSAGE: &str = "There was an error, please try again...";
pub const MUTATION_ERROR_MESSAGE: &str = "An error occurred";

/// Width of the content preview in list output.
///
/// Used in: `ports/terminal.rs`
pub const PREVIEW_WIDTH: usize = 72;
