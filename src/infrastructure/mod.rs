pub mod config;
pub mod notehub;
pub mod terminal;

pub use config::Config;
pub use notehub::NoteHubClient;
pub use terminal::TerminalNotifier;
