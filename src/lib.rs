// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use application::{
    NoteBrowser, NoteCreator, NoteDeleter, NoteLister, Notifier, QueryCache, Toast,
};
use constants::{
    CREATE_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, NOTE_CREATED_MESSAGE, NOTE_DELETED_MESSAGE,
    NO_RESULTS_MESSAGE,
};
use domain::{NewNote, NotePage};
use infrastructure::{Config, NoteHubClient, TerminalNotifier};
use ports::TerminalPresenter;
use tracing::{debug, info};

use crate::cli::args::{Args, Command};

/// Shared wiring for every command that talks to the API.
struct Services {
    config: Config,
    client: Arc<NoteHubClient>,
    cache: Arc<QueryCache<NotePage>>,
    notifier: Arc<TerminalNotifier>,
    presenter: TerminalPresenter,
}

impl Services {
    fn build(config_path: Option<&Path>, base_url: Option<String>, token: Option<String>) -> Result<Self> {
        let config = Config::resolve(config_path)?
            .apply_env()
            .with_overrides(base_url, token);
        let client = Arc::new(NoteHubClient::new(&config.api)?);
        let cache = Arc::new(
            QueryCache::with_stale_time(config.cache.stale_time()).with_gc_time(config.cache.gc_time()),
        );
        Ok(Self {
            config,
            client,
            cache,
            notifier: Arc::new(TerminalNotifier::new()),
            presenter: TerminalPresenter::new(),
        })
    }
}

pub async fn run(args: Args) -> Result<()> {
    debug!(command = ?args.command, "Starting notehub");
    let Args {
        config: config_path,
        base_url,
        token,
        command,
        ..
    } = args;

    match command {
        Command::Init { force } => init_config(config_path.as_deref(), force),
        Command::List { search, page, json } => {
            let services = Services::build(config_path.as_deref(), base_url, token)?;
            info!(%search, page, "Listing notes");
            let lister = NoteLister::new(services.client, services.cache);
            let result = lister
                .list_notes(&search, page)
                .await
                .context("Failed to list notes")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&*result)?);
            } else if result.is_empty() {
                services.notifier.notify(Toast::error(NO_RESULTS_MESSAGE));
            } else {
                print!("{}", services.presenter.render_page(&result, page));
            }
            Ok(())
        }
        Command::Create { title, content, tag } => {
            let services = Services::build(config_path.as_deref(), base_url, token)?;
            let mut creator = NoteCreator::new(services.client, services.cache);
            match creator.create_note(&NewNote { title, content, tag }).await {
                Ok(note) => {
                    services.notifier.notify(Toast::success(NOTE_CREATED_MESSAGE));
                    println!("{}", services.presenter.render_note(&note));
                    Ok(())
                }
                Err(e) => {
                    services.notifier.notify(Toast::error(CREATE_FAILED_MESSAGE));
                    Err(e).context("Failed to create note")
                }
            }
        }
        Command::Delete { note_id } => {
            let services = Services::build(config_path.as_deref(), base_url, token)?;
            info!(%note_id, "Deleting note");
            let mut deleter = NoteDeleter::new(services.client, services.cache);
            match deleter.delete_note(&note_id).await {
                Ok(_) => {
                    services.notifier.notify(Toast::success(NOTE_DELETED_MESSAGE));
                    Ok(())
                }
                Err(e) => {
                    services.notifier.notify(Toast::error(DELETE_FAILED_MESSAGE));
                    Err(e).with_context(|| format!("Failed to delete note {note_id}"))
                }
            }
        }
        Command::Browse => {
            let services = Services::build(config_path.as_deref(), base_url, token)?;
            let policy = services.config.search.page_policy();
            let debounce = services.config.search.debounce();
            let mut browser =
                NoteBrowser::new(services.client, services.cache, services.notifier, policy);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            cli::browse::run_session(&mut browser, &services.presenter, debounce, stdin, &mut stdout)
                .await
        }
    }
}

fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().context("Could not determine config directory")?,
    };
    if path.exists() && !force {
        bail!("Config file already exists: {} (use --force to overwrite)", path.display());
    }
    Config::create_default(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
