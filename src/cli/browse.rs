use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info};

use crate::application::{Debouncer, NoteBrowser, NoteRepository};
use crate::domain::NewNote;
use crate::ports::TerminalPresenter;

const HELP: &str = "\
Type text to search. Commands:
  :next, :n          next page
  :prev, :p          previous page
  :page N            go to page N
  :new               create a note
  :delete ID, :d ID  delete a note
  :help, :h          this help
  :quit, :q          leave";

/// One line of user input in a browse session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Search(String),
    NextPage,
    PrevPage,
    Page(u32),
    New,
    Delete(String),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> BrowseInput {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return BrowseInput::Search(line.to_string());
    };

    let mut parts = command.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "next" | "n" => BrowseInput::NextPage,
        "prev" | "p" => BrowseInput::PrevPage,
        "page" => arg
            .parse()
            .map(BrowseInput::Page)
            .unwrap_or_else(|_| BrowseInput::Unknown(command.to_string())),
        "new" => BrowseInput::New,
        "delete" | "d" if !arg.is_empty() => BrowseInput::Delete(arg.to_string()),
        "help" | "h" => BrowseInput::Help,
        "quit" | "q" => BrowseInput::Quit,
        _ => BrowseInput::Unknown(command.to_string()),
    }
}

async fn prompt<I, W>(lines: &mut Lines<I>, output: &mut W, label: &str) -> Result<Option<String>>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    write!(output, "{label}: ")?;
    output.flush()?;
    let line = lines.next_line().await.context("Failed to read input")?;
    Ok(line.map(|l| l.trim().to_string()))
}

/// Read the creation form. An empty title (or end of input) cancels it.
async fn read_form<I, W>(lines: &mut Lines<I>, output: &mut W) -> Result<Option<NewNote>>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(title) = prompt(lines, output, "Title").await?.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let Some(content) = prompt(lines, output, "Content").await? else {
        return Ok(None);
    };
    let Some(tag) = prompt(lines, output, "Tag").await? else {
        return Ok(None);
    };
    Ok(Some(NewNote { title, content, tag }))
}

fn render<R, W>(browser: &NoteBrowser<R>, presenter: &TerminalPresenter, output: &mut W) -> Result<()>
where
    R: NoteRepository + 'static,
    W: Write,
{
    write!(output, "{}", presenter.render(&browser.view()))?;
    output.flush()?;
    Ok(())
}

/// Run an interactive session until `:quit` or end of input.
///
/// Search text is debounced; commands act immediately. Requests run while
/// input keeps being read, and a frame is drawn when one starts and when it
/// finishes. Requests still running at the end are finished before
/// returning; a search still waiting for its quiet period is dropped.
pub async fn run_session<R, I, W>(
    browser: &mut NoteBrowser<R>,
    presenter: &TerminalPresenter,
    debounce: Duration,
    input: I,
    output: &mut W,
) -> Result<()>
where
    R: NoteRepository + 'static,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let (debouncer, mut searches) = Debouncer::new(debounce);

    browser.load().await;
    render(browser, presenter, output)?;

    loop {
        tokio::select! {
            // Finished requests are applied before more input is read
            biased;

            true = browser.advance(), if browser.has_pending_work() => {
                render(browser, presenter, output)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    debug!("End of input");
                    break;
                };
                match parse_input(&line) {
                    BrowseInput::Search(text) => debouncer.push(text),
                    BrowseInput::NextPage => {
                        if browser.next_page().await {
                            render(browser, presenter, output)?;
                        }
                    }
                    BrowseInput::PrevPage => {
                        if browser.prev_page().await {
                            render(browser, presenter, output)?;
                        }
                    }
                    BrowseInput::Page(page) => {
                        if browser.go_to_page(page).await {
                            render(browser, presenter, output)?;
                        }
                    }
                    BrowseInput::New => {
                        browser.open_modal();
                        render(browser, presenter, output)?;
                        match read_form(&mut lines, output).await? {
                            Some(note) => browser.create_note(note),
                            None => browser.close_modal(),
                        }
                        render(browser, presenter, output)?;
                    }
                    BrowseInput::Delete(id) => {
                        browser.delete_note(&id);
                        render(browser, presenter, output)?;
                    }
                    BrowseInput::Help => writeln!(output, "{HELP}")?,
                    BrowseInput::Quit => break,
                    BrowseInput::Unknown(command) => {
                        writeln!(output, "Unknown command: :{command} (try :help)")?;
                    }
                }
            }
            Some(text) = searches.recv() => {
                if browser.commit_search(text).await {
                    render(browser, presenter, output)?;
                }
            }
        }
    }

    // A mutation already sent is not cut off
    if browser.has_pending_work() {
        debug!("Waiting for pending requests");
        browser.settle().await;
        render(browser, presenter, output)?;
    }

    info!("Browse session ended");
    Ok(())
}
