use std::fmt::Write;

use tracing::instrument;

use crate::application::BrowserView;
use crate::constants::{MUTATION_ERROR_MESSAGE, PREVIEW_WIDTH, QUERY_ERROR_MESSAGE};
use crate::domain::{Note, NotePage};
use crate::util::text::preview;

/// Renders browser state and note pages as plain text.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    preview_width: usize,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            preview_width: PREVIEW_WIDTH,
        }
    }

    pub fn with_preview_width(preview_width: usize) -> Self {
        Self { preview_width }
    }

    pub fn render_note(&self, note: &Note) -> String {
        format!(
            "[{id}] {title}  #{tag}\n    {content}",
            id = note.id,
            title = note.title,
            tag = note.tag,
            content = preview(&note.content, self.preview_width),
        )
    }

    /// `« 1 [2] 3 »` with the current page bracketed.
    pub fn render_pagination(&self, page: u32, total_pages: u32) -> String {
        let pages: Vec<String> = (1..=total_pages)
            .map(|p| if p == page { format!("[{p}]") } else { p.to_string() })
            .collect();
        format!("« {} »", pages.join(" "))
    }

    /// One-shot listing output.
    pub fn render_page(&self, result: &NotePage, page: u32) -> String {
        let mut out = String::new();
        for note in &result.notes {
            let _ = writeln!(out, "{}", self.render_note(note));
        }
        if result.total_pages > 1 {
            let _ = writeln!(out, "{}", self.render_pagination(page, result.total_pages));
        }
        out
    }

    #[instrument(level = "trace", skip(self, view))]
    pub fn render(&self, view: &BrowserView) -> String {
        let mut out = String::new();

        let search = if view.search_text.is_empty() {
            "(all notes)".to_string()
        } else {
            format!("{:?}", view.search_text)
        };
        let _ = writeln!(out, "Search: {search}");

        if view.is_loading || view.mutation_pending {
            let _ = writeln!(out, "Loading...");
        }
        if view.query_error.is_some() {
            let _ = writeln!(out, "{QUERY_ERROR_MESSAGE}");
        }
        if view.mutation_error.is_some() {
            let _ = writeln!(out, "{MUTATION_ERROR_MESSAGE}");
        }

        for note in &view.notes {
            let _ = writeln!(out, "{}", self.render_note(note));
        }

        if view.show_pagination {
            let _ = writeln!(out, "{}", self.render_pagination(view.page, view.total_pages));
        }
        if view.is_modal_open {
            let _ = writeln!(out, "── New note ──");
        }
        out
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}
