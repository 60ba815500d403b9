use tracing::debug;

/// What happens to the page number when a new search text is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageResetPolicy {
    /// Jump back to page 1 for every new search.
    #[default]
    ResetToFirst,
    /// Keep the current page number.
    Keep,
}

/// Committed search text and page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    search_text: String,
    page: u32,
    policy: PageResetPolicy,
}

impl SearchState {
    pub fn new(policy: PageResetPolicy) -> Self {
        Self {
            search_text: String::new(),
            page: 1,
            policy,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Commit a debounced search value. Returns whether anything changed.
    pub fn commit_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.search_text {
            return false;
        }
        debug!(search = %text, "Committing search");
        self.search_text = text;
        if self.policy == PageResetPolicy::ResetToFirst {
            self.page = 1;
        }
        true
    }

    /// Move to `page` if pagination applies and the page exists.
    pub fn go_to_page(&mut self, page: u32, total_pages: u32) -> bool {
        if total_pages <= 1 || page == 0 || page > total_pages || page == self.page {
            return false;
        }
        debug!(page, total_pages, "Changing page");
        self.page = page;
        true
    }

    pub fn next_page(&mut self, total_pages: u32) -> bool {
        self.go_to_page(self.page.saturating_add(1), total_pages)
    }

    pub fn prev_page(&mut self, total_pages: u32) -> bool {
        self.go_to_page(self.page.saturating_sub(1), total_pages)
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(PageResetPolicy::default())
    }
}
