//! # Command Layer
//!
//! The **business logic** of notetree. Each command is a plain function over the
//! in-memory [`Notebook`] (and the search index, for commands that read it) that
//! returns a structured [`CmdResult`].
//!
//! ## Role and Responsibilities
//!
//! Commands compose the engine pieces in a fixed order:
//!
//! 1. Resolve the user's path, turning a miss into a warning.
//! 2. Mutate the page tree inside [`crate::rewrite::rewrite_around`], so every link
//!    to a moved page follows it and links to removed pages are severed.
//! 3. Report `changed` so the caller knows to mark the index stale and save.
//!
//! ## What Commands Do NOT Do
//!
//! - **Persistence**: the API facade saves after a command reports `changed`.
//! - **Index bookkeeping**: the facade marks the index stale after every write.
//! - **Terminal output**: messages are data; the UI decides how to show them.
//!
//! ## Rejections Are Not Errors
//!
//! A move past the last sibling, promoting a top-level page, a duplicate image name:
//! these come back as `Ok` with a [`CmdMessage::warning`] and `changed == false`.
//! `Err` is reserved for I/O, serialization and similar failures.
//!
//! ## Testing Strategy
//!
//! **Most of the testing lives here**, against notebooks built with
//! [`crate::store::memory::fixtures::NotebookFixture`], with no filesystem involved.
//!
//! ## Command Modules
//!
//! - [`structure`]: add, delete, move, promote, demote
//! - [`edit`]: titles, content, header/footer, pages from templates
//! - [`view`]: tree listing and page display
//! - [`search`]: ranked queries and filters
//! - [`import`] / [`export`]: page JSON, plain text, archives, single-file Markdown
//! - [`images`] / [`templates`]: registry management
//! - [`doctor`]: link and image consistency report
//! - [`config`]: configuration display

use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::search::SearchResults;
use crate::tree::PageId;
use serde::Serialize;

pub mod config;
pub mod doctor;
pub mod edit;
pub mod export;
pub mod images;
pub mod import;
pub mod search;
pub mod structure;
pub mod templates;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One page as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub path: PagePath,
    pub depth: usize,
    pub sub_pages: usize,
}

impl PageSummary {
    pub fn of(notebook: &Notebook, id: PageId) -> Option<Self> {
        let node = notebook.tree.get(id)?;
        Some(Self {
            title: node.title.clone(),
            path: node.path().clone(),
            depth: node.path().depth().saturating_sub(1),
            sub_pages: node.children().len(),
        })
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    /// Whether the notebook was modified and needs saving.
    pub changed: bool,
    /// Page the UI should select after the command.
    pub selected: Option<PagePath>,
    pub listed_pages: Vec<PageSummary>,
    pub search: Option<SearchResults>,
    /// Rendered text: page Markdown, exported JSON, config dumps.
    pub output: Option<String>,
    pub names: Vec<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    /// A no-op result carrying one warning.
    pub fn rejected(content: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.add_message(CmdMessage::warning(content));
        result
    }

    pub fn with_changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    pub fn with_selected(mut self, path: Option<PagePath>) -> Self {
        self.selected = path;
        self
    }

    pub fn with_listed_pages(mut self, pages: Vec<PageSummary>) -> Self {
        self.listed_pages = pages;
        self
    }

    pub fn with_search(mut self, results: SearchResults) -> Self {
        self.search = Some(results);
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}

pub(crate) fn missing_page(path: &PagePath) -> CmdResult {
    CmdResult::rejected(format!("No page at {}", path.to_dotted()))
}

pub(crate) fn title_of(notebook: &Notebook, id: PageId) -> String {
    notebook
        .tree
        .get(id)
        .map(|node| node.title.clone())
        .unwrap_or_default()
}

pub(crate) fn path_of(notebook: &Notebook, id: PageId) -> Option<PagePath> {
    notebook.tree.get(id).map(|node| node.path().clone())
}

pub(crate) fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

pub(crate) fn links_updated_message(pages: usize) -> Option<CmdMessage> {
    (pages > 0).then(|| CmdMessage::info(format!("Updated links in {}", plural(pages, "page"))))
}
