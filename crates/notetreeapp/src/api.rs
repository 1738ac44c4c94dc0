//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry point
//! for every notetree operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the session state**: the live [`Notebook`], its [`SearchIndex`], the store
//!   and the loaded configuration
//! - **Normalizes inputs**: user paths (`0.1.2` or `[0,1,2]`) become [`PagePath`]s
//! - **Commits**: after any command that reports `changed`, marks the index stale and
//!   saves the whole notebook through the store
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Presentation**: no stdout or stderr, no terminal formatting
//!
//! ## Index Freshness
//!
//! Reads that depend on the index (`search`, `show` and exports that expand
//! `{LINKINGPAGES}`) refresh it first, so they always see the latest write without the
//! caller rebuilding anything.
//!
//! ## Generic Over NotebookStore
//!
//! - Production: `NotebookApi<FileStore>`
//! - Testing: `NotebookApi<MemoryStore>`

use crate::commands::{self, config::ConfigAction};
use crate::config::NotebookConfig;
use crate::error::{NotebookError, Result};
use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::search::{SearchFilter, SearchIndex, SearchQuery};
use crate::store::NotebookStore;
use std::io::Write;
use tracing::debug;

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, PageSummary};

/// Parses a user-supplied page path, dotted or JSON.
pub fn parse_path(input: &str) -> Result<PagePath> {
    input.parse::<PagePath>().map_err(NotebookError::Api)
}

pub struct NotebookApi<S: NotebookStore> {
    store: S,
    notebook: Notebook,
    index: SearchIndex,
    config: NotebookConfig,
}

impl<S: NotebookStore> NotebookApi<S> {
    /// Loads the stored notebook, or starts a fresh one from `config` when nothing is
    /// stored yet. A fresh notebook is only written by [`NotebookApi::init`] or the
    /// first change.
    pub fn open(store: S, config: NotebookConfig) -> Result<Self> {
        let notebook = match store.load()? {
            Some(notebook) => notebook,
            None => Notebook::new(config.root_title.clone())
                .with_header_footer(&config.default_header, &config.default_footer),
        };
        Ok(Self {
            store,
            notebook,
            index: SearchIndex::new(),
            config,
        })
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.store.exists()
    }

    pub fn init(&mut self) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        if self.store.exists() {
            result.add_message(CmdMessage::info(format!(
                "Notebook already exists at {}",
                self.store.location()
            )));
            return Ok(result);
        }
        self.store.save(&self.notebook)?;
        result.add_message(CmdMessage::success(format!(
            "Created notebook at {}",
            self.store.location()
        )));
        Ok(result)
    }

    fn commit(&mut self, result: CmdResult) -> Result<CmdResult> {
        if result.changed {
            self.index.mark_stale();
            self.store.save(&self.notebook)?;
            debug!(location = %self.store.location(), "committed notebook");
        }
        Ok(result)
    }

    // --- structure ---

    pub fn add_page(&mut self, parent: &str, title: &str, content: &str) -> Result<CmdResult> {
        let parent = parse_path(parent)?;
        let result = commands::structure::add(&mut self.notebook, &parent, title, content)?;
        self.commit(result)
    }

    pub fn delete_page(&mut self, path: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::structure::delete(&mut self.notebook, &path)?;
        self.commit(result)
    }

    pub fn move_page(&mut self, path: &str, delta: isize) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::structure::move_page(&mut self.notebook, &path, delta)?;
        self.commit(result)
    }

    pub fn promote_page(&mut self, path: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::structure::promote(&mut self.notebook, &path)?;
        self.commit(result)
    }

    pub fn demote_page(&mut self, path: &str, sibling_index: usize) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::structure::demote(&mut self.notebook, &path, sibling_index)?;
        self.commit(result)
    }

    // --- editing ---

    pub fn set_title(&mut self, path: &str, title: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::edit::set_title(&mut self.notebook, &path, title)?;
        self.commit(result)
    }

    pub fn set_content(&mut self, path: &str, content: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let result = commands::edit::set_content(&mut self.notebook, &path, content)?;
        self.commit(result)
    }

    pub fn set_header(&mut self, header: &str) -> Result<CmdResult> {
        let result = commands::edit::set_header(&mut self.notebook, header)?;
        self.commit(result)
    }

    pub fn set_footer(&mut self, footer: &str) -> Result<CmdResult> {
        let result = commands::edit::set_footer(&mut self.notebook, footer)?;
        self.commit(result)
    }

    pub fn new_from_template(
        &mut self,
        parent: &str,
        title: &str,
        template: &str,
    ) -> Result<CmdResult> {
        let parent = parse_path(parent)?;
        let result =
            commands::edit::new_from_template(&mut self.notebook, &parent, title, template)?;
        self.commit(result)
    }

    // --- reading ---

    pub fn tree(&self) -> Result<CmdResult> {
        commands::view::tree(&self.notebook)
    }

    pub fn show(&mut self, path: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        let index = self.index.refresh(&self.notebook.tree);
        commands::view::show(&self.notebook, index, &path)
    }

    fn query(&self, term: &str, match_case: Option<bool>, exact_title: bool) -> SearchQuery {
        let query = SearchQuery::new(term)
            .match_case(match_case.unwrap_or(self.config.search_match_case));
        if exact_title {
            query.exact_title()
        } else {
            query
        }
    }

    /// `match_case` of `None` falls back to the `search_match_case` setting.
    pub fn search(
        &mut self,
        term: &str,
        match_case: Option<bool>,
        exact_title: bool,
    ) -> Result<CmdResult> {
        let query = self.query(term, match_case, exact_title);
        commands::search::run(&mut self.index, &self.notebook.tree, &query)
    }

    pub fn search_filtered(
        &mut self,
        term: &str,
        match_case: Option<bool>,
        exact_title: bool,
        filter: &SearchFilter,
    ) -> Result<CmdResult> {
        let query = self.query(term, match_case, exact_title);
        commands::search::filtered(&mut self.index, &self.notebook.tree, &query, filter)
    }

    // --- import / export ---

    pub fn export_page_json(&self, path: &str) -> Result<CmdResult> {
        let path = parse_path(path)?;
        commands::export::page_json(&self.notebook, &path)
    }

    pub fn import_page_json(&mut self, parent: &str, json: &str) -> Result<CmdResult> {
        let parent = parse_path(parent)?;
        let result = commands::import::page_json(&mut self.notebook, &parent, json)?;
        self.commit(result)
    }

    pub fn import_text(&mut self, parent: &str, title: &str, content: &str) -> Result<CmdResult> {
        let parent = parse_path(parent)?;
        let result = commands::import::text(&mut self.notebook, &parent, title, content)?;
        self.commit(result)
    }

    pub fn export_archive<W: Write>(&mut self, writer: W) -> Result<CmdResult> {
        let index = self.index.refresh(&self.notebook.tree);
        commands::export::archive(&self.notebook, index, writer)
    }

    pub fn export_single_file(&self, title: &str) -> Result<CmdResult> {
        commands::export::single_file(&self.notebook, title)
    }

    // --- registries ---

    pub fn add_image(&mut self, name: &str, bytes: Vec<u8>) -> Result<CmdResult> {
        let result = commands::images::add(&mut self.notebook, name, bytes)?;
        self.commit(result)
    }

    pub fn remove_image(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::images::remove(&mut self.notebook, name)?;
        self.commit(result)
    }

    pub fn rename_image(&mut self, old: &str, new: &str) -> Result<CmdResult> {
        let result = commands::images::rename(&mut self.notebook, old, new)?;
        self.commit(result)
    }

    pub fn list_images(&self) -> Result<CmdResult> {
        commands::images::list(&self.notebook)
    }

    pub fn add_template(&mut self, name: &str, content: &str, replace: bool) -> Result<CmdResult> {
        let result = commands::templates::add(&mut self.notebook, name, content, replace)?;
        self.commit(result)
    }

    pub fn remove_template(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::templates::remove(&mut self.notebook, name)?;
        self.commit(result)
    }

    pub fn list_templates(&self) -> Result<CmdResult> {
        commands::templates::list(&self.notebook)
    }

    pub fn show_template(&self, name: &str) -> Result<CmdResult> {
        commands::templates::show(&self.notebook, name)
    }

    // --- maintenance ---

    pub fn doctor(&self) -> Result<CmdResult> {
        commands::doctor::run(&self.notebook)
    }

    pub fn config_action(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.config, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::NotebookFixture;
    use crate::store::memory::MemoryStore;

    fn api_with(fixture: NotebookFixture) -> NotebookApi<MemoryStore> {
        NotebookApi::open(fixture.store(), NotebookConfig::default()).unwrap()
    }

    #[test]
    fn test_open_empty_store_uses_config() {
        let config = NotebookConfig {
            root_title: "Lab Book".to_string(),
            default_header: "# {PAGETITLE}".to_string(),
            ..Default::default()
        };
        let api = NotebookApi::open(MemoryStore::new(), config).unwrap();
        assert!(!api.is_initialized());
        let root = api.notebook().tree.root();
        assert_eq!(api.notebook().tree.get(root).unwrap().title, "Lab Book");
        assert_eq!(api.notebook().header, "# {PAGETITLE}");
    }

    #[test]
    fn test_init_saves_once() {
        let mut api = NotebookApi::open(MemoryStore::new(), NotebookConfig::default()).unwrap();
        let result = api.init().unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert!(api.is_initialized());
        let again = api.init().unwrap();
        assert_eq!(again.messages[0].level, MessageLevel::Info);
        assert_eq!(api.store().saves(), 1);
    }

    #[test]
    fn test_changes_are_saved_and_rejections_are_not() {
        let mut api = api_with(NotebookFixture::sample());
        api.add_page("0.1", "B1", "").unwrap();
        assert_eq!(api.store().saves(), 1);
        api.move_page("0.2", 1).unwrap();
        assert_eq!(api.store().saves(), 1);

        let stored = api.store().load().unwrap().unwrap();
        assert_eq!(stored.tree.page_count(), 7);
    }

    #[test]
    fn test_invalid_path_is_an_api_error() {
        let mut api = api_with(NotebookFixture::sample());
        let err = api.delete_page("a.b").unwrap_err();
        assert!(matches!(err, NotebookError::Api(_)));
    }

    #[test]
    fn test_search_sees_latest_write() {
        let mut api = api_with(NotebookFixture::sample());
        let before = api.search("zebra", None, false).unwrap();
        assert!(before.search.unwrap().is_empty());

        api.set_content("0.2", "a zebra").unwrap();
        let after = api.search("zebra", None, false).unwrap();
        assert_eq!(after.search.unwrap().results[0].title, "C");
    }

    #[test]
    fn test_search_match_case_defaults_to_config() {
        let config = NotebookConfig {
            search_match_case: true,
            ..Default::default()
        };
        let mut api =
            NotebookApi::open(NotebookFixture::sample().store(), config).unwrap();
        assert!(api.search("c BODY", None, false).unwrap().search.unwrap().is_empty());
        let folded = api.search("c BODY", Some(false), false).unwrap();
        assert_eq!(folded.search.unwrap().total_pages, 1);
    }

    #[test]
    fn test_show_refreshes_backlinks() {
        let mut api = api_with(
            NotebookFixture::sample().with_header_footer("", "{LINKINGPAGES}"),
        );
        let before = api.show("0.1").unwrap().output.unwrap();
        assert!(before.ends_with("No linking pages."));

        api.set_content("0.2", "see [B]([0,1])").unwrap();
        let after = api.show("0.1").unwrap().output.unwrap();
        assert!(after.ends_with("[C]([0,2])"));
    }

    #[test]
    fn test_config_action() {
        let api = api_with(NotebookFixture::new());
        let result = api
            .config_action(ConfigAction::ShowKey("root_title".into()))
            .unwrap();
        assert_eq!(result.output.as_deref(), Some("New Notebook"));
    }
}
