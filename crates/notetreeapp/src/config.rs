//! # Configuration
//!
//! Notetree configuration is loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `NOTETREE_ROOT_TITLE`, `NOTETREE_SEARCH_MATCH_CASE`, ...
//! 2. **Config file**: `notetree.toml` in the OS-appropriate config directory (via the
//!    `directories` crate), or an explicit file given by the caller.
//! 3. **Compiled defaults**: the `#[config(default = ...)]` values below.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `notebook_file` | *(unset)* | Notebook JSON file; falls back to `<data dir>/notebook.json` |
//! | `root_title` | `New Notebook` | Root page title for new notebooks |
//! | `default_header` | `""` | Header template for new notebooks |
//! | `default_footer` | `""` | Footer template for new notebooks |
//! | `search_match_case` | `false` | Whether searches match case by default |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "notetree.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NotebookConfig {
    /// Notebook JSON file. When unset, `notebook.json` in the data directory is used.
    #[config(env = "NOTETREE_NOTEBOOK_FILE")]
    pub notebook_file: Option<PathBuf>,

    /// Title given to the root page of a newly created notebook.
    #[config(default = "New Notebook", env = "NOTETREE_ROOT_TITLE")]
    pub root_title: String,

    /// Header template for new notebooks. Supports {PAGETITLE}, {SUBPAGELINKS},
    /// {SUBPAGEOFLINK} and {LINKINGPAGES}.
    #[config(default = "", env = "NOTETREE_DEFAULT_HEADER")]
    pub default_header: String,

    /// Footer template for new notebooks.
    #[config(default = "", env = "NOTETREE_DEFAULT_FOOTER")]
    pub default_footer: String,

    /// Match case in searches unless overridden per query.
    #[config(default = false, env = "NOTETREE_SEARCH_MATCH_CASE")]
    pub search_match_case: bool,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            notebook_file: None,
            root_title: crate::notebook::DEFAULT_ROOT_TITLE.to_string(),
            default_header: String::new(),
            default_footer: String::new(),
            search_match_case: false,
        }
    }
}

impl NotebookConfig {
    /// Loads from the environment, then `file` (when it exists), then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = NotebookConfig::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    /// A commented sample `notetree.toml`.
    pub fn template() -> String {
        confique::toml::template::<NotebookConfig>(confique::toml::FormatOptions::default())
    }

    /// `(key, value)` pairs for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "notebook_file",
                self.notebook_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            ("root_title", self.root_title.clone()),
            ("default_header", self.default_header.clone()),
            ("default_footer", self.default_footer.clone()),
            ("search_match_case", self.search_match_case.to_string()),
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}
