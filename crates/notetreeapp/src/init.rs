//! # Locating the Notebook
//!
//! Notetree keeps one notebook file and one optional config file, both in
//! OS-appropriate directories (via the `directories` crate):
//!
//! ```text
//! <config dir>/notetree.toml
//! <data dir>/notebook.json
//! ```
//!
//! ## Resolution Order
//!
//! The notebook file is, in priority order:
//!
//! 1. the `--file` override passed by the caller,
//! 2. the `notebook_file` config key,
//! 3. `notebook.json` in the data directory.
//!
//! ## Data Directory Override
//!
//! `NOTETREE_DATA`, when set, replaces the data directory **and** the config directory,
//! so a test (or a portable install) is fully isolated in one folder.

use crate::api::NotebookApi;
use crate::config::{NotebookConfig, CONFIG_FILE_NAME};
use crate::error::{NotebookError, Result};
use crate::store::fs::FileStore;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATA_ENV: &str = "NOTETREE_DATA";
pub const NOTEBOOK_FILE_NAME: &str = "notebook.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookPaths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub notebook_file: PathBuf,
}

pub struct NotebookContext {
    pub api: NotebookApi<FileStore>,
    pub config: NotebookConfig,
    pub paths: NotebookPaths,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "notetree", "notetree")
        .ok_or_else(|| NotebookError::Config("Could not determine a home directory".into()))
}

fn data_override() -> Option<PathBuf> {
    std::env::var_os(DATA_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn data_dir() -> Result<PathBuf> {
    match data_override() {
        Some(dir) => Ok(dir),
        None => Ok(project_dirs()?.data_dir().to_path_buf()),
    }
}

pub fn config_file() -> Result<PathBuf> {
    match data_override() {
        Some(dir) => Ok(dir.join(CONFIG_FILE_NAME)),
        None => Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME)),
    }
}

/// Applies the resolution order above. Relative config paths are taken as relative to
/// the data directory.
pub fn resolve_notebook_file(
    file_override: Option<&Path>,
    config: &NotebookConfig,
    data_dir: &Path,
) -> PathBuf {
    if let Some(file) = file_override {
        return file.to_path_buf();
    }
    match &config.notebook_file {
        Some(file) if file.is_absolute() => file.clone(),
        Some(file) => data_dir.join(file),
        None => data_dir.join(NOTEBOOK_FILE_NAME),
    }
}

/// Loads config, resolves paths and opens the notebook.
pub fn initialize(file_override: Option<&Path>) -> Result<NotebookContext> {
    let data_dir = data_dir()?;
    let config_file = config_file()?;
    let config = NotebookConfig::load(Some(&config_file))?;
    let notebook_file = resolve_notebook_file(file_override, &config, &data_dir);
    debug!(
        notebook = %notebook_file.display(),
        config = %config_file.display(),
        "resolved notebook paths"
    );

    let api = NotebookApi::open(FileStore::new(&notebook_file), config.clone())?;
    Ok(NotebookContext {
        api,
        config,
        paths: NotebookPaths {
            data_dir,
            config_file,
            notebook_file,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_override_wins() {
        let config = NotebookConfig {
            notebook_file: Some(PathBuf::from("/elsewhere/book.json")),
            ..Default::default()
        };
        let file = resolve_notebook_file(
            Some(Path::new("/flag/book.json")),
            &config,
            Path::new("/data"),
        );
        assert_eq!(file, PathBuf::from("/flag/book.json"));
    }

    #[test]
    fn test_config_key_then_default() {
        let config = NotebookConfig {
            notebook_file: Some(PathBuf::from("/elsewhere/book.json")),
            ..Default::default()
        };
        let data = Path::new("/data");
        assert_eq!(
            resolve_notebook_file(None, &config, data),
            PathBuf::from("/elsewhere/book.json")
        );

        let relative = NotebookConfig {
            notebook_file: Some(PathBuf::from("work.json")),
            ..Default::default()
        };
        assert_eq!(
            resolve_notebook_file(None, &relative, data),
            data.join("work.json")
        );
        assert_eq!(
            resolve_notebook_file(None, &NotebookConfig::default(), data),
            data.join(NOTEBOOK_FILE_NAME)
        );
    }

    #[test]
    fn test_initialize_with_file_override() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("nested").join("book.json");
        let mut ctx = initialize(Some(&file)).unwrap();
        assert_eq!(ctx.paths.notebook_file, file);
        assert!(!ctx.api.is_initialized());

        ctx.api.init().unwrap();
        assert!(file.exists());
    }
}
