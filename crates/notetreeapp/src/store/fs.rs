use super::NotebookStore;
use crate::error::{NotebookError, Result};
use crate::notebook::Notebook;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(NotebookError::Io)?;
            }
        }
        Ok(())
    }
}

impl NotebookStore for FileStore {
    fn load(&self) -> Result<Option<Notebook>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(NotebookError::Io)?;
        let notebook = Notebook::from_json(&content)?;
        info!(path = %self.path.display(), "loaded notebook");
        Ok(Some(notebook))
    }

    fn save(&mut self, notebook: &Notebook) -> Result<()> {
        self.ensure_parent()?;
        let content = notebook.to_json()?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp_file = dir.join(format!(".notebook-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(NotebookError::Io)?;
        if let Err(err) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(NotebookError::Io(err));
        }
        info!(path = %self.path.display(), "saved notebook");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
