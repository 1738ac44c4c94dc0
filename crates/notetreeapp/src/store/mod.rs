//! # Storage Layer
//!
//! A notebook is one JSON document (see [`crate::notebook`] for its shape). The
//! [`NotebookStore`] trait loads and saves that document as a whole; there is no
//! partial write and no incremental sync.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: a single file on disk, written atomically (temp file in the
//!   same directory, then rename), so a crash mid-save leaves the previous version.
//! - [`memory::MemoryStore`]: keeps the serialized JSON in memory. Tests go through
//!   the same serialization path as production.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! └── notebook.json
//! ```

use crate::error::Result;
use crate::notebook::Notebook;

pub mod fs;
pub mod memory;

pub trait NotebookStore {
    /// The stored notebook, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Notebook>>;

    /// Replace the stored notebook.
    fn save(&mut self, notebook: &Notebook) -> Result<()>;

    fn exists(&self) -> bool;

    /// Human-readable location, for messages.
    fn location(&self) -> String;
}
