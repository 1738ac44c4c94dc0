use super::NotebookStore;
use crate::error::Result;
use crate::notebook::Notebook;

/// Holds the serialized document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notebook(notebook: &Notebook) -> Result<Self> {
        let mut store = Self::new();
        store.save(notebook)?;
        store.saves = 0;
        Ok(store)
    }

    /// Number of saves since construction.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl NotebookStore for MemoryStore {
    fn load(&self) -> Result<Option<Notebook>> {
        self.json.as_deref().map(Notebook::from_json).transpose()
    }

    fn save(&mut self, notebook: &Notebook) -> Result<()> {
        self.json = Some(notebook.to_json()?);
        self.saves += 1;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.json.is_some()
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::path::PagePath;

    /// Builds notebooks page by page, addressing parents by dotted path.
    pub struct NotebookFixture {
        pub notebook: Notebook,
    }

    impl Default for NotebookFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl NotebookFixture {
        pub fn new() -> Self {
            Self {
                notebook: Notebook::new("Root"),
            }
        }

        pub fn with_page(mut self, parent: &str, title: &str, content: &str) -> Self {
            let parent: PagePath = parent.parse().unwrap();
            let id = self.notebook.tree.create_page(title, content);
            assert!(
                self.notebook.tree.add_sub_page(&parent, id),
                "fixture parent {} does not exist",
                parent
            );
            self
        }

        pub fn with_header_footer(mut self, header: &str, footer: &str) -> Self {
            self.notebook.header = header.to_string();
            self.notebook.footer = footer.to_string();
            self
        }

        /// Root with A (children A1, A2), B and C.
        pub fn sample() -> Self {
            Self::new()
                .with_page("0", "A", "A body")
                .with_page("0", "B", "B body")
                .with_page("0", "C", "C body")
                .with_page("0.0", "A1", "")
                .with_page("0.0", "A2", "")
        }

        /// Two sibling pages linking to each other.
        pub fn linked_pair() -> Self {
            Self::new()
                .with_page("0", "A", "see [B]([0,1])")
                .with_page("0", "B", "see [A]([0,0])")
        }

        pub fn build(self) -> Notebook {
            self.notebook
        }

        pub fn store(self) -> MemoryStore {
            MemoryStore::with_notebook(&self.notebook).unwrap()
        }
    }
}
