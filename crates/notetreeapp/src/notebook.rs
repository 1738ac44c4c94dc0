//! # Notebook
//!
//! The [`Notebook`] aggregate: one page tree, the header/footer templates wrapped around
//! every page on display, and the image and template registries.
//!
//! ## Persisted Shape
//!
//! ```json
//! {
//!   "Header": "# {PAGETITLE}",
//!   "Footer": "",
//!   "RootPage": {
//!     "Title": "New Notebook",
//!     "Content": "",
//!     "IndexPath": [0],
//!     "SubPages": [ { "Title": "Ideas", "Content": "...", "IndexPath": [0,0], "SubPages": [] } ]
//!   },
//!   "Images": { "diagram.png": "<base64>" },
//!   "PageTemplates": { "Meeting": "## Attendees\n" }
//! }
//! ```
//!
//! `IndexPath` is written for every page but never trusted on load: paths are
//! recomputed from the tree structure right after deserialization. The one place a
//! recorded path matters is page import, where it tells us which link targets the
//! page's content was written against (see [`Notebook::graft`]).
//!
//! A file that fails to parse yields a single error; no partial notebook is built.

use crate::error::Result;
use crate::path::PagePath;
use crate::registry::{ImageRegistry, TemplateRegistry};
use crate::rewrite::LinkBindings;
use crate::tree::{PageId, PageTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_ROOT_TITLE: &str = "New Notebook";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistedPage {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "PagePath::root")]
    pub index_path: PagePath,
    #[serde(default)]
    pub sub_pages: Vec<PersistedPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistedNotebook {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub footer: String,
    pub root_page: PersistedPage,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    #[serde(default)]
    pub page_templates: TemplateRegistry,
}

#[derive(Debug, Clone)]
pub struct Notebook {
    pub header: String,
    pub footer: String,
    pub tree: PageTree,
    pub images: ImageRegistry,
    pub templates: TemplateRegistry,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TITLE)
    }
}

impl Notebook {
    pub fn new(root_title: impl Into<String>) -> Self {
        Self {
            header: String::new(),
            footer: String::new(),
            tree: PageTree::new(root_title),
            images: ImageRegistry::new(),
            templates: TemplateRegistry::new(),
        }
    }

    pub fn with_header_footer(
        mut self,
        header: impl Into<String>,
        footer: impl Into<String>,
    ) -> Self {
        self.header = header.into();
        self.footer = footer.into();
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let persisted: PersistedNotebook = serde_json::from_str(json)?;
        Self::from_persisted(persisted)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_persisted())?)
    }

    pub fn from_persisted(persisted: PersistedNotebook) -> Result<Self> {
        let images = ImageRegistry::decode(persisted.images)?;

        let root = persisted.root_page;
        let mut tree = PageTree::new(root.title);
        let root_id = tree.root();
        tree.set_content(root_id, root.content);
        for child in &root.sub_pages {
            let id = build_detached(&mut tree, child, None, &mut Vec::new());
            tree.link_child(root_id, id);
        }
        tree.recompute_paths();
        debug!(pages = tree.page_count(), images = images.len(), "loaded notebook");

        Ok(Self {
            header: persisted.header,
            footer: persisted.footer,
            tree,
            images,
            templates: persisted.page_templates,
        })
    }

    pub fn to_persisted(&self) -> PersistedNotebook {
        let root_page = self
            .persist_page(self.tree.root())
            .unwrap_or_else(|| PersistedPage {
                title: DEFAULT_ROOT_TITLE.to_string(),
                content: String::new(),
                index_path: PagePath::root(),
                sub_pages: Vec::new(),
            });
        let images = self.images.encode();
        PersistedNotebook {
            header: self.header.clone(),
            footer: self.footer.clone(),
            root_page,
            images,
            page_templates: self.templates.clone(),
        }
    }

    /// The persisted form of `id` and its descendants, with current paths recorded.
    pub fn persist_page(&self, id: PageId) -> Option<PersistedPage> {
        let node = self.tree.get(id)?;
        let sub_pages = node
            .children()
            .iter()
            .filter_map(|child| self.persist_page(*child))
            .collect();
        Some(PersistedPage {
            title: node.title.clone(),
            content: node.content.clone(),
            index_path: node.path().clone(),
            sub_pages,
        })
    }

    /// Attaches a persisted subtree as the last child of `parent_path`.
    ///
    /// Returns the new subtree root together with the link targets the subtree's
    /// content was written against: the recorded `IndexPath` of its root, extended
    /// by child position for each descendant. Diffing those against the pages'
    /// new targets relocalizes links inside the subtree.
    pub fn graft(
        &mut self,
        parent_path: &PagePath,
        page: &PersistedPage,
    ) -> Option<(PageId, LinkBindings)> {
        self.tree.page_from_path(parent_path)?;

        let recorded_root = page.index_path.is_well_formed().then(|| page.index_path.clone());
        let mut recorded = Vec::new();
        let id = build_detached(&mut self.tree, page, recorded_root, &mut recorded);
        if !self.tree.add_sub_page(parent_path, id) {
            return None;
        }
        let before = LinkBindings::from_targets(
            recorded
                .into_iter()
                .map(|(id, path)| (id, path.link_target())),
        );
        Some((id, before))
    }
}

/// Builds a detached copy of `page` in the arena. When `recorded` is given, each
/// created page's recorded path is pushed to `out`.
fn build_detached(
    tree: &mut PageTree,
    page: &PersistedPage,
    recorded: Option<PagePath>,
    out: &mut Vec<(PageId, PagePath)>,
) -> PageId {
    let id = tree.create_page(page.title.clone(), page.content.clone());
    if let Some(path) = &recorded {
        out.push((id, path.clone()));
    }
    for (i, child) in page.sub_pages.iter().enumerate() {
        let child_recorded = recorded.as_ref().map(|path| path.child(i));
        let child_id = build_detached(tree, child, child_recorded, out);
        tree.link_child(id, child_id);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotebookError;
    use crate::tree::tests::{assert_paths_consistent, p, sample_tree, title_at};

    fn sample_notebook() -> Notebook {
        let mut notebook = Notebook::new("Root").with_header_footer("# {PAGETITLE}", "---");
        notebook.tree = sample_tree();
        notebook.images.insert("dot.png", vec![1, 2, 3]);
        notebook
            .templates
            .insert("Meeting", "## Attendees\n".to_string());
        notebook
    }

    #[test]
    fn test_new_notebook_defaults() {
        let notebook = Notebook::default();
        let root = notebook.tree.get(notebook.tree.root()).unwrap();
        assert_eq!(root.title, "New Notebook");
        assert_eq!(notebook.header, "");
        assert_eq!(notebook.footer, "");
        assert!(notebook.images.is_empty());
        assert!(notebook.templates.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let notebook = sample_notebook();
        let json = notebook.to_json().unwrap();
        let loaded = Notebook::from_json(&json).unwrap();

        assert_eq!(loaded.header, "# {PAGETITLE}");
        assert_eq!(loaded.footer, "---");
        assert_eq!(loaded.tree.page_count(), notebook.tree.page_count());
        assert_eq!(title_at(&loaded.tree, &[0, 0, 1]), "A2");
        assert_eq!(loaded.images.get("dot.png").unwrap(), &vec![1, 2, 3]);
        assert_eq!(loaded.templates.get("meeting").unwrap(), "## Attendees\n");
        assert_eq!(loaded.to_persisted().root_page, notebook.to_persisted().root_page);
        assert_paths_consistent(&loaded.tree);
    }

    #[test]
    fn test_reload_compacts_removed_slots() {
        let mut notebook = sample_notebook();
        assert!(notebook.tree.delete_sub_page(&p(&[0, 0])).is_some());
        let stale = notebook.tree.create_page("X", "");
        assert_eq!(stale.to_string(), "6");

        let mut loaded = Notebook::from_json(&notebook.to_json().unwrap()).unwrap();
        assert_eq!(loaded.tree.page_count(), 3);
        let fresh = loaded.tree.create_page("X", "");
        assert_eq!(fresh.to_string(), loaded.tree.page_count().to_string());
    }

    #[test]
    fn test_persisted_keys_are_pascal_case() {
        let json = sample_notebook().to_json().unwrap();
        for key in [
            "Header",
            "Footer",
            "RootPage",
            "IndexPath",
            "SubPages",
            "Images",
            "PageTemplates",
        ] {
            assert!(json.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
    }

    #[test]
    fn test_recorded_index_paths_are_not_trusted() {
        let json = r#"{
            "Header": "", "Footer": "",
            "RootPage": {
                "Title": "Root", "Content": "", "IndexPath": [7],
                "SubPages": [
                    { "Title": "A", "Content": "", "IndexPath": [9, 9], "SubPages": [] },
                    { "Title": "B", "Content": "", "IndexPath": [0, 0], "SubPages": [] }
                ]
            }
        }"#;
        let notebook = Notebook::from_json(json).unwrap();
        assert_eq!(title_at(&notebook.tree, &[0, 0]), "A");
        assert_eq!(title_at(&notebook.tree, &[0, 1]), "B");
        assert_paths_consistent(&notebook.tree);
    }

    #[test]
    fn test_missing_registries_default_to_empty() {
        let json = r#"{"Header":"h","Footer":"f","RootPage":{"Title":"R","Content":"","IndexPath":[0],"SubPages":[]}}"#;
        let notebook = Notebook::from_json(json).unwrap();
        assert!(notebook.images.is_empty());
        assert!(notebook.templates.is_empty());
    }

    #[test]
    fn test_malformed_json_is_one_error() {
        let err = Notebook::from_json(r#"{"RootPage": {"Title": 3}}"#).unwrap_err();
        assert!(matches!(err, NotebookError::Serialization(_)));
    }

    #[test]
    fn test_graft_records_relative_targets() {
        let mut notebook = Notebook::new("Root");
        let page = PersistedPage {
            title: "Imported".to_string(),
            content: "child: [C]([0,4,0])".to_string(),
            index_path: p(&[0, 4]),
            sub_pages: vec![PersistedPage {
                title: "C".to_string(),
                content: String::new(),
                index_path: p(&[3, 3]),
                sub_pages: Vec::new(),
            }],
        };
        let (id, before) = notebook.graft(&PagePath::root(), &page).unwrap();

        assert_eq!(notebook.tree.get(id).unwrap().path(), &p(&[0, 0]));
        assert_eq!(before.get(id), Some("]([0,4])"));
        let child = notebook.tree.get(id).unwrap().children()[0];
        // Derived from the root's recorded path, not the child's own IndexPath.
        assert_eq!(before.get(child), Some("]([0,4,0])"));
        assert_paths_consistent(&notebook.tree);
    }

    #[test]
    fn test_graft_rejects_missing_parent() {
        let mut notebook = Notebook::new("Root");
        let page = PersistedPage {
            title: "X".to_string(),
            content: String::new(),
            index_path: PagePath::root(),
            sub_pages: Vec::new(),
        };
        assert!(notebook.graft(&p(&[0, 3]), &page).is_none());
        assert_eq!(notebook.tree.page_count(), 1);
    }
}
