//! Bringing pages in from outside the notebook.
//!
//! A page exported with [`crate::commands::export::page_json`] carries the paths its
//! pages had in the source notebook. After grafting it under a new parent, links
//! between pages of the imported subtree are retargeted to the new paths; the rewrite
//! is scoped to the subtree so the rest of the notebook is untouched. Links from the
//! imported pages to pages outside the subtree are left as written.

use crate::commands::{missing_page, path_of, plural, structure, CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::{Notebook, PersistedPage};
use crate::path::PagePath;
use crate::rewrite::{LinkBindings, RewritePlan, RewriteScope};
use tracing::debug;

pub fn page_json(notebook: &mut Notebook, parent: &PagePath, json: &str) -> Result<CmdResult> {
    let page: PersistedPage = serde_json::from_str(json)?;
    if notebook.tree.page_from_path(parent).is_none() {
        return Ok(missing_page(parent));
    }
    let Some((id, before)) = notebook.graft(parent, &page) else {
        return Ok(missing_page(parent));
    };

    let after = LinkBindings::capture_subtree(&notebook.tree, id);
    let plan = RewritePlan::retarget_only(&before, &after);
    let rewritten = plan.apply(&mut notebook.tree, RewriteScope::Subtree(id));
    let pages = notebook.tree.subtree(id).len();
    debug!(parent = %parent, pages, rewritten, "imported page subtree");

    let path = path_of(notebook, id);
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(path.clone());
    result.add_message(CmdMessage::success(format!(
        "Imported \"{}\" ({}) at {}",
        page.title,
        plural(pages, "page"),
        path.map(|p| p.to_dotted()).unwrap_or_default()
    )));
    if rewritten > 0 {
        result.add_message(CmdMessage::info(format!(
            "Relinked {}",
            plural(rewritten, "imported page")
        )));
    }
    Ok(result)
}

/// Adds a page from an already converted Markdown string.
pub fn text(
    notebook: &mut Notebook,
    parent: &PagePath,
    title: &str,
    content: &str,
) -> Result<CmdResult> {
    structure::add(notebook, parent, title, content)
}
