//! Structural edits. Every successful one runs inside a link rewrite, so page links
//! keep pointing at the same pages and links into deleted subtrees are severed.
//!
//! Each command also reports the page the UI should select afterwards:
//!
//! - **add**: the new page.
//! - **delete**: the next sibling slides into the freed slot; deleting the last sibling
//!   selects the previous one; deleting an only child selects the parent.
//! - **move / promote / demote**: the page itself at its new path.

use crate::commands::{
    links_updated_message, missing_page, path_of, plural, title_of, CmdMessage, CmdResult,
};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::rewrite::{rewrite_around, RewriteScope};
use tracing::{debug, warn};

pub fn add(
    notebook: &mut Notebook,
    parent: &PagePath,
    title: &str,
    content: &str,
) -> Result<CmdResult> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(CmdResult::rejected("Page title cannot be empty"));
    }
    if notebook.tree.page_from_path(parent).is_none() {
        return Ok(missing_page(parent));
    }

    let (added, rewritten) = rewrite_around(&mut notebook.tree, RewriteScope::Notebook, |tree| {
        let id = tree.create_page(title, content);
        tree.add_sub_page(parent, id).then_some(id)
    });
    let Some(id) = added else {
        warn!(parent = %parent, "add rejected by tree");
        return Ok(missing_page(parent));
    };

    let path = path_of(notebook, id);
    debug!(parent = %parent, title, "added page");
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(path.clone());
    result.add_message(CmdMessage::success(format!(
        "Added \"{}\" at {}",
        title,
        path.map(|p| p.to_dotted()).unwrap_or_default()
    )));
    if let Some(message) = links_updated_message(rewritten) {
        result.add_message(message);
    }
    Ok(result)
}

/// The path to select once the page at `path` is gone, computed before deleting.
fn selection_after_delete(notebook: &Notebook, path: &PagePath) -> Option<PagePath> {
    let parent = notebook.tree.parent_from_path(path)?;
    let siblings = notebook.tree.get(parent)?.children().len();
    let index = path.last_index()?;
    let parent_path = path.parent()?;
    if siblings <= 1 {
        Some(parent_path)
    } else if index + 1 == siblings {
        path.sibling(index - 1)
    } else {
        Some(path.clone())
    }
}

pub fn delete(notebook: &mut Notebook, path: &PagePath) -> Result<CmdResult> {
    if path.is_root() {
        return Ok(CmdResult::rejected("The root page cannot be deleted"));
    }
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let title = title_of(notebook, id);
    let pages = notebook.tree.subtree(id).len();
    let selected = selection_after_delete(notebook, path);

    let (removed, rewritten) = rewrite_around(&mut notebook.tree, RewriteScope::Notebook, |tree| {
        tree.delete_sub_page(path)
    });
    if removed.is_none() {
        warn!(path = %path, "delete rejected by tree");
        return Ok(missing_page(path));
    }

    debug!(path = %path, pages, "deleted subtree");
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(selected);
    let detail = if pages > 1 {
        format!(" and {}", plural(pages - 1, "sub page"))
    } else {
        String::new()
    };
    result.add_message(CmdMessage::success(format!("Deleted \"{}\"{}", title, detail)));
    if let Some(message) = links_updated_message(rewritten) {
        result.add_message(message);
    }
    Ok(result)
}

pub fn move_page(notebook: &mut Notebook, path: &PagePath, delta: isize) -> Result<CmdResult> {
    if path.is_root() {
        return Ok(CmdResult::rejected("The root page cannot be moved"));
    }
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let title = title_of(notebook, id);

    let (moved, rewritten) = rewrite_around(&mut notebook.tree, RewriteScope::Notebook, |tree| {
        tree.move_sub_page(path, delta)
    });
    if !moved {
        let direction = if delta < 0 { "up" } else { "down" };
        return Ok(CmdResult::rejected(format!(
            "Cannot move \"{}\" {} by {}",
            title,
            direction,
            delta.unsigned_abs()
        )));
    }

    let new_path = path_of(notebook, id);
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(new_path.clone());
    result.add_message(CmdMessage::success(format!(
        "Moved \"{}\" to {}",
        title,
        new_path.map(|p| p.to_dotted()).unwrap_or_default()
    )));
    if let Some(message) = links_updated_message(rewritten) {
        result.add_message(message);
    }
    Ok(result)
}

pub fn promote(notebook: &mut Notebook, path: &PagePath) -> Result<CmdResult> {
    if path.is_root() {
        return Ok(CmdResult::rejected("The root page cannot be promoted"));
    }
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let title = title_of(notebook, id);
    if path.depth() <= 2 {
        return Ok(CmdResult::rejected(format!(
            "\"{}\" is already a top-level page; a notebook has exactly one root",
            title
        )));
    }

    let (promoted, rewritten) = rewrite_around(&mut notebook.tree, RewriteScope::Notebook, |tree| {
        tree.promote_sub_page(path)
    });
    if !promoted {
        warn!(path = %path, "promote rejected by tree");
        return Ok(CmdResult::rejected(format!("Cannot promote \"{}\"", title)));
    }

    let new_path = path_of(notebook, id);
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(new_path.clone());
    result.add_message(CmdMessage::success(format!(
        "Promoted \"{}\" to {}",
        title,
        new_path.map(|p| p.to_dotted()).unwrap_or_default()
    )));
    if let Some(message) = links_updated_message(rewritten) {
        result.add_message(message);
    }
    Ok(result)
}

pub fn demote(notebook: &mut Notebook, path: &PagePath, sibling_index: usize) -> Result<CmdResult> {
    if path.is_root() {
        return Ok(CmdResult::rejected("The root page cannot be demoted"));
    }
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let title = title_of(notebook, id);
    let siblings = notebook
        .tree
        .get(id)
        .and_then(|node| node.parent())
        .and_then(|parent| notebook.tree.get(parent))
        .map(|parent| parent.children().len())
        .unwrap_or(0);
    if siblings < 2 {
        return Ok(CmdResult::rejected(format!(
            "\"{}\" has no sibling to demote into",
            title
        )));
    }
    if path.last_index() == Some(sibling_index) || sibling_index >= siblings {
        return Ok(CmdResult::rejected(format!(
            "Sibling {} is not a valid target for \"{}\"",
            sibling_index, title
        )));
    }
    let new_parent = path.sibling(sibling_index).and_then(|p| notebook.tree.page_from_path(&p));

    let (demoted, rewritten) = rewrite_around(&mut notebook.tree, RewriteScope::Notebook, |tree| {
        tree.demote_sub_page(path, sibling_index)
    });
    if !demoted {
        warn!(path = %path, sibling_index, "demote rejected by tree");
        return Ok(CmdResult::rejected(format!("Cannot demote \"{}\"", title)));
    }

    let new_path = path_of(notebook, id);
    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(new_path);
    result.add_message(CmdMessage::success(format!(
        "Moved \"{}\" under \"{}\"",
        title,
        new_parent.map(|p| title_of(notebook, p)).unwrap_or_default()
    )));
    if let Some(message) = links_updated_message(rewritten) {
        result.add_message(message);
    }
    Ok(result)
}
