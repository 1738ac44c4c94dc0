//! Image registry management.
//!
//! Pages reference images by filename (`![alt](photo.png)`), so renaming an image
//! rewrites those references in every page. Removing one leaves references dangling;
//! `doctor` reports them.

use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;
use tracing::{debug, warn};

pub fn add(notebook: &mut Notebook, name: &str, bytes: Vec<u8>) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(CmdResult::rejected("Image name cannot be empty"));
    }
    if let Some(existing) = notebook.images.key_for(name) {
        warn!(name, existing, "image name already taken");
        return Ok(CmdResult::rejected(format!(
            "An image named \"{}\" already exists",
            existing
        )));
    }
    let size = bytes.len();
    notebook.images.insert(name, bytes);

    let mut result = CmdResult::default().with_changed(true);
    result.add_message(CmdMessage::success(format!(
        "Added image \"{}\" ({})",
        name,
        human_size(size)
    )));
    Ok(result)
}

pub fn remove(notebook: &mut Notebook, name: &str) -> Result<CmdResult> {
    let Some(key) = notebook.images.key_for(name).map(str::to_string) else {
        return Ok(CmdResult::rejected(format!("No image named \"{}\"", name)));
    };
    notebook.images.remove(&key);
    let mut result = CmdResult::default().with_changed(true);
    result.add_message(CmdMessage::success(format!("Removed image \"{}\"", key)));
    Ok(result)
}

/// Renames an image and repoints `](old)` / `](old "title")` references to it.
pub fn rename(notebook: &mut Notebook, old: &str, new: &str) -> Result<CmdResult> {
    let new = new.trim();
    let Some(old_key) = notebook.images.key_for(old).map(str::to_string) else {
        return Ok(CmdResult::rejected(format!("No image named \"{}\"", old)));
    };
    if old_key == new {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("Name unchanged"));
        return Ok(result);
    }
    if !notebook.images.rename(&old_key, new) {
        return Ok(CmdResult::rejected(format!(
            "Cannot rename \"{}\" to \"{}\"",
            old_key, new
        )));
    }

    let rewritten = rewrite_image_references(notebook, &old_key, new);
    debug!(old = %old_key, new, rewritten, "renamed image");

    let mut result = CmdResult::default().with_changed(true);
    result.add_message(CmdMessage::success(format!(
        "Renamed image \"{}\" to \"{}\"",
        old_key, new
    )));
    if rewritten > 0 {
        result.add_message(CmdMessage::info(format!(
            "Updated references in {}",
            plural(rewritten, "page")
        )));
    }
    Ok(result)
}

fn rewrite_image_references(notebook: &mut Notebook, old: &str, new: &str) -> usize {
    let patterns = [
        (format!("]({})", old), format!("]({})", new)),
        (format!("]({} \"", old), format!("]({} \"", new)),
    ];
    let mut pages = 0;
    for id in notebook.tree.pre_order() {
        let Some(content) = notebook.tree.get(id).map(|node| node.content.clone()) else {
            continue;
        };
        let mut updated = content.clone();
        for (from, to) in &patterns {
            updated = updated.replace(from.as_str(), to);
        }
        if updated != content {
            notebook.tree.set_content(id, updated);
            pages += 1;
        }
    }
    pages
}

/// Image names with their sizes, in display order.
pub fn list(notebook: &Notebook) -> Result<CmdResult> {
    let names: Vec<String> = notebook
        .images
        .names()
        .into_iter()
        .map(|name| {
            let size = notebook.images.get(name).map(Vec::len).unwrap_or_default();
            format!("{} ({})", name, human_size(size))
        })
        .collect();
    let mut result = CmdResult::default().with_names(names);
    if result.names.is_empty() {
        result.add_message(CmdMessage::info("No images"));
    }
    Ok(result)
}

fn human_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}
