use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;

/// Adds a template, or replaces the content of an existing one when `replace` is set.
pub fn add(notebook: &mut Notebook, name: &str, content: &str, replace: bool) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(CmdResult::rejected("Template name cannot be empty"));
    }
    if let Some(existing) = notebook.templates.key_for(name).map(str::to_string) {
        if !replace {
            return Ok(CmdResult::rejected(format!(
                "A template named \"{}\" already exists",
                existing
            )));
        }
        let changed = notebook.templates.get(&existing).map(String::as_str) != Some(content);
        notebook.templates.replace(&existing, content.to_string());
        let mut result = CmdResult::default().with_changed(changed);
        result.add_message(CmdMessage::success(format!(
            "Updated template \"{}\"",
            existing
        )));
        return Ok(result);
    }

    notebook.templates.insert(name, content.to_string());
    let mut result = CmdResult::default().with_changed(true);
    result.add_message(CmdMessage::success(format!("Added template \"{}\"", name)));
    Ok(result)
}

pub fn remove(notebook: &mut Notebook, name: &str) -> Result<CmdResult> {
    let Some(key) = notebook.templates.key_for(name).map(str::to_string) else {
        return Ok(CmdResult::rejected(format!("No template named \"{}\"", name)));
    };
    notebook.templates.remove(&key);
    let mut result = CmdResult::default().with_changed(true);
    result.add_message(CmdMessage::success(format!("Removed template \"{}\"", key)));
    Ok(result)
}

pub fn list(notebook: &Notebook) -> Result<CmdResult> {
    let names: Vec<String> = notebook
        .templates
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut result = CmdResult::default().with_names(names);
    if result.names.is_empty() {
        result.add_message(CmdMessage::info("No templates"));
    }
    Ok(result)
}

pub fn show(notebook: &Notebook, name: &str) -> Result<CmdResult> {
    match notebook.templates.get(name) {
        Some(content) => Ok(CmdResult::default().with_output(content.clone())),
        None => Ok(CmdResult::rejected(format!("No template named \"{}\"", name))),
    }
}
