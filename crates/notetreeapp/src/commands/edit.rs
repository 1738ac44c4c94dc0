use crate::commands::{missing_page, structure, title_of, CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::path::PagePath;

pub fn set_title(notebook: &mut Notebook, path: &PagePath, title: &str) -> Result<CmdResult> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(CmdResult::rejected("Page title cannot be empty"));
    }
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let old = title_of(notebook, id);
    if old == title {
        let mut result = CmdResult::default().with_selected(Some(path.clone()));
        result.add_message(CmdMessage::info("Title unchanged"));
        return Ok(result);
    }
    notebook.tree.set_title(id, title);

    let mut result = CmdResult::default()
        .with_changed(true)
        .with_selected(Some(path.clone()));
    result.add_message(CmdMessage::success(format!(
        "Renamed \"{}\" to \"{}\"",
        old, title
    )));
    Ok(result)
}

pub fn set_content(notebook: &mut Notebook, path: &PagePath, content: &str) -> Result<CmdResult> {
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let changed = notebook
        .tree
        .get(id)
        .is_some_and(|node| node.content != content);
    if changed {
        notebook.tree.set_content(id, content);
    }
    let mut result = CmdResult::default()
        .with_changed(changed)
        .with_selected(Some(path.clone()));
    if changed {
        result.add_message(CmdMessage::success(format!(
            "Updated \"{}\"",
            title_of(notebook, id)
        )));
    }
    Ok(result)
}

pub fn set_header(notebook: &mut Notebook, header: &str) -> Result<CmdResult> {
    let changed = notebook.header != header;
    notebook.header = header.to_string();
    let mut result = CmdResult::default().with_changed(changed);
    result.add_message(CmdMessage::success("Header updated"));
    Ok(result)
}

pub fn set_footer(notebook: &mut Notebook, footer: &str) -> Result<CmdResult> {
    let changed = notebook.footer != footer;
    notebook.footer = footer.to_string();
    let mut result = CmdResult::default().with_changed(changed);
    result.add_message(CmdMessage::success("Footer updated"));
    Ok(result)
}

/// Adds a page whose content is a copy of the named template.
pub fn new_from_template(
    notebook: &mut Notebook,
    parent: &PagePath,
    title: &str,
    template: &str,
) -> Result<CmdResult> {
    let Some(content) = notebook.templates.get(template).cloned() else {
        return Ok(CmdResult::rejected(format!(
            "No template named \"{}\"",
            template
        )));
    };
    structure::add(notebook, parent, title, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::NotebookFixture;
    use crate::tree::tests::{p, title_at};

    #[test]
    fn test_set_title() {
        let mut nb = NotebookFixture::sample().build();
        let result = set_title(&mut nb, &p(&[0, 1]), "  Bee ").unwrap();
        assert!(result.changed);
        assert_eq!(title_at(&nb.tree, &[0, 1]), "Bee");
        assert!(result.messages[0].content.contains("\"B\" to \"Bee\""));
    }

    #[test]
    fn test_set_title_rejections() {
        let mut nb = NotebookFixture::sample().build();
        assert!(!set_title(&mut nb, &p(&[0, 1]), "").unwrap().changed);
        assert!(!set_title(&mut nb, &p(&[0, 7]), "x").unwrap().changed);
        let same = set_title(&mut nb, &p(&[0, 1]), "B").unwrap();
        assert!(!same.changed);
        assert!(!same.has_warnings());
    }

    #[test]
    fn test_set_content_reports_change_only_when_different() {
        let mut nb = NotebookFixture::sample().build();
        assert!(!set_content(&mut nb, &p(&[0, 2]), "C body").unwrap().changed);
        assert!(set_content(&mut nb, &p(&[0, 2]), "new").unwrap().changed);
        let id = nb.tree.page_from_path(&p(&[0, 2])).unwrap();
        assert_eq!(nb.tree.get(id).unwrap().content, "new");
    }

    #[test]
    fn test_header_and_footer() {
        let mut nb = NotebookFixture::sample().build();
        assert!(set_header(&mut nb, "# {PAGETITLE}").unwrap().changed);
        assert!(!set_header(&mut nb, "# {PAGETITLE}").unwrap().changed);
        assert!(set_footer(&mut nb, "{LINKINGPAGES}").unwrap().changed);
        assert_eq!(nb.footer, "{LINKINGPAGES}");
    }

    #[test]
    fn test_new_from_template() {
        let mut nb = NotebookFixture::sample().build();
        nb.templates
            .insert("Meeting", "## Attendees\n\n## Notes\n".to_string());
        let result = new_from_template(&mut nb, &p(&[0]), "Standup", "meeting").unwrap();
        assert!(result.changed);
        let id = nb.tree.page_from_path(&p(&[0, 3])).unwrap();
        assert_eq!(nb.tree.get(id).unwrap().content, "## Attendees\n\n## Notes\n");

        let missing = new_from_template(&mut nb, &p(&[0]), "X", "nope").unwrap();
        assert!(!missing.changed);
        assert_eq!(title_at(&nb.tree, &[0, 3]), "Standup");
    }
}
