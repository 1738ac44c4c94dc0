//! Consistency report over links and images. Read-only: nothing is repaired.

use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::links::{extract_links, LinkKind};
use crate::notebook::Notebook;
use std::collections::BTreeSet;
use tracing::warn;

fn is_remote(destination: &str) -> bool {
    destination.contains("://") || destination.starts_with("data:")
}

pub fn run(notebook: &Notebook) -> Result<CmdResult> {
    let mut findings = Vec::new();
    let mut referenced: BTreeSet<String> = BTreeSet::new();

    for id in notebook.tree.pre_order() {
        let Some(node) = notebook.tree.get(id) else {
            continue;
        };
        let at = node.path().to_dotted();
        for link in extract_links(&notebook.tree, &node.content) {
            match link.kind {
                LinkKind::Broken(target) => findings.push(format!(
                    "{} \"{}\": link \"{}\" points to missing page {}",
                    at, node.title, link.text, target
                )),
                LinkKind::Deleted => findings.push(format!(
                    "{} \"{}\": link \"{}\" points to a deleted page",
                    at, node.title, link.text
                )),
                LinkKind::Image(name) if !is_remote(&name) => {
                    match notebook.images.key_for(&name) {
                        Some(key) => {
                            referenced.insert(key.to_string());
                        }
                        None => findings.push(format!(
                            "{} \"{}\": image \"{}\" is not in the notebook",
                            at, node.title, name
                        )),
                    }
                }
                _ => {}
            }
        }
    }

    for name in notebook.images.names() {
        if !referenced.contains(name) {
            findings.push(format!("image \"{}\" is not used by any page", name));
        }
    }

    let mut result = CmdResult::default();
    if findings.is_empty() {
        result.add_message(CmdMessage::success("No problems found."));
        return Ok(result);
    }
    warn!(problems = findings.len(), "doctor found problems");
    result.add_message(CmdMessage::warning(format!(
        "Found {}",
        plural(findings.len(), "problem")
    )));
    Ok(result.with_names(findings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::NotebookFixture;

    #[test]
    fn test_clean_notebook() {
        let nb = NotebookFixture::linked_pair().build();
        let result = run(&nb).unwrap();
        assert!(result.names.is_empty());
        assert_eq!(result.messages[0].content, "No problems found.");
    }

    #[test]
    fn test_reports_link_and_image_problems() {
        let mut nb = NotebookFixture::new()
            .with_page("0", "A", "[x]([0,7]) [y]([deleted]) ![p](pic.png) ![q](gone.png)")
            .with_page("0", "B", "![remote](https://example.com/a.png)")
            .build();
        nb.images.insert("Pic.png", vec![1]);
        nb.images.insert("spare.png", vec![2]);

        let result = run(&nb).unwrap();
        assert!(result.has_warnings());
        assert_eq!(result.names.len(), 4);
        assert!(result.names[0].contains("missing page [0,7]"));
        assert!(result.names[1].contains("deleted page"));
        assert!(result.names[2].contains("\"gone.png\""));
        assert_eq!(result.names[3], "image \"spare.png\" is not used by any page");
    }
}
