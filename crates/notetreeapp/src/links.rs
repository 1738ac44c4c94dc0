//! Link classification over page content.
//!
//! Links are found with pulldown-cmark rather than by substring, so code spans and
//! escaped brackets are not mistaken for links. Rewriting (see [`crate::rewrite`])
//! still works on the literal `](...)` text; this module only reads.

use crate::error::{NotebookError, Result};
use crate::path::{decode_link_destination, PagePath, DELETED_TARGET};
use crate::tree::PageTree;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_to_cmark::cmark;

pub const NOT_FOUND_NOTE: &str = " (LINKED PAGE NOT FOUND)";
pub const DELETED_NOTE: &str = " (LINKED PAGE DELETED)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Resolves to a page in the tree.
    Internal(PagePath),
    /// Looks like a page path but resolves to nothing.
    Broken(String),
    /// Severed on purpose when its page was removed.
    Deleted,
    External(String),
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    pub text: String,
    pub kind: LinkKind,
}

impl LinkRef {
    pub fn is_unresolved(&self) -> bool {
        matches!(self.kind, LinkKind::Broken(_) | LinkKind::Deleted)
    }
}

fn classify_link(tree: &PageTree, destination: &str) -> LinkKind {
    let destination = destination.trim();
    if destination == DELETED_TARGET {
        return LinkKind::Deleted;
    }
    if destination.starts_with('[') {
        return match decode_link_destination(destination) {
            Some(path) if tree.page_from_path(&path).is_some() => LinkKind::Internal(path),
            _ => LinkKind::Broken(destination.to_string()),
        };
    }
    LinkKind::External(destination.to_string())
}

fn parser(content: &str) -> Parser<'_> {
    Parser::new_ext(content, Options::all())
}

/// Every link and image in `content`, in document order.
pub fn extract_links(tree: &PageTree, content: &str) -> Vec<LinkRef> {
    let mut links = Vec::new();
    let mut open: Vec<(String, LinkKind)> = Vec::new();

    for event in parser(content) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                open.push((String::new(), classify_link(tree, &dest_url)));
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                open.push((String::new(), LinkKind::Image(dest_url.trim().to_string())));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((buf, _)) = open.last_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                if let Some((text, kind)) = open.pop() {
                    links.push(LinkRef { text, kind });
                }
            }
            _ => {}
        }
    }
    links
}

/// Appends a visible note after every broken or severed internal link.
///
/// Content with no unresolved links is returned verbatim; otherwise the Markdown is
/// re-serialized from the annotated event stream.
pub fn annotate_links(tree: &PageTree, content: &str) -> Result<String> {
    if !extract_links(tree, content).iter().any(LinkRef::is_unresolved) {
        return Ok(content.to_string());
    }

    let mut notes: Vec<Option<&'static str>> = Vec::new();
    let mut events: Vec<Event> = Vec::new();
    for event in parser(content) {
        match event {
            Event::Start(Tag::Link { ref dest_url, .. }) => {
                let note = match classify_link(tree, dest_url) {
                    LinkKind::Broken(_) => Some(NOT_FOUND_NOTE),
                    LinkKind::Deleted => Some(DELETED_NOTE),
                    _ => None,
                };
                notes.push(note);
                events.push(event);
            }
            Event::End(TagEnd::Link) => {
                events.push(event);
                if let Some(Some(note)) = notes.pop() {
                    events.push(Event::Text(CowStr::Borrowed(note)));
                }
            }
            other => events.push(other),
        }
    }

    let mut output = String::new();
    cmark(events.iter(), &mut output).map_err(|e| NotebookError::Markdown(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::{p, sample_tree};

    #[test]
    fn test_classifies_each_kind() {
        let tree = sample_tree();
        let content = "[A]([0,0]) [gone]([0,9]) [cut]([deleted]) \
                       [web](https://example.com) ![pic](dot.png)";
        let kinds: Vec<LinkKind> = extract_links(&tree, content)
            .into_iter()
            .map(|l| l.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::Internal(p(&[0, 0])),
                LinkKind::Broken("[0,9]".to_string()),
                LinkKind::Deleted,
                LinkKind::External("https://example.com".to_string()),
                LinkKind::Image("dot.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_link_text_and_tooltip() {
        let tree = sample_tree();
        let links = extract_links(&tree, r#"see [the `B` page]([0,1] "tooltip")"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "the B page");
        assert_eq!(links[0].kind, LinkKind::Internal(p(&[0, 1])));
    }

    #[test]
    fn test_code_spans_are_not_links() {
        let tree = sample_tree();
        assert!(extract_links(&tree, "`[A]([0,0])`").is_empty());
    }

    #[test]
    fn test_malformed_paths_are_broken() {
        let tree = sample_tree();
        for dest in ["[1,0]", "[]", "[0,-1]", "[0,\"a\"]"] {
            let content = format!("[x]({})", dest);
            let links = extract_links(&tree, &content);
            assert!(
                matches!(links.first().map(|l| &l.kind), Some(LinkKind::Broken(_))),
                "{} should be broken",
                dest
            );
        }
    }

    #[test]
    fn test_annotate_leaves_clean_content_untouched() {
        let tree = sample_tree();
        let content = "# Title\n\n* [A]([0,0])\n";
        assert_eq!(annotate_links(&tree, content).unwrap(), content);
    }

    #[test]
    fn test_annotate_marks_unresolved_links() {
        let tree = sample_tree();
        let content = "[gone]([0,9]) and [cut]([deleted]) and [A]([0,0])";
        let out = annotate_links(&tree, content).unwrap();
        assert!(out.contains("LINKED PAGE NOT FOUND"));
        assert!(out.contains("LINKED PAGE DELETED"));
        assert_eq!(out.matches("LINKED PAGE").count(), 2);
    }
}
