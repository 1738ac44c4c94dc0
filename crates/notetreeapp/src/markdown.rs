//! # Markdown Assembly
//!
//! A page is displayed as `header`, `content`, `footer`, joined by blank lines (empty
//! parts are skipped). The notebook header and footer are templates; these
//! placeholders are substituted in them:
//!
//! | Placeholder | Replacement |
//! |-------------|-------------|
//! | `{PAGETITLE}` | the page title |
//! | `{SUBPAGELINKS}` | one `[title](path)` line per direct child, or `No sub pages.` |
//! | `{SUBPAGEOFLINK}` | `[parent](path)`, or `This is the root page.` |
//! | `{LINKINGPAGES}` | one link per other page whose content links here, or `No linking pages.` |
//!
//! Page content itself is emitted verbatim. A `{PAGETITLE}` typed into a page body
//! stays literal text.
//!
//! Backlinks come from a case-sensitive search index query for the page's exact link
//! target (`]([0,1])`), so the index passed in must be fresh; callers refresh it
//! first. Assembly has no side effects and is redone on every display or export.

use crate::error::Result;
use crate::links::annotate_links;
use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::search::{SearchIndex, SearchQuery};
use crate::tree::PageId;

pub const PAGE_TITLE: &str = "{PAGETITLE}";
pub const SUB_PAGE_LINKS: &str = "{SUBPAGELINKS}";
pub const SUB_PAGE_OF_LINK: &str = "{SUBPAGEOFLINK}";
pub const LINKING_PAGES: &str = "{LINKINGPAGES}";

pub const NO_SUB_PAGES: &str = "No sub pages.";
pub const ROOT_PAGE: &str = "This is the root page.";
pub const NO_LINKING_PAGES: &str = "No linking pages.";

/// An internal Markdown link to `path`.
pub fn page_link(title: &str, path: &PagePath) -> String {
    format!("[{}]({})", title, path.to_json())
}

/// Pages other than `page` whose content contains its link target, in search rank order.
pub fn linking_pages(
    notebook: &Notebook,
    index: &SearchIndex,
    page: PageId,
) -> Vec<(String, PagePath)> {
    let Some(node) = notebook.tree.get(page) else {
        return Vec::new();
    };
    let query = SearchQuery::new(node.path().link_target()).match_case(true);
    index
        .query(&query)
        .results
        .into_iter()
        .filter(|hit| hit.content_hits > 0 && &hit.path != node.path())
        .map(|hit| (hit.title, hit.path))
        .collect()
}

fn sub_page_links(notebook: &Notebook, page: PageId) -> String {
    let tree = &notebook.tree;
    let links: Vec<String> = tree
        .get(page)
        .map(|node| node.children().to_vec())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|child| tree.get(child))
        .map(|child| page_link(&child.title, child.path()))
        .collect();
    if links.is_empty() {
        NO_SUB_PAGES.to_string()
    } else {
        links.join("\n")
    }
}

fn sub_page_of_link(notebook: &Notebook, page: PageId) -> String {
    let tree = &notebook.tree;
    tree.get(page)
        .and_then(|node| node.parent())
        .and_then(|parent| tree.get(parent))
        .map(|parent| page_link(&parent.title, parent.path()))
        .unwrap_or_else(|| ROOT_PAGE.to_string())
}

fn linking_pages_block(notebook: &Notebook, index: &SearchIndex, page: PageId) -> String {
    let links: Vec<String> = linking_pages(notebook, index, page)
        .iter()
        .map(|(title, path)| page_link(title, path))
        .collect();
    if links.is_empty() {
        NO_LINKING_PAGES.to_string()
    } else {
        links.join("\n")
    }
}

/// Substitutes every placeholder in `template` for `page`. Placeholders that do not
/// occur are not computed. Substituted text is never scanned again, so a title that
/// contains `{SUBPAGELINKS}` stays literal.
pub fn substitute(
    template: &str,
    notebook: &Notebook,
    index: &SearchIndex,
    page: PageId,
) -> String {
    let Some(node) = notebook.tree.get(page) else {
        return template.to_string();
    };
    let placeholders = [PAGE_TITLE, SUB_PAGE_LINKS, SUB_PAGE_OF_LINK, LINKING_PAGES];
    let values: Vec<(&str, String)> = placeholders
        .into_iter()
        .filter(|placeholder| template.contains(placeholder))
        .map(|placeholder| {
            let value = match placeholder {
                PAGE_TITLE => node.title.clone(),
                SUB_PAGE_LINKS => sub_page_links(notebook, page),
                SUB_PAGE_OF_LINK => sub_page_of_link(notebook, page),
                _ => linking_pages_block(notebook, index, page),
            };
            (placeholder, value)
        })
        .collect();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((at, placeholder, value)) = values
        .iter()
        .filter_map(|(placeholder, value)| {
            rest.find(placeholder).map(|at| (at, *placeholder, value))
        })
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }
    out.push_str(rest);
    out
}

/// The full displayable Markdown for `page`.
pub fn assemble(notebook: &Notebook, index: &SearchIndex, page: PageId) -> Option<String> {
    let node = notebook.tree.get(page)?;
    let header = substitute(&notebook.header, notebook, index, page);
    let footer = substitute(&notebook.footer, notebook, index, page);

    let parts: Vec<&str> = [header.as_str(), node.content.as_str(), footer.as_str()]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect();
    Some(parts.join("\n\n"))
}

/// [`assemble`] with broken and severed internal links annotated for readers outside
/// the notebook.
pub fn assemble_for_export(
    notebook: &Notebook,
    index: &SearchIndex,
    page: PageId,
) -> Result<Option<String>> {
    match assemble(notebook, index, page) {
        Some(text) => Ok(Some(annotate_links(&notebook.tree, &text)?)),
        None => Ok(None),
    }
}
