use crate::commands::{missing_page, plural, CmdMessage, CmdResult};
use crate::error::{NotebookError, Result};
use crate::links::annotate_links;
use crate::markdown::assemble_for_export;
use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::search::SearchIndex;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use pulldown_cmark_to_cmark::cmark;
use std::io::Write;
use tracing::info;

/// The page at `path` and its sub pages as JSON, in the persisted page shape.
pub fn page_json(notebook: &Notebook, path: &PagePath) -> Result<CmdResult> {
    let Some(page) = notebook
        .tree
        .page_from_path(path)
        .and_then(|id| notebook.persist_page(id))
    else {
        return Ok(missing_page(path));
    };
    let json = serde_json::to_string_pretty(&page)?;
    Ok(CmdResult::default()
        .with_selected(Some(path.clone()))
        .with_output(json))
}

/// Default archive name, timestamped.
pub fn archive_file_name() -> String {
    format!("notetree-{}.tar.gz", Utc::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes every page as assembled Markdown into a gzipped tar, plus the images.
///
/// Entries are `notebook/<dotted path>-<title>.md` and `notebook/images/<name>`.
/// `index` must be fresh.
pub fn archive<W: Write>(notebook: &Notebook, index: &SearchIndex, writer: W) -> Result<CmdResult> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);
    let mtime = Utc::now().timestamp().max(0) as u64;

    let mut pages = 0;
    for id in notebook.tree.pre_order() {
        let Some(node) = notebook.tree.get(id) else {
            continue;
        };
        let Some(text) = assemble_for_export(notebook, index, id)? else {
            continue;
        };
        let entry_name = format!(
            "notebook/{}-{}.md",
            node.path().to_dotted(),
            sanitize_filename(&node.title)
        );
        append_entry(&mut tar, &entry_name, text.as_bytes(), mtime)?;
        pages += 1;
    }

    for (name, bytes) in notebook.images.iter() {
        let entry_name = format!("notebook/images/{}", sanitize_filename(name));
        append_entry(&mut tar, &entry_name, bytes, mtime)?;
    }

    let enc = tar.into_inner().map_err(NotebookError::Io)?;
    enc.finish().map_err(NotebookError::Io)?;
    info!(pages, images = notebook.images.len(), "exported archive");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} and {}",
        plural(pages, "page"),
        plural(notebook.images.len(), "image")
    )));
    Ok(result)
}

fn append_entry<W: Write>(
    tar: &mut tar::Builder<W>,
    name: &str,
    data: &[u8],
    mtime: u64,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_cksum();
    tar.append_data(&mut header, name, data)
        .map_err(NotebookError::Io)
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

/// All pages merged into one Markdown document.
///
/// The export title is the H1; each page title is an H2 followed by its content with
/// headings bumped two levels, pages separated by rules. Broken links are annotated.
pub fn single_file(notebook: &Notebook, title: &str) -> Result<CmdResult> {
    let mut output = format!("# {}\n\n", title);
    let mut pages = 0;
    for (i, id) in notebook.tree.pre_order().into_iter().enumerate() {
        let Some(node) = notebook.tree.get(id) else {
            continue;
        };
        if i > 0 {
            output.push_str("\n\n---\n\n");
        }
        output.push_str("## ");
        output.push_str(&node.title);
        output.push_str("\n\n");

        let body = node.content.trim();
        if !body.is_empty() {
            let annotated = annotate_links(&notebook.tree, body)?;
            output.push_str(&bump_markdown_headers(&annotated)?);
        }
        pages += 1;
    }

    let mut result = CmdResult::default().with_output(output);
    result.add_message(CmdMessage::success(format!(
        "Merged {} into \"{}\"",
        plural(pages, "page"),
        title
    )));
    Ok(result)
}

/// Output file name for [`single_file`], always ending in `.md`.
pub fn single_file_name(title: &str) -> String {
    let base = strip_suffix_ignore_case(title, ".markdown")
        .or_else(|| strip_suffix_ignore_case(title, ".md"))
        .unwrap_or(title);
    format!("{}.md", sanitize_filename(base))
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(cut) || !s[cut..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&s[..cut])
}

/// Bumps every heading by two levels (H1 -> H3, capped at H6).
pub fn bump_markdown_headers(content: &str) -> Result<String> {
    let parser = Parser::new_ext(content, Options::all());
    let events: Vec<Event> = parser
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => Event::Start(Tag::Heading {
                level: bump_heading_level(level),
                id,
                classes,
                attrs,
            }),
            Event::End(TagEnd::Heading(level)) => {
                Event::End(TagEnd::Heading(bump_heading_level(level)))
            }
            other => other,
        })
        .collect();

    let mut output = String::new();
    cmark(events.iter(), &mut output).map_err(|e| NotebookError::Markdown(e.to_string()))?;
    Ok(output)
}

fn bump_heading_level(level: HeadingLevel) -> HeadingLevel {
    match level {
        HeadingLevel::H1 => HeadingLevel::H3,
        HeadingLevel::H2 => HeadingLevel::H4,
        HeadingLevel::H3 => HeadingLevel::H5,
        HeadingLevel::H4 | HeadingLevel::H5 | HeadingLevel::H6 => HeadingLevel::H6,
    }
}
