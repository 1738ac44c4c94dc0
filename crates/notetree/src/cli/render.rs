//! # Rendering
//!
//! Turns `CmdResult` pieces into terminal text. Every function returns a `String`;
//! printing happens in `commands.rs`, so layouts can be tested without a terminal.
//!
//! ## Tree Layout
//!
//! One page per line: indentation by depth, the dotted path, the title truncated to
//! fit [`LINE_WIDTH`] (by display width, so wide characters count double) and, for
//! pages with children, the number of sub pages.

use super::styles;
use notetreeapp::api::{CmdMessage, MessageLevel, PageSummary};
use notetreeapp::search::SearchResults;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
const INDENT: usize = 2;
const COL_HITS: usize = 12;

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let style = match message.level {
                MessageLevel::Info => styles::info(),
                MessageLevel::Success => styles::success(),
                MessageLevel::Warning => styles::warning(),
                MessageLevel::Error => styles::error(),
            };
            format!("{}\n", style.apply_to(&message.content))
        })
        .collect()
}

pub fn render_tree(pages: &[PageSummary]) -> String {
    let mut out = String::new();
    for page in pages {
        let indent = " ".repeat(page.depth * INDENT);
        let path = format!("{} ", page.path.to_dotted());
        let suffix = if page.sub_pages > 0 {
            format!(" ({})", page.sub_pages)
        } else {
            String::new()
        };

        let fixed = indent.width() + path.width() + suffix.width();
        let title = truncate_to_width(&page.title, LINE_WIDTH.saturating_sub(fixed));
        out.push_str(&format!(
            "{}{}{}{}\n",
            indent,
            styles::path().apply_to(path),
            styles::title().apply_to(title),
            styles::muted().apply_to(suffix)
        ));
    }
    out
}

pub fn render_search(results: &SearchResults) -> String {
    let mut out = String::new();
    for hit in &results.results {
        let path = format!("{:<10}", hit.path.to_dotted());
        let hits = format!(
            "{:>width$}",
            format!("{}t {}c", hit.title_hits, hit.content_hits),
            width = COL_HITS
        );
        let available = LINE_WIDTH.saturating_sub(path.width() + COL_HITS + 1);
        let title = truncate_to_width(&hit.title, available);
        let padding = available.saturating_sub(title.width());
        let title = if hit.exact_title {
            styles::highlight().apply_to(title).to_string()
        } else {
            styles::title().apply_to(title).to_string()
        };
        out.push_str(&format!(
            "{}{}{} {}\n",
            styles::path().apply_to(path),
            title,
            " ".repeat(padding),
            styles::muted().apply_to(hits)
        ));
    }
    out
}

pub fn render_names(names: &[String]) -> String {
    names.iter().map(|name| format!("{}\n", name)).collect()
}

/// Cuts `s` to at most `max_width` display columns, ending with `…` when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
