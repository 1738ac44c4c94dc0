//! Structured search filtering.
//!
//! A [`SearchFilter`] narrows an already computed result set. Every predicate is
//! optional and carries its own case flag; all set predicates must hold (AND).
//!
//! The serde names match the filter format exchanged with UI clients:
//!
//! ```json
//! {
//!   "TitleStartsWith": { "Text": "Meeting", "MatchCase": true },
//!   "ContentDoesNotContain": { "Text": "draft" },
//!   "WithinPageIndexPath": [0, 2]
//! }
//! ```

use crate::path::PagePath;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextCondition {
    pub text: String,
    #[serde(default)]
    pub match_case: bool,
}

impl TextCondition {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            match_case: false,
        }
    }

    pub fn match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    fn prepare<'a>(&'a self, haystack: &'a str) -> (Cow<'a, str>, Cow<'a, str>) {
        if self.match_case {
            (haystack.into(), self.text.as_str().into())
        } else {
            (haystack.to_lowercase().into(), self.text.to_lowercase().into())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextOp {
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
}

fn holds(condition: &Option<TextCondition>, op: TextOp, haystack: &str) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    let (haystack, needle) = condition.prepare(haystack);
    match op {
        TextOp::Contains => haystack.contains(needle.as_ref()),
        TextOp::DoesNotContain => !haystack.contains(needle.as_ref()),
        TextOp::StartsWith => haystack.starts_with(needle.as_ref()),
        TextOp::EndsWith => haystack.ends_with(needle.as_ref()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_contains: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_does_not_contain: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_starts_with: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_ends_with: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_does_not_contain: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_starts_with: Option<TextCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_ends_with: Option<TextCondition>,
    /// Restricts results to this page and its descendants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_page_index_path: Option<PagePath>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        *self == SearchFilter::default()
    }

    pub fn matches(&self, title: &str, content: &str, path: &PagePath) -> bool {
        if let Some(ancestor) = &self.within_page_index_path {
            if !path.is_within(ancestor) {
                return false;
            }
        }
        holds(&self.content_contains, TextOp::Contains, content)
            && holds(&self.content_does_not_contain, TextOp::DoesNotContain, content)
            && holds(&self.content_starts_with, TextOp::StartsWith, content)
            && holds(&self.content_ends_with, TextOp::EndsWith, content)
            && holds(&self.title_contains, TextOp::Contains, title)
            && holds(&self.title_does_not_contain, TextOp::DoesNotContain, title)
            && holds(&self.title_starts_with, TextOp::StartsWith, title)
            && holds(&self.title_ends_with, TextOp::EndsWith, title)
    }
}
