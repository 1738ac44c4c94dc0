//! # Page Paths
//!
//! Pages are addressed by their position in the tree, not by a stable identifier.
//! A [`PagePath`] is the list of child indexes walked from the root, with the root
//! itself encoded as a leading `0`:
//!
//! ```text
//! Root            [0]
//! ├── Ideas       [0,0]
//! │   └── Books   [0,0,0]
//! └── Journal     [0,1]
//! ```
//!
//! Paths are derived data. They are recomputed top-down after every structural edit
//! (see [`crate::tree::PageTree::recompute_paths`]) and must never be cached across one.
//!
//! ## Serialized Forms
//!
//! - **JSON** (`[0,2,1]`): the canonical form, embedded verbatim in Markdown link targets
//!   and persisted as `IndexPath`. Always compact, no spaces.
//! - **Link target** (`]([0,2,1])`): the JSON form wrapped in the tail of Markdown link
//!   syntax. This is the exact string searched for when rewriting or back-linking, so a
//!   page at `[0,1]` never matches a link to `[0,1,2]`.
//! - **Dotted** (`0.2.1`): accepted as user input only.
//!
//! A link whose target is the reserved [`DELETED_TARGET`] was severed on purpose when
//! its page was removed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Link target written in place of links to removed pages.
pub const DELETED_TARGET: &str = "[deleted]";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagePath(Vec<usize>);

impl PagePath {
    pub fn root() -> Self {
        PagePath(vec![0])
    }

    pub fn from_indexes(indexes: Vec<usize>) -> Self {
        PagePath(indexes)
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Structural shape check only: non-empty and anchored at the `0` sentinel.
    pub fn is_well_formed(&self) -> bool {
        self.0.first() == Some(&0)
    }

    pub fn parent(&self) -> Option<PagePath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(PagePath(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, index: usize) -> PagePath {
        let mut indexes = self.0.clone();
        indexes.push(index);
        PagePath(indexes)
    }

    /// Position of this page among its siblings. `None` for the root.
    pub fn last_index(&self) -> Option<usize> {
        if self.is_root() {
            None
        } else {
            self.0.last().copied()
        }
    }

    /// The same path with the last segment replaced, i.e. a sibling's path.
    pub fn sibling(&self, index: usize) -> Option<PagePath> {
        self.parent().map(|p| p.child(index))
    }

    /// True when `self` is `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &PagePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    pub fn to_json(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        format!("[{}]", parts.join(","))
    }

    pub fn to_dotted(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        parts.join(".")
    }

    /// The literal substring this page's path occupies inside a Markdown link.
    pub fn link_target(&self) -> String {
        link_target_for(&self.to_json())
    }
}

/// Wraps a raw destination in the tail of Markdown link syntax: `](dest)`.
pub fn link_target_for(destination: &str) -> String {
    format!("]({})", destination)
}

/// Decodes a link destination as a path, enforcing the shape rules:
/// a non-empty JSON array of non-negative integers starting at `0`.
///
/// Resolution against a tree is a separate step, see
/// [`crate::tree::PageTree::is_valid_link_target`].
pub fn decode_link_destination(destination: &str) -> Option<PagePath> {
    let value: serde_json::Value = serde_json::from_str(destination.trim()).ok()?;
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    let mut indexes = Vec::with_capacity(items.len());
    for item in items {
        let n = item.as_u64()?;
        indexes.push(usize::try_from(n).ok()?);
    }
    let path = PagePath(indexes);
    path.is_well_formed().then_some(path)
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl FromStr for PagePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('[') {
            return decode_link_destination(trimmed)
                .ok_or_else(|| format!("Invalid page path: {}", s));
        }

        let mut indexes = Vec::new();
        for part in trimmed.split('.') {
            let n = part
                .parse::<usize>()
                .map_err(|_| format!("Invalid page path: {}", s))?;
            indexes.push(n);
        }
        let path = PagePath(indexes);
        if !path.is_well_formed() {
            return Err(format!("Page paths start at the root (0): {}", s));
        }
        Ok(path)
    }
}
