//! # Page Tree
//!
//! The notebook is one tree of pages. Children are ordered, and that order is
//! semantic: a child's position *is* the last segment of its [`PagePath`].
//!
//! ## Arena Layout
//!
//! Pages live in a flat arena and refer to each other by [`PageId`]:
//!
//! ```text
//! slots: [ Some(Root), Some(Ideas), None, Some(Journal), ... ]
//!            │  children: [1, 3]
//!            └─ parent: None
//! ```
//!
//! A `PageId` is the page's *identity* for the lifetime of the tree. It survives every
//! move, promote and demote, which is what the link rewrite engine keys on. Slots of
//! removed pages are emptied and never reused, so an old id can never alias a newer page.
//! The arena only grows during a session. Loading a notebook builds a fresh tree, so
//! the slots of pages deleted before the last save are gone after a reload.
//!
//! ## Structural Operations
//!
//! | Operation | Rejected (returns `false`/`None`) when |
//! |-----------|----------------------------------------|
//! | [`PageTree::add_sub_page`] | parent path does not resolve, page already attached |
//! | [`PageTree::delete_sub_page`] | path is the root or does not resolve |
//! | [`PageTree::move_sub_page`] | target index out of bounds, `delta == 0` |
//! | [`PageTree::promote_sub_page`] | page is the root or a child of the root |
//! | [`PageTree::demote_sub_page`] | page is the root, has no siblings, or the sibling index is invalid |
//!
//! Every successful operation ends with [`PageTree::recompute_paths`]. Rejected ones
//! leave the tree untouched.
//!
//! Lookups never panic on malformed input: any out-of-range index yields `None`.

use crate::path::{decode_link_destination, PagePath};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PageNode {
    pub title: String,
    pub content: String,
    path: PagePath,
    parent: Option<PageId>,
    children: Vec<PageId>,
}

impl PageNode {
    fn new(title: String, content: String) -> Self {
        Self {
            title,
            content,
            path: PagePath::from_indexes(Vec::new()),
            parent: None,
            children: Vec::new(),
        }
    }

    /// The page's current path. Meaningless for a detached page.
    pub fn path(&self) -> &PagePath {
        &self.path
    }

    pub fn parent(&self) -> Option<PageId> {
        self.parent
    }

    pub fn children(&self) -> &[PageId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct PageTree {
    slots: Vec<Option<PageNode>>,
    root: PageId,
}

impl PageTree {
    pub fn new(root_title: impl Into<String>) -> Self {
        let mut root = PageNode::new(root_title.into(), String::new());
        root.path = PagePath::root();
        Self {
            slots: vec![Some(root)],
            root: PageId(0),
        }
    }

    pub fn root(&self) -> PageId {
        self.root
    }

    pub fn get(&self, id: PageId) -> Option<&PageNode> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn get_mut(&mut self, id: PageId) -> Option<&mut PageNode> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Creates a detached leaf. It has no path until it is attached.
    pub fn create_page(&mut self, title: impl Into<String>, content: impl Into<String>) -> PageId {
        let id = PageId(self.slots.len());
        self.slots
            .push(Some(PageNode::new(title.into(), content.into())));
        id
    }

    pub fn set_title(&mut self, id: PageId, title: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.title = title.into();
                true
            }
            None => false,
        }
    }

    pub fn set_content(&mut self, id: PageId, content: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Resolves a path by walking child indexes below the root sentinel.
    pub fn page_from_path(&self, path: &PagePath) -> Option<PageId> {
        let (first, rest) = path.indexes().split_first()?;
        if *first != 0 {
            return None;
        }
        let mut current = self.root;
        for &index in rest {
            current = *self.get(current)?.children.get(index)?;
        }
        Some(current)
    }

    pub fn parent_from_path(&self, path: &PagePath) -> Option<PageId> {
        self.page_from_path(&path.parent()?)
    }

    /// True when `destination` decodes to a well-formed path naming an existing page.
    pub fn is_valid_link_target(&self, destination: &str) -> bool {
        decode_link_destination(destination)
            .and_then(|path| self.page_from_path(&path))
            .is_some()
    }

    /// True when `id` is reachable from the root.
    pub fn is_attached(&self, id: PageId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.get(current).and_then(|node| node.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Links `child` under `parent` without recomputing paths.
    /// Used to assemble detached subtrees before grafting them.
    pub(crate) fn link_child(&mut self, parent: PageId, child: PageId) -> bool {
        if parent == child || child == self.root || self.get(parent).is_none() {
            return false;
        }
        match self.get(child) {
            Some(node) if node.parent.is_none() => {}
            _ => return false,
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Appends a detached page (and whatever subtree hangs off it) to the page at
    /// `parent_path`.
    pub fn add_sub_page(&mut self, parent_path: &PagePath, page: PageId) -> bool {
        let Some(parent) = self.page_from_path(parent_path) else {
            return false;
        };
        if !self.link_child(parent, page) {
            return false;
        }
        self.recompute_paths();
        true
    }

    /// Removes the page at `path` together with its descendants and returns the removed
    /// page's node.
    pub fn delete_sub_page(&mut self, path: &PagePath) -> Option<PageNode> {
        let parent = self.parent_from_path(path)?;
        let index = path.last_index()?;
        let parent_node = self.get_mut(parent)?;
        if index >= parent_node.children.len() {
            return None;
        }
        let removed = parent_node.children.remove(index);

        let doomed = self.subtree(removed);
        let mut removed_node = None;
        for id in doomed {
            let taken = self.slots.get_mut(id.0).and_then(|slot| slot.take());
            if id == removed {
                removed_node = taken;
            }
        }
        self.recompute_paths();
        removed_node
    }

    /// Swaps the page at `path` with the sibling `delta` positions away.
    pub fn move_sub_page(&mut self, path: &PagePath, delta: isize) -> bool {
        if delta == 0 {
            return false;
        }
        let Some(parent) = self.parent_from_path(path) else {
            return false;
        };
        let Some(index) = path.last_index() else {
            return false;
        };
        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        let len = parent_node.children.len();
        if index >= len {
            return false;
        }
        let target = index as isize + delta;
        if target < 0 || target as usize >= len {
            return false;
        }
        parent_node.children.swap(index, target as usize);
        self.recompute_paths();
        true
    }

    /// Re-attaches the page as a child of its grandparent, directly after its former
    /// parent.
    pub fn promote_sub_page(&mut self, path: &PagePath) -> bool {
        let Some(page) = self.page_from_path(path) else {
            return false;
        };
        let Some(parent) = self.get(page).and_then(|n| n.parent) else {
            return false;
        };
        let Some(grandparent) = self.get(parent).and_then(|n| n.parent) else {
            return false;
        };
        let Some(index) = path.last_index() else {
            return false;
        };
        let Some(parent_index) = self
            .get(grandparent)
            .and_then(|n| n.children.iter().position(|c| *c == parent))
        else {
            return false;
        };

        if let Some(node) = self.get_mut(parent) {
            node.children.remove(index);
        }
        if let Some(node) = self.get_mut(grandparent) {
            node.children.insert(parent_index + 1, page);
        }
        if let Some(node) = self.get_mut(page) {
            node.parent = Some(grandparent);
        }
        self.recompute_paths();
        true
    }

    /// Re-attaches the page as the last child of the sibling at `sibling_index`.
    pub fn demote_sub_page(&mut self, path: &PagePath, sibling_index: usize) -> bool {
        let Some(parent) = self.parent_from_path(path) else {
            return false;
        };
        let Some(index) = path.last_index() else {
            return false;
        };
        let Some(siblings) = self.get(parent).map(|n| n.children.clone()) else {
            return false;
        };
        if siblings.len() < 2
            || index >= siblings.len()
            || sibling_index >= siblings.len()
            || sibling_index == index
        {
            return false;
        }
        let page = siblings[index];
        let new_parent = siblings[sibling_index];

        if let Some(node) = self.get_mut(parent) {
            node.children.remove(index);
        }
        if let Some(node) = self.get_mut(new_parent) {
            node.children.push(page);
        }
        if let Some(node) = self.get_mut(page) {
            node.parent = Some(new_parent);
        }
        self.recompute_paths();
        true
    }

    /// Re-derives every attached page's path from the root down.
    pub fn recompute_paths(&mut self) {
        let mut stack = vec![(self.root, PagePath::root())];
        while let Some((id, path)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            node.path = path.clone();
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((*child, path.child(i)));
            }
        }
    }

    /// All attached pages, parents before children, siblings in order.
    pub fn pre_order(&self) -> Vec<PageId> {
        self.subtree(self.root)
    }

    /// `id` followed by all of its descendants in pre-order.
    pub fn subtree(&self, id: PageId) -> Vec<PageId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Number of pages reachable from the root.
    pub fn page_count(&self) -> usize {
        self.pre_order().len()
    }
}
