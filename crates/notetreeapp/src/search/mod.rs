//! # Search Index
//!
//! A flat, rebuildable snapshot of every page: `(title, content, path)` in pre-order.
//!
//! ## Staleness Contract
//!
//! The index never tracks edits incrementally. Any write to the notebook marks it
//! stale ([`SearchIndex::mark_stale`]); the next [`SearchIndex::search`] rebuilds it
//! before answering. Typing into a page costs nothing, and a query always sees the
//! latest write.
//!
//! ## Ranking
//!
//! For each page the query computes:
//!
//! - `title_hits`: occurrences of the term in the title
//! - `content_hits`: occurrences of the term in the content
//! - `exact_title`: the title equals the term
//!
//! Results are sorted descending by `(exact_title, title_hits, content_hits)`. The sort
//! is stable, so ties keep tree order. Case is folded on both sides unless the query
//! asks for `match_case`.
//!
//! Post-filtering with named predicates lives in [`filter`].

use crate::path::PagePath;
use crate::tree::PageTree;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub mod filter;

pub use filter::{SearchFilter, TextCondition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    pub content: String,
    pub path: PagePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Pages with at least one hit in title or content.
    #[default]
    Contains,
    /// Only pages whose whole title equals the term.
    ExactTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub match_case: bool,
    pub mode: QueryMode,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            match_case: false,
            mode: QueryMode::Contains,
        }
    }

    pub fn match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    pub fn exact_title(mut self) -> Self {
        self.mode = QueryMode::ExactTitle;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub path: PagePath,
    pub exact_title: bool,
    pub title_hits: usize,
    pub content_hits: usize,
}

impl SearchHit {
    fn rank(&self) -> (bool, usize, usize) {
        (self.exact_title, self.title_hits, self.content_hits)
    }

    pub fn hits(&self) -> usize {
        self.title_hits + self.content_hits
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    pub total_hits: usize,
    pub total_pages: usize,
}

impl SearchResults {
    fn from_hits(results: Vec<SearchHit>) -> Self {
        let total_hits = results.iter().map(SearchHit::hits).sum();
        let total_pages = results.len();
        Self {
            results,
            total_hits,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    by_path: HashMap<PagePath, usize>,
    up_to_date: bool,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears and repopulates from a full pre-order traversal.
    pub fn build(&mut self, tree: &PageTree) {
        self.entries.clear();
        self.by_path.clear();
        for id in tree.pre_order() {
            let Some(node) = tree.get(id) else {
                continue;
            };
            self.by_path.insert(node.path().clone(), self.entries.len());
            self.entries.push(IndexEntry {
                title: node.title.clone(),
                content: node.content.clone(),
                path: node.path().clone(),
            });
        }
        self.up_to_date = true;
        debug!(pages = self.entries.len(), "rebuilt search index");
    }

    pub fn mark_stale(&mut self) {
        self.up_to_date = false;
    }

    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    /// Rebuilds when stale. Returns the (now fresh) index for read-only queries.
    pub fn refresh(&mut self, tree: &PageTree) -> &Self {
        if !self.up_to_date {
            self.build(tree);
        }
        self
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, path: &PagePath) -> Option<&IndexEntry> {
        self.by_path.get(path).map(|i| &self.entries[*i])
    }

    /// Lazy-rebuilding query entry point.
    pub fn search(&mut self, tree: &PageTree, query: &SearchQuery) -> SearchResults {
        self.refresh(tree).query(query)
    }

    /// Queries the index as it stands, without checking staleness.
    pub fn query(&self, query: &SearchQuery) -> SearchResults {
        if query.term.is_empty() {
            return SearchResults::default();
        }
        let term = fold(&query.term, query.match_case);

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let title = fold(&entry.title, query.match_case);
                let content = fold(&entry.content, query.match_case);
                let hit = SearchHit {
                    title: entry.title.clone(),
                    path: entry.path.clone(),
                    exact_title: title == term,
                    title_hits: title.matches(term.as_str()).count(),
                    content_hits: content.matches(term.as_str()).count(),
                };
                let keep = match query.mode {
                    QueryMode::Contains => hit.title_hits > 0 || hit.content_hits > 0,
                    QueryMode::ExactTitle => hit.exact_title,
                };
                keep.then_some(hit)
            })
            .collect();

        hits.sort_by(|a, b| b.rank().cmp(&a.rank()));
        SearchResults::from_hits(hits)
    }

    /// Applies `filter` to an already computed result set (AND of all set predicates).
    /// Hits whose path is no longer indexed are dropped.
    pub fn filter(&self, results: &SearchResults, filter: &SearchFilter) -> SearchResults {
        let kept = results
            .results
            .iter()
            .filter(|hit| {
                self.entry(&hit.path)
                    .is_some_and(|entry| filter.matches(&entry.title, &entry.content, &entry.path))
            })
            .cloned()
            .collect();
        SearchResults::from_hits(kept)
    }
}

fn fold(text: &str, match_case: bool) -> String {
    if match_case {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::p;

    fn tree_with(pages: &[(&str, &str)]) -> PageTree {
        let mut tree = PageTree::new("Root");
        for (title, content) in pages {
            let id = tree.create_page(*title, *content);
            tree.add_sub_page(&PagePath::root(), id);
        }
        tree
    }

    fn titles(results: &SearchResults) -> Vec<&str> {
        results.results.iter().map(|h| h.title.as_str()).collect()
    }

    #[test]
    fn test_build_indexes_every_page() {
        let tree = tree_with(&[("A", "x"), ("B", "y")]);
        let mut index = SearchIndex::new();
        assert!(!index.is_up_to_date());
        index.build(&tree);
        assert!(index.is_up_to_date());
        assert_eq!(index.entries().len(), 3);
        assert_eq!(index.entry(&p(&[0, 1])).unwrap().title, "B");
    }

    #[test]
    fn test_ranks_exact_title_then_title_then_content() {
        let tree = tree_with(&[
            ("Notes on rust", "rust rust rust"),
            ("Other", "rust"),
            ("Rust", ""),
            ("rust and rust", ""),
        ]);
        let mut index = SearchIndex::new();
        let results = index.search(&tree, &SearchQuery::new("rust"));
        assert_eq!(
            titles(&results),
            vec!["Rust", "rust and rust", "Notes on rust", "Other"]
        );
        assert_eq!(results.total_pages, 4);
        assert_eq!(results.total_hits, 1 + 2 + 4 + 1);
    }

    #[test]
    fn test_results_are_non_increasing() {
        let tree = tree_with(&[
            ("ab", "ab ab"),
            ("x", "ab"),
            ("ab ab", ""),
            ("AB", "ab"),
            ("y", "ab ab ab"),
        ]);
        let mut index = SearchIndex::new();
        let results = index.search(&tree, &SearchQuery::new("ab"));
        for pair in results.results.windows(2) {
            assert!(pair[0].rank() >= pair[1].rank());
        }
    }

    #[test]
    fn test_ties_keep_tree_order() {
        let tree = tree_with(&[("first", "term"), ("second", "term"), ("third", "term")]);
        let mut index = SearchIndex::new();
        let results = index.search(&tree, &SearchQuery::new("term"));
        assert_eq!(titles(&results), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_match_case() {
        let tree = tree_with(&[("Rust", "RUST rust")]);
        let mut index = SearchIndex::new();
        let folded = index.search(&tree, &SearchQuery::new("rust"));
        assert_eq!(folded.results[0].content_hits, 2);
        assert!(folded.results[0].exact_title);

        let exact = index.search(&tree, &SearchQuery::new("rust").match_case(true));
        assert_eq!(exact.results[0].content_hits, 1);
        assert_eq!(exact.results[0].title_hits, 0);
        assert!(!exact.results[0].exact_title);
    }

    #[test]
    fn test_exact_title_mode() {
        let tree = tree_with(&[("Todo", ""), ("Todo list", "todo")]);
        let mut index = SearchIndex::new();
        let results = index.search(&tree, &SearchQuery::new("todo").exact_title());
        assert_eq!(titles(&results), vec!["Todo"]);
    }

    #[test]
    fn test_empty_term_matches_nothing() {
        let tree = tree_with(&[("A", "b")]);
        let mut index = SearchIndex::new();
        assert!(index.search(&tree, &SearchQuery::new("")).is_empty());
    }

    #[test]
    fn test_stale_index_rebuilds_on_search() {
        let mut tree = tree_with(&[("A", "old words")]);
        let mut index = SearchIndex::new();
        assert!(index.search(&tree, &SearchQuery::new("fresh")).is_empty());

        let a = tree.page_from_path(&p(&[0, 0])).unwrap();
        tree.set_content(a, "fresh words");
        index.mark_stale();
        let results = index.search(&tree, &SearchQuery::new("fresh"));
        assert_eq!(titles(&results), vec!["A"]);
    }

    #[test]
    fn test_up_to_date_index_is_not_rebuilt() {
        let mut tree = tree_with(&[("A", "old")]);
        let mut index = SearchIndex::new();
        index.build(&tree);
        let a = tree.page_from_path(&p(&[0, 0])).unwrap();
        tree.set_content(a, "new");
        // Nobody marked it stale, so the snapshot is served as is.
        assert!(index.search(&tree, &SearchQuery::new("new")).is_empty());
    }
}
