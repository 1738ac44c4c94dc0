use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::search::{SearchFilter, SearchIndex, SearchQuery};
use crate::tree::PageTree;

/// Runs a ranked query, rebuilding the index first when it is stale.
pub fn run(index: &mut SearchIndex, tree: &PageTree, query: &SearchQuery) -> Result<CmdResult> {
    let results = index.search(tree, query);
    let mut result = CmdResult::default();
    if results.is_empty() {
        result.add_message(CmdMessage::info(format!("No matches for \"{}\"", query.term)));
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} in {}",
            plural(results.total_hits, "hit"),
            plural(results.total_pages, "page")
        )));
    }
    Ok(result.with_search(results))
}

/// [`run`] narrowed by `filter`. An empty filter is the same as [`run`].
pub fn filtered(
    index: &mut SearchIndex,
    tree: &PageTree,
    query: &SearchQuery,
    filter: &SearchFilter,
) -> Result<CmdResult> {
    if filter.is_empty() {
        return run(index, tree, query);
    }
    let base = index.search(tree, query);
    let results = index.filter(&base, filter);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "{} of {} after filtering",
        plural(results.total_pages, "page"),
        base.total_pages
    )));
    Ok(result.with_search(results))
}
