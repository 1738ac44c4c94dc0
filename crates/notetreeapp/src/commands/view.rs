use crate::commands::{missing_page, CmdResult, PageSummary};
use crate::error::Result;
use crate::markdown::assemble;
use crate::notebook::Notebook;
use crate::path::PagePath;
use crate::search::SearchIndex;

/// Every page in pre-order.
pub fn tree(notebook: &Notebook) -> Result<CmdResult> {
    let pages = notebook
        .tree
        .pre_order()
        .into_iter()
        .filter_map(|id| PageSummary::of(notebook, id))
        .collect();
    Ok(CmdResult::default().with_listed_pages(pages))
}

/// The assembled Markdown of one page. `index` must be fresh.
pub fn show(notebook: &Notebook, index: &SearchIndex, path: &PagePath) -> Result<CmdResult> {
    let Some(id) = notebook.tree.page_from_path(path) else {
        return Ok(missing_page(path));
    };
    let Some(text) = assemble(notebook, index, id) else {
        return Ok(missing_page(path));
    };
    let listed = PageSummary::of(notebook, id).into_iter().collect();
    Ok(CmdResult::default()
        .with_selected(Some(path.clone()))
        .with_listed_pages(listed)
        .with_output(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::NotebookFixture;
    use crate::tree::tests::p;

    #[test]
    fn test_tree_lists_pre_order_with_depth() {
        let nb = NotebookFixture::sample().build();
        let result = tree(&nb).unwrap();
        let rows: Vec<(String, usize)> = result
            .listed_pages
            .iter()
            .map(|page| (page.title.clone(), page.depth))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Root".to_string(), 0),
                ("A".to_string(), 1),
                ("A1".to_string(), 2),
                ("A2".to_string(), 2),
                ("B".to_string(), 1),
                ("C".to_string(), 1),
            ]
        );
        assert_eq!(result.listed_pages[1].sub_pages, 2);
    }

    #[test]
    fn test_show_assembles_page() {
        let nb = NotebookFixture::sample()
            .with_header_footer("# {PAGETITLE}", "Up: {SUBPAGEOFLINK}")
            .build();
        let mut index = SearchIndex::new();
        index.build(&nb.tree);
        let result = show(&nb, &index, &p(&[0, 2])).unwrap();
        assert_eq!(
            result.output.as_deref(),
            Some("# C\n\nC body\n\nUp: [Root]([0])")
        );
    }

    #[test]
    fn test_show_missing_page() {
        let nb = NotebookFixture::sample().build();
        let index = SearchIndex::new();
        let result = show(&nb, &index, &p(&[0, 5])).unwrap();
        assert!(result.output.is_none());
        assert!(result.has_warnings());
    }
}
