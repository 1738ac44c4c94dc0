use notetreeapp::api::{MessageLevel, NotebookApi};
use notetreeapp::config::NotebookConfig;
use notetreeapp::notebook::Notebook;
use notetreeapp::path::PagePath;
use notetreeapp::store::memory::MemoryStore;
use notetreeapp::store::NotebookStore;

fn setup() -> NotebookApi<MemoryStore> {
    let mut api = NotebookApi::open(MemoryStore::new(), NotebookConfig::default()).unwrap();
    api.init().unwrap();
    api
}

fn content(api: &NotebookApi<MemoryStore>, path: &str) -> String {
    let path: PagePath = path.parse().unwrap();
    let tree = &api.notebook().tree;
    let id = tree.page_from_path(&path).unwrap();
    tree.get(id).unwrap().content.clone()
}

fn title(api: &NotebookApi<MemoryStore>, path: &str) -> String {
    let path: PagePath = path.parse().unwrap();
    let tree = &api.notebook().tree;
    let id = tree.page_from_path(&path).unwrap();
    tree.get(id).unwrap().title.clone()
}

#[test]
fn test_swap_keeps_links_pointing_at_the_same_pages() {
    let mut api = setup();
    api.add_page("0", "A", "see [B]([0,1])").unwrap();
    api.add_page("0", "B", "see [A]([0,0])").unwrap();

    let result = api.move_page("0.0", 1).unwrap();
    assert!(result.changed);
    assert_eq!(result.selected, Some("0.1".parse().unwrap()));

    assert_eq!(title(&api, "0.0"), "B");
    assert_eq!(content(&api, "0.0"), "see [A]([0,1])");
    assert_eq!(title(&api, "0.1"), "A");
    assert_eq!(content(&api, "0.1"), "see [B]([0,0])");

    // Moving back restores the original text exactly.
    api.move_page("0.1", -1).unwrap();
    assert_eq!(content(&api, "0.0"), "see [B]([0,1])");
    assert_eq!(content(&api, "0.1"), "see [A]([0,0])");
}

#[test]
fn test_saved_document_round_trips() {
    let mut api = setup();
    api.add_page("0", "Projects", "").unwrap();
    api.add_page("0.0", "Garden", "Plant [beans](Projects)").unwrap();
    api.add_page("0", "Inbox", "go to [Garden]([0,0,0])").unwrap();
    api.add_image("beans.png", vec![0, 1, 2, 250]).unwrap();
    api.add_template("Daily", "## Today", false).unwrap();

    let raw = api.store().raw().unwrap().to_string();
    assert!(raw.contains("\"RootPage\""));
    assert!(raw.contains("\"PageTemplates\""));

    let reloaded = Notebook::from_json(&raw).unwrap();
    assert_eq!(reloaded.to_json().unwrap(), api.notebook().to_json().unwrap());
    assert_eq!(reloaded.images.get("beans.png"), Some(&vec![0, 1, 2, 250]));

    let reopened = NotebookApi::open(
        MemoryStore::with_notebook(&reloaded).unwrap(),
        NotebookConfig::default(),
    )
    .unwrap();
    assert_eq!(reopened.notebook().tree.page_count(), 4);
}

#[test]
fn test_search_reflects_each_write() {
    let mut api = setup();
    api.add_page("0", "Recipes", "bread").unwrap();
    let hits = api.search("soup", None, false).unwrap().search.unwrap();
    assert!(hits.is_empty());

    api.set_content("0.0", "bread and soup").unwrap();
    let hits = api.search("soup", None, false).unwrap().search.unwrap();
    assert_eq!(hits.total_pages, 1);

    api.set_title("0.0", "Soup").unwrap();
    let hits = api.search("soup", None, true).unwrap().search.unwrap();
    assert!(hits.results[0].exact_title);
}

#[test]
fn test_delete_last_sibling_selects_previous() {
    let mut api = setup();
    api.add_page("0", "A", "").unwrap();
    api.add_page("0", "B", "").unwrap();
    api.add_page("0", "C", "").unwrap();

    let result = api.delete_page("0.2").unwrap();
    assert!(result.changed);
    assert_eq!(result.selected, Some("0.1".parse().unwrap()));
}

#[test]
fn test_delete_severs_links_into_removed_subtree() {
    let mut api = setup();
    api.add_page("0", "Keep", "see [Old]([0,1]) and [Child]([0,1,0])").unwrap();
    api.add_page("0", "Old", "").unwrap();
    api.add_page("0.1", "Child", "").unwrap();

    api.delete_page("0.1").unwrap();
    assert_eq!(
        content(&api, "0.0"),
        "see [Old]([deleted]) and [Child]([deleted])"
    );
    let doctor = api.doctor().unwrap();
    assert_eq!(doctor.names.len(), 2);
}

#[test]
fn test_export_import_between_notebooks() {
    let mut source = setup();
    source.add_page("0", "Trip", "day one: [Map]([0,0,0])").unwrap();
    source.add_page("0.0", "Map", "back: [Trip]([0,0])").unwrap();
    let json = source.export_page_json("0.0").unwrap().output.unwrap();

    let mut target = setup();
    target.add_page("0", "Existing", "").unwrap();
    let result = target.import_page_json("0.0", &json).unwrap();
    assert!(result.changed);
    assert_eq!(content(&target, "0.0.0"), "day one: [Map]([0,0,0,0])");
    assert_eq!(content(&target, "0.0.0.0"), "back: [Trip]([0,0,0])");
    assert!(target.store().exists());
}

#[test]
fn test_rejections_are_warnings_not_errors() {
    let mut api = setup();
    api.add_page("0", "Only", "").unwrap();
    let result = api.promote_page("0.0").unwrap();
    assert!(!result.changed);
    assert!(result
        .messages
        .iter()
        .any(|m| m.level == MessageLevel::Warning));
    let result = api.demote_page("0.0", 0).unwrap();
    assert!(!result.changed);
}
