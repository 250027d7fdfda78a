//! End-to-end tests driving the store the way a GUI shell would:
//! build a notebook, mutate it, save, and reopen it from disk.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use bindery::notebook::{DEFAULT_PAGE_TITLE, TRASH_TITLE};
use bindery::{AttrValue, BinderyError, NodeId, NodeKind, Notebook};

#[test]
fn full_lifecycle_survives_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let root_path = tmp.path().join("book");

    {
        let mut nb = Notebook::create(&root_path).unwrap();
        let root = nb.root();

        let projects = nb.new_folder(root, "Projects").unwrap();
        let design = nb.new_page(projects, "Design Notes").unwrap();
        nb.new_page(root, "Inbox").unwrap();

        nb.set_attr(projects, "expanded", AttrValue::Bool(true));
        nb.set_attr(design, "x_color", AttrValue::Text("teal".into()));
        nb.save(false).unwrap();
    }

    let mut nb = Notebook::load(&root_path).unwrap();
    let root = nb.root();
    assert_eq!(nb.title(root), "book");

    let kids = nb.children(root).unwrap();
    let titles: Vec<&str> = kids.iter().map(|id| nb.title(*id)).collect();
    assert_eq!(titles, vec!["Projects", "Inbox", TRASH_TITLE]);

    let projects = kids[0];
    assert_eq!(nb.kind(projects), NodeKind::Folder);
    assert_eq!(
        nb.get_attr(projects, "expanded"),
        Some(&AttrValue::Bool(true))
    );

    let inner = nb.children(projects).unwrap();
    assert_eq!(inner.len(), 1);
    let design = inner[0];
    assert_eq!(nb.title(design), "Design Notes");
    assert_eq!(nb.kind(design), NodeKind::Page);
    assert!(nb.data_file(design).is_file());
    assert_eq!(
        nb.get_attr(design, "x_color"),
        Some(&AttrValue::Text("teal".into()))
    );

    assert_eq!(nb.prefs.default_font, "Sans 10");
}

#[test]
fn moved_subtree_reloads_at_its_new_location() {
    let tmp = tempfile::tempdir().unwrap();
    let root_path = tmp.path().join("book");

    {
        let mut nb = Notebook::create(&root_path).unwrap();
        let root = nb.root();
        let archive = nb.new_folder(root, "Archive").unwrap();
        let work = nb.new_folder(root, "Work").unwrap();
        nb.new_page(work, "Report").unwrap();

        nb.move_node(work, archive, None).unwrap();
        nb.save(false).unwrap();
    }

    assert!(root_path.join("archive").join("work").join("report").is_dir());
    assert!(!root_path.join("work").exists());

    let mut nb = Notebook::load(&root_path).unwrap();
    let root = nb.root();
    let archive = nb.children(root).unwrap()[0];
    let work = nb.children(archive).unwrap()[0];
    let report = nb.children(work).unwrap()[0];
    assert_eq!(nb.title(report), "Report");
    assert_eq!(
        nb.path(report),
        root_path.join("archive").join("work").join("report")
    );
}

#[test]
fn trashed_nodes_reload_inside_the_trash() {
    let tmp = tempfile::tempdir().unwrap();
    let root_path = tmp.path().join("book");

    {
        let mut nb = Notebook::create(&root_path).unwrap();
        let root = nb.root();
        let scrap = nb.new_page(root, "Scrap").unwrap();
        nb.trash_node(scrap).unwrap();
        nb.save(false).unwrap();
    }

    let mut nb = Notebook::load(&root_path).unwrap();
    let trash = nb.trash().unwrap();
    let kids = nb.children(trash).unwrap();
    assert_eq!(kids.len(), 1);
    assert_eq!(nb.title(kids[0]), "Scrap");
    assert!(nb.in_trash(kids[0]));
}

#[test]
fn newer_on_disk_format_refuses_to_load() {
    let tmp = tempfile::tempdir().unwrap();
    let root_path = tmp.path().join("book");
    Notebook::create(&root_path).unwrap();

    let pref_file = bindery::prefs::pref_file(&root_path);
    fs::write(
        &pref_file,
        "<?xml version=\"1.0\"?>\n<notebook>\n<version>99</version>\n\
         <default_font>Sans 10</default_font>\n</notebook>\n",
    )
    .unwrap();

    match Notebook::load(&root_path) {
        Err(BinderyError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, 99);
            assert_eq!(supported, bindery::FORMAT_VERSION);
        }
        other => panic!("expected version error, got {:?}", other.map(|_| ())),
    }

    assert_eq!(bindery::prefs::notebook_version(&root_path).unwrap(), 99);
}

#[test]
fn listeners_observe_mutations_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let mut nb = Notebook::create(tmp.path().join("book")).unwrap();
    let root = nb.root();

    let log: Rc<RefCell<Vec<(Vec<NodeId>, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    nb.node_changed.add(move |nodes, recurse| {
        sink.borrow_mut().push((nodes.to_vec(), recurse));
    });

    let page = nb.new_page(root, DEFAULT_PAGE_TITLE).unwrap();
    nb.rename(page, "Renamed").unwrap();

    let events = log.borrow().clone();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], (vec![root], true));
    assert_eq!(events[1], (vec![page], false));

    // suppressed notifications are dropped outright
    log.borrow_mut().clear();
    nb.node_changed.suppress(None);
    let other = nb.new_page(root, "Quiet").unwrap();
    nb.node_changed.resume(None);
    assert!(log.borrow().is_empty());

    // a cross-parent move reports both parents
    let folder = nb.new_folder(root, "Box").unwrap();
    log.borrow_mut().clear();
    nb.move_node(other, folder, None).unwrap();
    let events = log.borrow().clone();
    assert_eq!(events, vec![(vec![root, folder], true)]);
}

#[test]
fn save_force_rewrites_clean_nodes() {
    let tmp = tempfile::tempdir().unwrap();
    let root_path = tmp.path().join("book");

    let mut nb = Notebook::create(&root_path).unwrap();
    let root = nb.root();
    let page = nb.new_page(root, "Stable").unwrap();
    nb.save(false).unwrap();

    let sidecar = bindery::meta::meta_file(&nb.path(page));
    fs::remove_file(&sidecar).unwrap();

    // nothing is dirty, so only a forced save recreates the file
    nb.save(false).unwrap();
    assert!(!sidecar.exists());
    nb.save(true).unwrap();
    assert!(sidecar.exists());
}

#[test]
fn deleting_a_page_removes_its_content_file() {
    let tmp = tempfile::tempdir().unwrap();
    let mut nb = Notebook::create(tmp.path().join("book")).unwrap();
    let root = nb.root();

    let page = nb.new_page(root, "Gone Soon").unwrap();
    let data = nb.data_file(page);
    assert!(data.is_file());

    nb.delete(page).unwrap();
    assert!(!data.exists());
    assert!(!nb.is_valid(page));
}
