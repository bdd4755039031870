use dialdash::lifecycle::Lifecycle;
use dialdash::model::{Lane, ListKind, Store};
use dialdash::storage::{load_store, save_store, StoreLocation};
use tempfile::TempDir;

fn lifecycle_in(dir: &TempDir) -> (Lifecycle, StoreLocation) {
    let location = StoreLocation {
        path: dir.path().join("dialdash_v1.json"),
    };
    (Lifecycle::new(Store::default(), location.clone()), location)
}

#[test]
fn add_complete_restore_round_trip() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    assert!(core.add(Lane::Todo, "Buy milk").unwrap());
    assert_eq!(core.store().todo.len(), 1);
    assert_eq!(core.store().todo[0].text, "Buy milk");
    let original = core.store().todo[0].clone();

    assert!(core.complete(Lane::Todo, &original.id).unwrap());
    assert!(core.store().todo.is_empty());
    assert_eq!(core.store().done.len(), 1);
    assert_eq!(core.store().done[0].origin, Lane::Todo);
    assert!(core.store().done[0].done_at >= original.created_at);

    assert!(core.restore(&original.id).unwrap());
    assert!(core.store().done.is_empty());
    assert_eq!(core.store().todo.len(), 1);
    assert_eq!(core.store().todo[0], original);
}

#[test]
fn origin_fidelity_returns_items_to_their_source_list() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Ideas, "learn the accordion").unwrap();
    let id = core.store().ideas[0].id.clone();

    core.complete(Lane::Ideas, &id).unwrap();
    assert_eq!(core.store().done[0].origin, Lane::Ideas);

    core.restore(&id).unwrap();
    assert!(core.store().todo.is_empty());
    assert!(core.store().prio.is_empty());
    assert_eq!(core.store().ideas.len(), 1);
    assert_eq!(core.store().ideas[0].id, id);
}

#[test]
fn no_id_ever_appears_in_two_lists() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "one").unwrap();
    core.add(Lane::Todo, "two").unwrap();
    core.add(Lane::Ideas, "three").unwrap();
    let one = core.store().todo[1].id.clone();
    let two = core.store().todo[0].id.clone();
    let three = core.store().ideas[0].id.clone();

    core.promote(&two).unwrap();
    core.complete(Lane::Todo, &one).unwrap();
    core.restore(&one).unwrap();
    core.complete(Lane::Ideas, &three).unwrap();
    core.complete(Lane::Prio, &two).unwrap();

    for id in [&one, &two, &three] {
        let store = core.store();
        let hits = store.todo.iter().filter(|i| &i.id == id).count()
            + store.ideas.iter().filter(|i| &i.id == id).count()
            + store.prio.iter().filter(|i| &i.id == id).count()
            + store.done.iter().filter(|r| &r.item.id == id).count();
        assert_eq!(hits, 1, "id {id} should live in exactly one list");
    }
}

#[test]
fn promote_moves_todo_items_and_keeps_fields() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "ship the release").unwrap();
    let original = core.store().todo[0].clone();

    assert!(core.promote(&original.id).unwrap());
    assert!(core.store().todo.is_empty());
    assert_eq!(core.store().prio[0], original);

    // Only todo items promote.
    assert!(!core.promote(&original.id).unwrap());
}

#[test]
fn newest_items_sit_at_the_front() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "first").unwrap();
    core.add(Lane::Todo, "second").unwrap();
    assert_eq!(core.store().todo[0].text, "second");
    assert_eq!(core.store().todo[1].text, "first");
}

#[test]
fn blank_text_is_ignored_without_any_state_change() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    assert!(!core.add(Lane::Todo, "").unwrap());
    assert!(!core.add(Lane::Todo, "   \t ").unwrap());
    assert!(core.store().todo.is_empty());
    assert_eq!(core.revision(), 0);
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "real").unwrap();
    let revision = core.revision();

    assert!(!core.complete(Lane::Todo, "missing").unwrap());
    assert!(!core.restore("missing").unwrap());
    assert!(!core.remove(ListKind::Prio, "missing").unwrap());
    assert!(!core.edit_text(Lane::Prio, "missing", "text").unwrap());
    assert_eq!(core.revision(), revision);
    assert_eq!(core.store().todo.len(), 1);
}

#[test]
fn complete_only_acts_on_the_named_list() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Ideas, "misplaced").unwrap();
    let id = core.store().ideas[0].id.clone();

    assert!(!core.complete(Lane::Todo, &id).unwrap());
    assert_eq!(core.store().ideas.len(), 1);
    assert!(core.store().done.is_empty());
}

#[test]
fn edit_text_trims_and_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Prio, "draft wording").unwrap();
    let id = core.store().prio[0].id.clone();
    let created_at = core.store().prio[0].created_at;

    assert!(core.edit_text(Lane::Prio, &id, "  final wording  ").unwrap());
    assert_eq!(core.store().prio[0].text, "final wording");
    assert_eq!(core.store().prio[0].id, id);
    assert_eq!(core.store().prio[0].created_at, created_at);
}

#[test]
fn remove_and_clear_done_empty_their_targets() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "a").unwrap();
    core.add(Lane::Ideas, "b").unwrap();
    let a = core.store().todo[0].id.clone();
    let b = core.store().ideas[0].id.clone();

    core.complete(Lane::Ideas, &b).unwrap();
    assert!(core.remove(ListKind::Todo, &a).unwrap());
    assert!(core.store().todo.is_empty());

    assert!(core.clear_done().unwrap());
    assert!(core.store().done.is_empty());
    assert!(!core.clear_done().unwrap());
}

#[test]
fn every_mutation_persists_the_whole_snapshot() {
    let dir = TempDir::new().unwrap();
    let (mut core, location) = lifecycle_in(&dir);

    core.add(Lane::Todo, "persists").unwrap();
    let id = core.store().todo[0].id.clone();
    core.complete(Lane::Todo, &id).unwrap();

    let reloaded = load_store(&location);
    assert!(reloaded.todo.is_empty());
    assert_eq!(reloaded.done.len(), 1);
    assert_eq!(reloaded.done[0].item.text, "persists");
    assert_eq!(reloaded.done[0].origin, Lane::Todo);
}

#[test]
fn revision_counts_successful_mutations_only() {
    let dir = TempDir::new().unwrap();
    let (mut core, _) = lifecycle_in(&dir);

    core.add(Lane::Todo, "x").unwrap();
    core.add(Lane::Todo, "").unwrap();
    core.restore("nope").unwrap();
    assert_eq!(core.revision(), 1);
}

#[test]
fn load_survives_a_mangled_snapshot() {
    let dir = TempDir::new().unwrap();
    let location = StoreLocation {
        path: dir.path().join("dialdash_v1.json"),
    };

    std::fs::write(&location.path, r#"{"todo": 7, "ideas": [], "done": "x"}"#).unwrap();
    let store = load_store(&location);
    assert!(store.todo.is_empty());
    assert!(store.done.is_empty());

    std::fs::write(&location.path, "not json at all").unwrap();
    assert_eq!(load_store(&location), Store::default());

    let missing = StoreLocation {
        path: dir.path().join("never-written.json"),
    };
    assert_eq!(load_store(&missing), Store::default());
}

#[test]
fn snapshot_uses_the_wire_field_names() {
    let dir = TempDir::new().unwrap();
    let location = StoreLocation {
        path: dir.path().join("dialdash_v1.json"),
    };
    let mut core = Lifecycle::new(Store::default(), location.clone());
    core.add(Lane::Prio, "wire shape").unwrap();
    let id = core.store().prio[0].id.clone();
    core.complete(Lane::Prio, &id).unwrap();

    let raw = std::fs::read_to_string(&location.path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value["done"][0];
    assert!(record["createdAt"].is_i64());
    assert!(record["doneAt"].is_i64());
    assert_eq!(record["origin"], "prio");
    assert_eq!(record["id"], id);
}

#[test]
fn restore_defaults_to_todo_for_legacy_records_without_an_origin() {
    let dir = TempDir::new().unwrap();
    let location = StoreLocation {
        path: dir.path().join("dialdash_v1.json"),
    };
    let legacy = serde_json::json!({
        "todo": [],
        "ideas": [],
        "prio": [],
        "done": [
            { "id": "old1", "text": "from before origins", "createdAt": 1, "doneAt": 2 }
        ]
    });
    std::fs::write(&location.path, legacy.to_string()).unwrap();

    let store = load_store(&location);
    save_store(&location, &store).unwrap();
    let mut core = Lifecycle::new(store, location);
    assert!(core.restore("old1").unwrap());
    assert_eq!(core.store().todo.len(), 1);
    assert_eq!(core.store().todo[0].text, "from before origins");
}
