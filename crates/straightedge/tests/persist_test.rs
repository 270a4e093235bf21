//! Integration tests for saving and loading constructions.

use tempfile::tempdir;

use straightedge::{ConstructionError, Model, persist::ModelDocument};

fn vesica() -> Model {
    let mut model = Model::new("vesica");
    let a = model.set_point(0, 0, &["given"]).unwrap().element;
    let b = model.set_point(1, 0, &["given"]).unwrap().element;
    model.construct_line(a, b).unwrap();
    model.construct_circle(a, b).unwrap();
    model.construct_circle(b, a).unwrap();
    model
}

fn labels(model: &Model) -> Vec<String> {
    model
        .store()
        .iter()
        .map(|(_, _, details)| details.label().to_string())
        .collect()
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("vesica.json");

    let model = vesica();
    model.save(&path).unwrap();
    let loaded = Model::load(&path).unwrap();

    assert_eq!(loaded.name(), "vesica");
    assert_eq!(labels(&loaded), labels(&model));

    let e = loaded.element_by_label("E").unwrap();
    assert_eq!(loaded.ancestor_labels(e).unwrap(), ["A", "B", "b", "c"]);
    let a = loaded.element_by_label("A").unwrap();
    assert!(loaded.store().get(a).unwrap().has_class("given"));

    for label in ["A", "C", "E", "c"] {
        let original = model.store().element(model.element_by_label(label).unwrap()).unwrap();
        let restored = loaded.store().element(loaded.element_by_label(label).unwrap()).unwrap();
        assert_eq!(original, restored, "element {label}");
    }
}

#[test]
fn test_loaded_model_continues_labels_and_dedup() {
    let mut model = vesica();
    model.remove_by_label("F").unwrap();
    let loaded_json = model.to_json().unwrap();
    let mut loaded = Model::from_json(&loaded_json).unwrap();

    // F was retired before saving
    let next = loaded.set_point(3, 3, &[]).unwrap();
    assert_eq!(loaded.store().get(next.element).unwrap().label(), "G");

    // existing geometry is still recognized
    let again = loaded.set_point(2, 0, &[]).unwrap();
    assert!(!again.is_new);
    assert_eq!(loaded.store().get(again.element).unwrap().label(), "D");

    let a = loaded.element_by_label("A").unwrap();
    let b = loaded.element_by_label("B").unwrap();
    assert!(!loaded.construct_circle(b, a).unwrap().structure.is_new);
}

#[test]
fn test_removed_newest_element_keeps_its_creation_index_retired() {
    let mut model = Model::new("pair");
    model.set_point(0, 0, &["given"]).unwrap();
    model.set_point(1, 0, &[]).unwrap();
    model.remove_by_label("B").unwrap();

    let mut loaded = Model::from_json(&model.to_json().unwrap()).unwrap();
    assert_eq!(loaded.store().next_creation_index(), model.store().next_creation_index());

    let original = model.set_point(5, 5, &[]).unwrap().element;
    let reloaded = loaded.set_point(5, 5, &[]).unwrap().element;
    let index = |model: &Model, element| model.store().get(element).unwrap().creation_index();
    assert_eq!(index(&model, original), 2);
    assert_eq!(index(&loaded, reloaded), 2);
}

#[test]
fn test_document_round_trip_is_stable() {
    let model = vesica();
    let json = model.to_json().unwrap();
    let reloaded = Model::from_json(&json).unwrap();
    assert_eq!(
        ModelDocument::from_json(&json).unwrap(),
        ModelDocument::from_json(&reloaded.to_json().unwrap()).unwrap()
    );
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    assert!(matches!(
        Model::load(dir.path().join("missing.json")),
        Err(ConstructionError::Io(_))
    ));
}
