use aki::core::lexicon::{Lexicon, LexiconSource, TermScope};
use aki::plugins::dictionary::{self, DictionaryStore, ImportMode};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

fn terms(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(t, d)| (t.to_string(), d.to_string()))
        .collect()
}

#[test]
fn missing_file_is_an_empty_user_layer() {
    let tmp = tempdir().expect("tempdir");
    let store = DictionaryStore::new(tmp.path().join("dictionary.json"));
    let lexicon = store.load();
    assert!(lexicon.user_terms().is_empty());
    assert!(lexicon.lookup("habitus").is_some());
    assert!(!store.path().exists());
}

#[test]
fn corrupt_file_loads_as_empty() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("dictionary.json");
    fs::write(&path, "{ not json").expect("write");
    assert!(DictionaryStore::new(&path).load().user_terms().is_empty());
}

#[test]
fn save_then_load_restores_user_terms() {
    let tmp = tempdir().expect("tempdir");
    let store = DictionaryStore::new(tmp.path().join("nested").join("dictionary.json"));
    let mut lexicon = store.load();
    assert_eq!(
        lexicon.define("  Ostranenie ", "Defamiliarization").as_deref(),
        Some("ostranenie")
    );
    lexicon.define("habitus", "My own reading of Bourdieu");
    store.save(&lexicon).expect("save");

    let reloaded = store.load();
    assert_eq!(reloaded, lexicon);
    let habitus = reloaded.lookup("HABITUS").expect("habitus");
    assert_eq!(habitus.source, LexiconSource::User);
    assert_eq!(habitus.definition, "My own reading of Bourdieu");

    let on_disk: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(store.path()).expect("read")).expect("json");
    assert_eq!(on_disk.len(), 2);
}

#[test]
fn import_merges_or_replaces_and_persists() {
    let tmp = tempdir().expect("tempdir");
    let store = DictionaryStore::new(tmp.path().join("dictionary.json"));
    let mut lexicon = Lexicon::with_user_terms(terms(&[("keep", "kept term")]));

    let source = tmp.path().join("import.json");
    fs::write(
        &source,
        serde_json::to_string(&terms(&[("Praxis", "Theory in action"), ("doxa", "The taken for granted")]))
            .expect("json"),
    )
    .expect("write");

    let n = store
        .import(&mut lexicon, &source, ImportMode::Merge)
        .expect("merge");
    assert_eq!(n, 2);
    assert_eq!(lexicon.list_terms(TermScope::UserOnly).len(), 3);
    assert!(lexicon.lookup("praxis").is_some());
    assert_eq!(store.load(), lexicon);

    store
        .import(&mut lexicon, &source, ImportMode::Replace)
        .expect("replace");
    assert!(lexicon.lookup("keep").is_none());
    assert_eq!(store.load().user_terms().len(), 2);
}

#[test]
fn import_of_missing_file_fails_without_touching_the_layer() {
    let tmp = tempdir().expect("tempdir");
    let store = DictionaryStore::new(tmp.path().join("dictionary.json"));
    let mut lexicon = Lexicon::with_user_terms(terms(&[("keep", "kept term")]));
    assert!(
        store
            .import(&mut lexicon, &tmp.path().join("absent.json"), ImportMode::Replace)
            .is_err()
    );
    assert!(lexicon.lookup("keep").is_some());
    assert!(!store.path().exists());
}

#[test]
fn export_writes_core_and_user_terms() {
    let tmp = tempdir().expect("tempdir");
    let mut lexicon = Lexicon::new();
    lexicon.define("doxa", "The taken for granted");
    let core_count = lexicon.list_terms(TermScope::CoreOnly).len();

    let dest = tmp.path().join("all.json");
    let written = dictionary::export(&lexicon, &dest).expect("export");
    assert_eq!(written, core_count + 1);

    let exported: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(&dest).expect("read")).expect("json");
    assert_eq!(exported.get("doxa").map(String::as_str), Some("The taken for granted"));
    assert_eq!(exported.get("ai").map(String::as_str), Some("Artificial Intelligence"));
    assert_eq!(exported.get("academic search").map(String::as_str), Some("Search validated academic databases"));
}
