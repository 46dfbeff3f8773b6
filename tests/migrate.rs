use std::fs;

use serde_json::{json, Value};

use qbank::migrate::{run, MigrationOptions};
use qbank::MigrationError;

fn fixture(root: &std::path::Path) {
    fs::write(
        root.join("manifest.json"),
        r#"{"categories":[
            {"key":"misc","file":"misc.json","label":"Misc"},
            {"key":"sport","file":"sport.json","label":"Sport"}]}"#,
    )
    .unwrap();
    fs::write(
        root.join("misc.json"),
        r#"[
            {"id":"misc-002","question":"second","answer":"b","difficulty":3,"author":"Zed","tags":["x"]},
            {"id":"misc-001","question":"first","answer":"a"},
            {"question":"no id"}
        ]"#,
    )
    .unwrap();
    fs::write(
        root.join("sport.json"),
        r#"[{"id":"sport-10","question":"ten"},{"id":"sport-9","question":"nine"}]"#,
    )
    .unwrap();
}

#[test]
fn consolidates_in_manifest_then_legacy_order() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let written = run(&MigrationOptions::new(dir.path())).unwrap();
    assert_eq!(written, 5);

    let out = dir.path().join("data").join("questions.json");
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.ends_with("]\n"));
    assert!(text.contains("\n  {\n    \"id\": \"0001\""));

    let v: Value = serde_json::from_str(&text).unwrap();
    let items = v.as_array().unwrap();
    let questions: Vec<&str> = items.iter().map(|q| q["question"].as_str().unwrap()).collect();
    assert_eq!(questions, vec!["first", "second", "no id", "nine", "ten"]);
    let ids: Vec<&str> = items.iter().map(|q| q["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["0001", "0002", "0003", "0004", "0005"]);

    assert_eq!(
        items[0],
        json!({
            "id": "0001",
            "legacyId": "misc-001",
            "category": "misc",
            "question": "first",
            "answer": "a",
            "difficulty": 2,
            "author": "Halli",
            "tags": []
        })
    );
    assert_eq!(items[1]["author"], json!("Zed"));
    assert_eq!(items[1]["tags"], json!(["x"]));
    assert!(items[2].get("legacyId").is_none());
    assert_eq!(items[3]["category"], json!("sport"));
}

#[test]
fn custom_output_and_author() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let target = dir.path().join("out").join("all.json");
    let opts = MigrationOptions {
        output: Some(target.clone()),
        default_author: "Nobody".into(),
        ..MigrationOptions::new(dir.path())
    };

    assert_eq!(run(&opts).unwrap(), 5);
    let v: Value = serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(v[0]["author"], json!("Nobody"));
    assert!(!dir.path().join("data").exists());
}

#[test]
fn missing_category_file_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    fs::remove_file(dir.path().join("sport.json")).unwrap();

    let err = run(&MigrationOptions::new(dir.path())).unwrap_err();
    assert!(matches!(err, MigrationError::Read { .. }));
    assert!(!dir.path().join("data").join("questions.json").exists());
}
