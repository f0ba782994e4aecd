use std::fs;

use psy_core::{EditRequest, EngineConfig, Record, RecordError};
use psy_model::{CellValue, Palette};
use psy_test_utils::{day, editor_for, sample_document, sample_record, today};
use serde_json::{json, Value};

#[test]
fn test_save_and_reload_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("record.json");

    let record = sample_record();
    fs::write(&path, record.to_json_string(true).unwrap()).unwrap();

    let source = fs::read_to_string(&path).unwrap();
    let loaded = Record::from_json_str(&source, Palette::default(), today()).unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn test_saved_shape_matches_loaded_shape() {
    let loaded = Record::from_value(&sample_document(), Palette::default(), today()).unwrap();
    let saved: Value = serde_json::from_str(&loaded.to_json_string(false).unwrap()).unwrap();

    let keys: Vec<&str> = saved.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["client", "measures", "sessions", "practices"]);
    assert_eq!(saved["measures"][1]["Max"], json!(null));
    assert_eq!(saved["measures"][0]["Color"], json!("#1f77b4"));
    assert_eq!(saved["sessions"][2]["Panic attacks"], json!(null));
    assert_eq!(saved["client"][0]["Age"], json!(37));
}

#[test]
fn test_missing_sections_take_defaults() {
    let record = Record::from_value(&json!({"client": [{"ID": "C-1"}]}), Palette::default(), today()).unwrap();
    assert_eq!(record.client.id, "C-1");
    assert!(record.measures.get(0).unwrap().is_placeholder());
    assert!(record.practices.get(0).unwrap().is_placeholder());
    assert_eq!(record.sessions.len(), 1);
}

#[test]
fn test_shape_errors_are_fatal() {
    for document in [json!("record"), json!({"practices": 3}), json!({"client": {"ID": "x"}})] {
        let err = Record::from_value(&document, Palette::default(), today()).unwrap_err();
        assert!(matches!(err, RecordError::Shape { .. }), "{document}");
    }
}

#[test]
fn test_config_palette_colors_measures() {
    let config = EngineConfig::from_toml_str("palette = [\"#111111\", \"#222222\"]").unwrap();
    let record = Record::from_value(&sample_document(), config.palette.clone(), today()).unwrap();
    let colors: Vec<&str> = record.measures.iter().map(|m| m.color.as_str()).collect();
    assert_eq!(colors, vec!["#111111", "#222222"]);
}

#[test]
fn test_practice_sharing_measure_name_is_demoted_on_load() {
    let document = json!({
        "measures": [{"Name": "Mood", "Type": "Scale", "Min": 0, "Max": 10}],
        "practices": [{"Name": "Mood"}],
        "sessions": [{"session_number": 1, "session_date": "2024-01-01", "Mood": 5}]
    });
    let record = Record::from_value(&document, Palette::default(), today()).unwrap();
    assert!(record.practices.get(0).unwrap().is_placeholder());
    assert!(record.columns().practices().is_empty());
    assert_eq!(
        record.sessions.get(0).unwrap().get("Mood"),
        Some(&CellValue::Measure(Some(5.0)))
    );

    let mut editor = editor_for(record);
    let response = editor.apply(EditRequest::DeletePractices {
        names: vec!["Mood".into()],
    });
    assert_eq!(response.record.columns().measures(), ["Mood".to_string()]);
    assert_eq!(response.record.sessions.get(0).unwrap().measure("Mood"), Some(5.0));
}

#[test]
fn test_measure_named_like_fixed_field_keeps_dates() {
    let document = json!({
        "measures": [
            {"Name": "session_date", "Type": "Count"},
            {"Name": "Sleep", "Type": "Count"},
            {"Name": "Sleep", "Type": "Count"}
        ],
        "sessions": [{"session_number": 1, "session_date": "2024-01-01", "Sleep": 7}]
    });
    let record = Record::from_value(&document, Palette::default(), today()).unwrap();
    assert_eq!(record.columns().measures(), ["Sleep".to_string()]);

    let reloaded =
        Record::from_json_str(&record.to_json_string(false).unwrap(), Palette::default(), today()).unwrap();
    assert_eq!(reloaded.sessions.get(0).unwrap().session_date, day(2024, 1, 1));
    assert_eq!(reloaded.sessions.get(0).unwrap().measure("Sleep"), Some(7.0));
    assert_eq!(reloaded, record);
}
