//! Testing utilities for PsyDash workspace
//!
//! Shared fixtures: a pinned clock, sample records and an editor over them.

#![allow(missing_docs)]

use std::sync::Arc;

use chrono::NaiveDate;
use psy_core::{EngineConfig, Record, RecordEditor};
use psy_ledger::SessionLedger;
use psy_model::{FixedClock, Measure, Palette, Practice, Session};
use psy_registry::{MeasureRegistry, PracticeRegistry};
use serde_json::{json, Value};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Date every fixture treats as today
pub fn today() -> NaiveDate {
    day(2024, 6, 1)
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(today()))
}

pub fn empty_record() -> Record {
    Record::new(Palette::default(), today())
}

/// Mood (Scale 0..10) with one session recording Mood=5
pub fn mood_record() -> Record {
    Record {
        measures: MeasureRegistry::from_rows([Measure::scale("Mood", 0.0, 10.0)], Palette::default()),
        sessions: SessionLedger::from_rows([Session::new(1, day(2024, 1, 1)).with_measure("Mood", Some(5.0))]),
        ..empty_record()
    }
}

/// Two measures, two practices and three weekly sessions
pub fn sample_record() -> Record {
    let measures = MeasureRegistry::from_rows(
        [
            Measure::scale("Mood", 0.0, 10.0).with_rater("Self"),
            Measure::count("Panic attacks").with_rater("Therapist"),
        ],
        Palette::default(),
    );
    let practices = PracticeRegistry::from_rows([
        Practice::new("Exposure").with_description("in vivo"),
        Practice::new("Homework"),
    ]);
    let sessions = SessionLedger::from_rows([
        Session::new(1, day(2024, 1, 1))
            .with_measure("Mood", Some(3.0))
            .with_measure("Panic attacks", Some(4.0))
            .with_practice("Exposure", true)
            .with_practice("Homework", false),
        Session::new(2, day(2024, 1, 8))
            .with_measure("Mood", Some(6.0))
            .with_measure("Panic attacks", Some(2.0))
            .with_practice("Exposure", true)
            .with_practice("Homework", true),
        Session::new(3, day(2024, 1, 15))
            .with_measure("Mood", Some(8.5))
            .with_measure("Panic attacks", None)
            .with_practice("Exposure", false)
            .with_practice("Homework", true),
    ]);
    Record {
        measures,
        practices,
        sessions,
        ..empty_record()
    }
}

/// Persisted form of [`sample_record`] with loosely-typed fields
pub fn sample_document() -> Value {
    json!({
        "client": [{"ID": "C-042", "Age": "37", "Gender": "f", "Focus": "panic disorder", "Notes": ""}],
        "measures": [
            {"Name": "Mood", "Type": "Scale", "Min": "0", "Max": 10, "Rater": "Self", "Description": "", "SelectMeasure": 0, "SelectRater": ""},
            {"Name": "Panic attacks", "Type": "Count", "Min": null, "Max": null, "Rater": "Therapist", "Description": ""}
        ],
        "sessions": [
            {"session_number": 1, "session_date": "2024-01-01", "Mood": 3, "Panic attacks": "4", "Exposure": true, "Homework": false},
            {"session_number": 2, "session_date": "2024-01-08", "Mood": "6", "Panic attacks": 2, "Exposure": 1, "Homework": true},
            {"session_number": 3, "session_date": "2024-01-15", "Mood": 8.5, "Panic attacks": "", "Exposure": false, "Homework": "yes"}
        ],
        "practices": [
            {"Name": "Exposure", "Description": "in vivo"},
            {"Name": "Homework", "Description": ""}
        ]
    })
}

pub fn editor_for(record: Record) -> RecordEditor {
    RecordEditor::new(record, EngineConfig::default()).with_clock(fixed_clock())
}

pub fn dates(record: &Record) -> Vec<NaiveDate> {
    record.sessions.iter().map(|s| s.session_date).collect()
}

pub fn numbers(record: &Record) -> Vec<u32> {
    record.sessions.iter().map(|s| s.session_number).collect()
}
