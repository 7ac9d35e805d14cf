// core/tests/test_json.rs
use serde_json::{json, Value};
use tempcoef_core::metrics::{config_errors_total, intervals_accepted_total, segment_runs_total};
use tempcoef_core::{envelope_json, segment_json, ConfigError, CoreError, METRICS};

fn request(rows: Vec<Value>, settings: Value, machine: Value) -> String {
    json!({
        "columns": ["Time", "Power", "Active Temp", "Tc"],
        "rows": rows,
        "skip_rows": 1,
        "mapping": {
            "time": "Time",
            "power": "Power",
            "reference": "Active Temp",
            "compound": {"column": "Tc"},
            "machine": machine
        },
        "settings": settings
    })
    .to_string()
}

fn plateau_rows() -> Vec<Value> {
    let mut rows = vec![json!(["s", "kW", "C", "C"])];
    // 20 s på 120 °C, så 3 s på 140 °C
    for t in 0..20 {
        rows.push(json!([t as f64, 1.5, 120.0, "80"]));
    }
    for t in 20..23 {
        rows.push(json!([t as f64, 1.5, 140.0, null]));
    }
    rows
}

#[test]
fn segment_json_returns_intervals_and_discarded() {
    let before = segment_runs_total(&METRICS).get();

    let out = segment_json(&request(
        plateau_rows(),
        json!({"tolerance": 0.5, "cooling_surface": 3.0}),
        json!({"fixed": 30.0}),
    ))
    .unwrap();

    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["ok"], true);
    assert!(v.get("reason").is_none());
    let intervals = v["intervals"].as_array().unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0]["anchor"], 120.0);
    assert_eq!(intervals[0]["mean_machine"], 30.0);
    // 1.5 kW · 1000 / (3 m² · 50 K) = 10
    assert!((intervals[0]["alpha"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(v["discarded"].as_array().unwrap().len(), 1);

    assert!(segment_runs_total(&METRICS).get() > before);
    assert!(intervals_accepted_total(&METRICS).get() >= 1);
}

#[test]
fn segment_json_flags_empty_result() {
    let out = segment_json(&request(
        plateau_rows(),
        json!({"tolerance": 0.5, "min_duration": 60.0, "cooling_surface": 3.0}),
        json!({"fixed": 30.0}),
    ))
    .unwrap();

    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["ok"], false);
    assert_eq!(v["reason"], "no_intervals");
    assert_eq!(v["min_duration"], 60.0);
    assert_eq!(v["discarded"].as_array().unwrap().len(), 2);
}

#[test]
fn segment_json_reports_skipped_with_reason() {
    let out = segment_json(&request(
        plateau_rows(),
        json!({"tolerance": 0.5, "cooling_surface": 3.0}),
        json!({"fixed": 80.0}),
    ))
    .unwrap();

    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["ok"], false);
    let skipped = v["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["reason"]["kind"], "equal_temperatures");
    assert!(skipped[0]["message"].as_str().unwrap().contains("coefficient undefined"));
}

#[test]
fn segment_json_config_error_is_err_and_counted() {
    let before = config_errors_total(&METRICS).get();

    let err = segment_json(&request(
        plateau_rows(),
        json!({"tolerance": 0.5, "cooling_surface": 0.0}),
        json!({"fixed": 30.0}),
    ))
    .unwrap_err();

    assert!(matches!(err, CoreError::Config(_)));
    assert!(err.to_string().contains("cooling_surface"));
    assert!(config_errors_total(&METRICS).get() > before);
}

#[test]
fn segment_json_parse_error_names_path() {
    let bad = json!({
        "columns": ["Time"],
        "rows": [],
        "mapping": {"time": "Time", "power": "P", "reference": "R",
                    "compound": {"column": "Tc"}, "machine": {"fixed": "warm"}},
        "settings": {"cooling_surface": 1.0}
    })
    .to_string();

    match segment_json(&bad) {
        Err(CoreError::Parse { path, .. }) => assert!(path.starts_with("mapping.machine"), "path={}", path),
        other => panic!("expected parse error, got {:?}", other),
    }
}

fn request_without_temps(settings: Value) -> String {
    json!({
        "columns": ["Time", "Power", "Active Temp", "Tc"],
        "rows": plateau_rows(),
        "skip_rows": 1,
        "mapping": {"time": "Time", "power": "Power", "reference": "Active Temp"},
        "settings": settings
    })
    .to_string()
}

#[test]
fn segment_json_falls_back_to_stored_temp_inputs() {
    let out = segment_json(&request_without_temps(json!({
        "tolerance": 0.5,
        "cooling_surface": 3.0,
        "compound": {"column": "Tc"},
        "machine": {"fixed": 30.0}
    })))
    .unwrap();

    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["intervals"][0]["mean_machine"], 30.0);
    assert!((v["intervals"][0]["alpha"].as_f64().unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn segment_json_without_any_temp_input_is_config_error() {
    let err = segment_json(&request_without_temps(json!({
        "tolerance": 0.5,
        "cooling_surface": 3.0,
        "compound": {"column": "Tc"}
    })))
    .unwrap_err();

    match err {
        CoreError::Config(ConfigError::MissingTempInput { which }) => assert_eq!(which, "machine"),
        other => panic!("expected MissingTempInput, got {:?}", other),
    }
}

#[test]
fn envelope_json_ranks_parameters_over_jointly_complete_rows() {
    let payload = json!({
        "parameters": {
            "names": ["Pressure", "Force"],
            "rows": [
                {"cycle_time": 0, "values": [1.0, 100.0]},
                {"cycle_time": 1, "values": [3.0, 400.0]},
                {"cycle_time": 2, "values": [null, 900.0]},
                {"cycle_time": 2, "values": [2.0]}
            ]
        }
    })
    .to_string();

    let out = envelope_json(&payload).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    assert!(v["points"].as_array().unwrap().is_empty());

    let params = v["parameters"].as_array().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0]["name"], "Force");
    assert_eq!(params[0]["axis"], "primary");
    assert_eq!(params[0]["range"], 300.0);
    assert_eq!(params[1]["name"], "Pressure");
    assert_eq!(params[1]["axis"], "secondary");
    // cycle_time 2 mangler Pressure → droppes for begge
    assert_eq!(params[0]["points"].as_array().unwrap().len(), 2);
}

#[test]
fn envelope_json_rejects_duplicate_parameters() {
    let payload = json!({
        "parameters": {"names": ["Force", "Force"], "rows": []}
    })
    .to_string();

    let err = envelope_json(&payload).unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::DuplicateParameter(ref n)) if n == "Force"));
}

#[test]
fn envelope_json_applies_step_filter() {
    let payload = json!({
        "after_step": 1,
        "series": [
            {"sheet": "c1", "points": [
                {"cycle_time": 0, "value": 5.0, "step": 1},
                {"cycle_time": 1, "value": 10.0, "step": 2},
                {"cycle_time": 2, "value": 12.0, "step": 2}
            ]},
            {"sheet": "c2", "points": [
                {"cycle_time": 0, "value": 14.0, "step": 2},
                {"cycle_time": 1, "value": 16.0}
            ]}
        ]
    })
    .to_string();

    let out = envelope_json(&payload).unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    let points = v["points"].as_array().unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["cycle_time"], 0.0);
    assert_eq!(points[0]["count"], 2);
    assert_eq!(points[0]["mean"], 12.0);
    assert_eq!(points[1]["count"], 1);
    assert!(points[1]["std"].is_null());
}

#[test]
fn metrics_text_exposes_counters() {
    let _ = segment_json(&request(
        plateau_rows(),
        json!({"tolerance": 0.5, "cooling_surface": 3.0}),
        json!({"fixed": 30.0}),
    ));
    let text = METRICS.gather_text();
    assert!(text.contains("tempcoef_segment_runs_total"));
    assert!(text.contains("tempcoef_intervals_accepted_total"));
}
