pub mod cli;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod segmenter;
pub mod storage;
pub mod table;
pub mod types;

#[cfg(feature = "python")]
pub mod py;

use serde::Deserialize;
use serde_json::json;

pub use envelope::{
    envelope, filter_after_step, joint_profiles, rank_parameters, CyclePoint, CycleSeries, EnvelopePoint,
    ParameterRow, ParameterSelection,
};
pub use error::{ConfigError, CoreError, SkipReason};
pub use metrics::{Metrics, METRICS};
pub use segmenter::{coefficient, segment};
pub use storage::{load_settings, save_settings};
pub use table::{map_table, Cell, ColumnMapping, MappedTable, MappingRequest, Table};
pub use types::{
    DiscardedPhase, IntervalRecord, Sample, SegmentConfig, SegmentReport, SegmentSettings,
    SkippedInterval, TempInput, TempSource,
};

#[derive(Debug, Deserialize)]
struct SegmentRequest {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    #[serde(default)]
    skip_rows: usize,
    mapping: MappingRequest,
    settings: SegmentSettings,
}

#[derive(Debug, Deserialize)]
struct EnvelopeRequest {
    #[serde(default)]
    series: Vec<CycleSeries>,
    #[serde(default)]
    after_step: Option<f64>,
    #[serde(default)]
    parameters: Option<ParameterSelection>,
}

fn run_segment_request(req: SegmentRequest) -> Result<SegmentReport, CoreError> {
    let table = Table::from_rows(req.columns.as_slice(), req.rows).skip_leading_rows(req.skip_rows);
    let mapping = req.mapping.complete(&req.settings)?;
    let mapped = map_table(&table, &mapping)?;
    let config = req.settings.to_config(mapped.compound, mapped.machine);
    Ok(segment(&mapped.samples, &config)?)
}

/// JSON inn → tabell → mapping → segmentering → JSON ut.
///
/// Konfigurasjonsfeil returneres som `Err`. Et tomt resultat er ikke en feil,
/// men merkes med `"ok": false, "reason": "no_intervals"`.
pub fn segment_json(json_in: &str) -> Result<String, CoreError> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    let req: SegmentRequest = serde_path_to_error::deserialize(&mut de).map_err(CoreError::parse)?;

    let report = match run_segment_request(req) {
        Ok(r) => r,
        Err(e) => {
            METRICS.record_config_error();
            return Err(e);
        }
    };
    METRICS.record_report(&report);

    let found = !report.is_empty();
    let mut out = json!({
        "ok": found,
        "intervals": &report.intervals,
        "skipped": &report.skipped,
        "discarded": &report.discarded,
        "min_duration": report.min_duration,
    });
    if !found {
        out["reason"] = json!("no_intervals");
    }
    Ok(out.to_string())
}

/// JSON inn (ark-serier, valgfritt step-filter, valgfrie parametere) →
/// konvolutt-punkter og parametere rangert for akseplassering.
pub fn envelope_json(json_in: &str) -> Result<String, CoreError> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    let req: EnvelopeRequest = serde_path_to_error::deserialize(&mut de).map_err(CoreError::parse)?;

    let series = match req.after_step {
        Some(step) => filter_after_step(&req.series, step),
        None => req.series,
    };
    let mut out = json!({ "points": envelope(&series) });

    if let Some(selection) = req.parameters {
        let profiles = joint_profiles(&selection)?;
        let ranked = rank_parameters(&profiles)?;
        let parameters: Vec<serde_json::Value> = ranked
            .iter()
            .map(|r| {
                let points = profiles
                    .iter()
                    .find(|(name, _)| *name == r.name)
                    .map(|(_, points)| points.as_slice())
                    .unwrap_or_default();
                json!({ "name": r.name, "range": r.range, "axis": r.axis, "points": points })
            })
            .collect();
        out["parameters"] = json!(parameters);
    }
    Ok(out.to_string())
}
