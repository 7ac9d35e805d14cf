use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::types::SegmentReport;

/// Tellere for segmenteringskjøringer. Hver instans har eget register.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    segment_runs: IntCounter,
    intervals_accepted: IntCounter,
    intervals_skipped: IntCounter,
    phases_discarded: IntCounter,
    config_errors: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("tempcoef".into()), None)?;
        Ok(Self {
            segment_runs: counter(&registry, "segment_runs_total", "Segmentation runs")?,
            intervals_accepted: counter(&registry, "intervals_accepted_total", "Intervals with a coefficient")?,
            intervals_skipped: counter(&registry, "intervals_skipped_total", "Intervals skipped with a reason")?,
            phases_discarded: counter(&registry, "phases_discarded_total", "Phases shorter than min_duration")?,
            config_errors: counter(&registry, "segment_config_errors_total", "Runs rejected before scanning")?,
            registry,
        })
    }

    pub fn record_report(&self, report: &SegmentReport) {
        self.segment_runs.inc();
        self.intervals_accepted.inc_by(report.intervals.len() as u64);
        self.intervals_skipped.inc_by(report.skipped.len() as u64);
        self.phases_discarded.inc_by(report.discarded.len() as u64);
    }

    pub fn record_config_error(&self) {
        self.segment_runs.inc();
        self.config_errors.inc();
    }

    pub fn gather_text(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            log::warn!("metrics encode failed: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

pub fn segment_runs_total(m: &Metrics) -> &IntCounter {
    &m.segment_runs
}

pub fn intervals_accepted_total(m: &Metrics) -> &IntCounter {
    &m.intervals_accepted
}

pub fn intervals_skipped_total(m: &Metrics) -> &IntCounter {
    &m.intervals_skipped
}

pub fn phases_discarded_total(m: &Metrics) -> &IntCounter {
    &m.phases_discarded
}

pub fn config_errors_total(m: &Metrics) -> &IntCounter {
    &m.config_errors
}

/// Prosess-globale tellere som JSON- og Python-inngangene skriver til.
pub static METRICS: Lazy<Metrics> =
    Lazy::new(|| Metrics::new().expect("static metric names are valid"));
