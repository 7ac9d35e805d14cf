use std::ops::Range;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ConfigError, CoreError, SkipReason};

/// Standard minimumsvarighet for en fase (tidsenheter i tidskolonnen).
pub const DEFAULT_MIN_DURATION: f64 = 10.0;

/// Én rad fra riggen, etter at kolonnene er mappet til faste felt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,                  // tidskolonnen (typisk sekunder)
    pub reference: f64,             // aktiv temperatur (fase-referanse)
    pub power: Option<f64>,         // kW
    pub compound_temp: Option<f64>, // Tc
    pub machine_temp: Option<f64>,  // Tm
}

impl Sample {
    pub fn new(time: f64, reference: f64, power: Option<f64>) -> Self {
        Self {
            time,
            reference,
            power,
            compound_temp: None,
            machine_temp: None,
        }
    }

    pub fn with_temps(mut self, compound: Option<f64>, machine: Option<f64>) -> Self {
        self.compound_temp = compound;
        self.machine_temp = machine;
        self
    }
}

/// Hvor en temperatur kommer fra i kjernen: målt per sample, eller en fast verdi.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempSource {
    Measured,
    Fixed(f64),
}

/// Temperatur-input på grensen: kolonnenavn eller manuell verdi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempInput {
    Column(String),
    Fixed(f64),
}

/// Persisterbare innstillinger (tolerance, varighet, kjøleflate og valgt
/// temperatur-input: kolonne eller manuell verdi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSettings {
    #[serde(default)]
    pub tolerance: f64,
    #[serde(default = "default_min_duration")]
    pub min_duration: f64,
    pub cooling_surface: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound: Option<TempInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<TempInput>,
    #[serde(default)]
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_min_duration() -> f64 {
    DEFAULT_MIN_DURATION
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            min_duration: DEFAULT_MIN_DURATION,
            cooling_surface: 1.0,
            compound: None,
            machine: None,
            saved_at: None,
        }
    }
}

impl SegmentSettings {
    /// Husk temperatur-valget fra en mapping, slik at neste økt starter med samme valg.
    pub fn remember_inputs(&mut self, compound: &TempInput, machine: &TempInput) {
        self.compound = Some(compound.clone());
        self.machine = Some(machine.clone());
    }

    pub fn to_config(&self, compound: TempSource, machine: TempSource) -> SegmentConfig {
        SegmentConfig {
            tolerance: self.tolerance,
            min_duration: self.min_duration,
            cooling_surface: self.cooling_surface,
            compound,
            machine,
        }
    }
}

/// Full konfigurasjon for én segmenteringskjøring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    pub tolerance: f64,
    pub min_duration: f64,
    pub cooling_surface: f64,
    pub compound: TempSource,
    pub machine: TempSource,
}

impl SegmentConfig {
    pub fn new(tolerance: f64, cooling_surface: f64) -> Self {
        Self {
            tolerance,
            min_duration: DEFAULT_MIN_DURATION,
            cooling_surface,
            compound: TempSource::Measured,
            machine: TempSource::Measured,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if !(self.min_duration.is_finite() && self.min_duration >= 0.0) {
            return Err(ConfigError::InvalidMinDuration(self.min_duration));
        }
        if !(self.cooling_surface.is_finite() && self.cooling_surface > 0.0) {
            return Err(ConfigError::InvalidCoolingSurface(self.cooling_surface));
        }
        for (which, src) in [("compound", self.compound), ("machine", self.machine)] {
            if let TempSource::Fixed(value) = src {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidFixedTemp { which, value });
                }
            }
        }
        Ok(())
    }
}

/// Ett godkjent intervall. Bygges én gang og endres ikke etterpå.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub anchor: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub power_values: Vec<f64>,
    pub mean_power: f64,
    pub mean_compound: f64,
    pub mean_machine: f64,
    pub alpha: f64,
}

impl IntervalRecord {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn rows(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Regner alpha på nytt fra egne snittverdier (samme formel som segmentereren).
    pub fn recompute_alpha(&self, cooling_surface: f64) -> f64 {
        crate::segmenter::coefficient(
            self.mean_power,
            self.mean_compound,
            self.mean_machine,
            cooling_surface,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkippedInterval {
    pub anchor: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub reason: SkipReason,
}

impl SkippedInterval {
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}

// `message` skrives alltid ut fra `reason`; ved innlesing ignoreres den.
impl Serialize for SkippedInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("SkippedInterval", 7)?;
        st.serialize_field("anchor", &self.anchor)?;
        st.serialize_field("start_time", &self.start_time)?;
        st.serialize_field("end_time", &self.end_time)?;
        st.serialize_field("start_index", &self.start_index)?;
        st.serialize_field("end_index", &self.end_index)?;
        st.serialize_field("reason", &self.reason)?;
        st.serialize_field("message", &self.message())?;
        st.end()
    }
}

/// Fase kortere enn min_duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardedPhase {
    pub anchor: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentReport {
    pub intervals: Vec<IntervalRecord>,
    pub skipped: Vec<SkippedInterval>,
    pub discarded: Vec<DiscardedPhase>,
    #[serde(default = "default_min_duration")]
    pub min_duration: f64, // gulvet kjøringen brukte
}

impl SegmentReport {
    /// Ingen intervaller nådde minimumsvarigheten.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn require_intervals(self) -> Result<Self, CoreError> {
        if self.is_empty() {
            Err(CoreError::NoIntervals {
                min_duration: self.min_duration,
            })
        } else {
            Ok(self)
        }
    }

    /// Alle faser (godkjent, hoppet over, forkastet) som sorterte radintervaller.
    pub fn covered_ranges(&self) -> Vec<Range<usize>> {
        let mut out: Vec<Range<usize>> = self
            .intervals
            .iter()
            .map(|r| r.start_index..r.end_index)
            .chain(self.skipped.iter().map(|s| s.start_index..s.end_index))
            .chain(self.discarded.iter().map(|d| d.start_index..d.end_index))
            .collect();
        out.sort_by_key(|r| r.start);
        out
    }
}
