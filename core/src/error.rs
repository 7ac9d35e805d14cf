// core/src/error.rs
use thiserror::Error;

/// Ugyldige parametere eller brutte forutsetninger. Oppdages før skanningen starter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("input table is empty")]
    EmptyTable,

    #[error("tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),

    #[error("min_duration must be finite and >= 0, got {0}")]
    InvalidMinDuration(f64),

    #[error("cooling_surface must be finite and > 0, got {0}")]
    InvalidCoolingSurface(f64),

    #[error("fixed {which} temperature must be finite, got {value}")]
    InvalidFixedTemp { which: &'static str, value: f64 },

    #[error("sample {index} has a non-finite {field}")]
    NonFiniteSample { index: usize, field: &'static str },

    #[error("column '{column}' row {row} is not numeric")]
    NonNumericCell { column: String, row: usize },

    #[error("no {which} temperature input selected (column or fixed value)")]
    MissingTempInput { which: &'static str },

    #[error("parameter '{0}' selected more than once")]
    DuplicateParameter(String),
}

/// Feil på crate-nivå (JSON-inngang, tabell-mapping og tomt resultat).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("no intervals met the minimum duration of {min_duration}")]
    NoIntervals { min_duration: f64 },
}

impl CoreError {
    pub(crate) fn parse<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> Self {
        CoreError::Parse {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

/// Per-intervall-feil som ikke stopper skanningen; intervallet havner i `skipped`.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no valid power readings in interval")]
    MissingPower,

    #[error("no valid compound temperature readings in interval")]
    MissingCompoundTemp,

    #[error("no valid machine temperature readings in interval")]
    MissingMachineTemp,

    #[error("compound temperature equals machine temperature ({temp}), coefficient undefined")]
    EqualTemperatures { temp: f64 },

    #[error("coefficient is not finite")]
    NonFiniteCoefficient,
}
