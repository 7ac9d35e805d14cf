// core/src/table.rs
//! Grensesnittet mot innlastingen: en tabell med navngitte kolonner mappes
//! én gang til typed `Sample`-rader før segmentereren kjører.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError};
use crate::types::{Sample, SegmentSettings, TempInput, TempSource};

/// Rå celle fra regneark/rapport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Tall eller tekst som kan tolkes som tall; alt annet blir None.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) if x.is_finite() => Some(*x),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
    }
}

/// Gjør kolonnenavn unike: "T", "T" → "T", "T_1".
pub fn dedupe_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());
    for h in headers {
        let name = h.as_ref().to_string();
        match seen.get_mut(&name) {
            Some(count) => {
                *count += 1;
                out.push(format!("{}_{}", name, count));
            }
            None => {
                seen.insert(name.clone(), 0);
                out.push(name);
            }
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    dropped_rows: usize,
}

impl Table {
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Cell>>) -> Self {
        let headers = dedupe_headers(headers);
        let width = headers.len();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(rows.len()); width];
        let mut dropped_rows = 0usize;

        for row in rows {
            if row.len() != width {
                dropped_rows += 1;
                continue;
            }
            for (col, cell) in columns.iter_mut().zip(row.iter()) {
                col.push(cell.as_f64());
            }
        }
        if dropped_rows > 0 {
            warn!("dropped {} rows with a column count different from the header ({})", dropped_rows, width);
        }

        Self { headers, columns, dropped_rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rader forkastet fordi antall celler ikke stemte med headeren.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Dropp de første `n` radene (f.eks. enhetsraden under headeren).
    pub fn skip_leading_rows(mut self, n: usize) -> Self {
        for col in &mut self.columns {
            let k = n.min(col.len());
            col.drain(..k);
        }
        self
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>], CoreError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))
    }
}

/// Hvilke kolonner som betyr hva. Løses opp én gang i `map_table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub time: String,
    pub power: String,
    pub reference: String,
    pub compound: TempInput,
    pub machine: TempInput,
}

/// Mapping slik den kommer fra dashbordet. Temperatur-input som utelates
/// hentes fra lagrede innstillinger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub time: String,
    pub power: String,
    pub reference: String,
    #[serde(default)]
    pub compound: Option<TempInput>,
    #[serde(default)]
    pub machine: Option<TempInput>,
}

impl MappingRequest {
    pub fn complete(self, settings: &SegmentSettings) -> Result<ColumnMapping, ConfigError> {
        let compound = self
            .compound
            .or_else(|| settings.compound.clone())
            .ok_or(ConfigError::MissingTempInput { which: "compound" })?;
        let machine = self
            .machine
            .or_else(|| settings.machine.clone())
            .ok_or(ConfigError::MissingTempInput { which: "machine" })?;
        Ok(ColumnMapping {
            time: self.time,
            power: self.power,
            reference: self.reference,
            compound,
            machine,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MappedTable {
    pub samples: Vec<Sample>,
    pub compound: TempSource,
    pub machine: TempSource,
}

fn required(column: &str, values: &[Option<f64>]) -> Result<Vec<f64>, ConfigError> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| ConfigError::NonNumericCell {
                column: column.to_string(),
                row,
            })
        })
        .collect()
}

fn resolve_input<'t>(
    table: &'t Table,
    input: &TempInput,
) -> Result<(TempSource, Option<&'t [Option<f64>]>), CoreError> {
    match input {
        TempInput::Column(name) => Ok((TempSource::Measured, Some(table.column(name)?))),
        TempInput::Fixed(v) => Ok((TempSource::Fixed(*v), None)),
    }
}

pub fn map_table(table: &Table, mapping: &ColumnMapping) -> Result<MappedTable, CoreError> {
    if table.is_empty() {
        return Err(ConfigError::EmptyTable.into());
    }

    let time = required(&mapping.time, table.column(&mapping.time)?)?;
    let reference = required(&mapping.reference, table.column(&mapping.reference)?)?;
    let power = table.column(&mapping.power)?;
    let (compound, compound_col) = resolve_input(table, &mapping.compound)?;
    let (machine, machine_col) = resolve_input(table, &mapping.machine)?;

    let samples = (0..table.len())
        .map(|i| Sample {
            time: time[i],
            reference: reference[i],
            power: power[i],
            compound_temp: compound_col.and_then(|c| c[i]),
            machine_temp: machine_col.and_then(|c| c[i]),
        })
        .collect();

    Ok(MappedTable { samples, compound, machine })
}
