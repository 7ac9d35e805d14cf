// core/src/envelope.rs
use std::collections::{BTreeMap, HashSet};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CyclePoint {
    #[serde(default)]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
}

/// Én syklus (ett ark i arbeidsboken).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSeries {
    pub sheet: String,
    pub points: Vec<CyclePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub cycle_time: f64,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,   // utvalgs-std (n−1), None for én verdi
    pub upper: Option<f64>, // mean + std
    pub lower: Option<f64>, // mean − std
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedParameter {
    pub name: String,
    pub range: f64,
    pub axis: Axis,
}

/// Én rad med flere valgte parametere (samme rekkefølge som navnelisten).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterRow {
    #[serde(default)]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSelection {
    pub names: Vec<String>,
    pub rows: Vec<ParameterRow>,
}

fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        (xs[n / 2 - 1] + xs[n / 2]) / 2.0
    }
}

fn sample_std(xs: &[f64], mean: f64) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Behold punkter med step ≥ step_value + 1 og nummerer syklustid på nytt
/// (0, 1, 2, …) per ark. Punkter med manglende felt droppes.
pub fn filter_after_step(series: &[CycleSeries], step_value: f64) -> Vec<CycleSeries> {
    series
        .iter()
        .map(|s| {
            let points = s
                .points
                .iter()
                .filter(|p| p.cycle_time.is_some() && p.value.is_some())
                .filter(|p| matches!(p.step, Some(st) if st >= step_value + 1.0))
                .enumerate()
                .map(|(i, p)| CyclePoint {
                    cycle_time: Some(i as f64),
                    ..*p
                })
                .collect();
            CycleSeries {
                sheet: s.sheet.clone(),
                points,
            }
        })
        .collect()
}

/// Snitt, median og ±1 std per syklustid over alle ark.
pub fn envelope(series: &[CycleSeries]) -> Vec<EnvelopePoint> {
    let mut groups: BTreeMap<OrderedFloat<f64>, Vec<f64>> = BTreeMap::new();
    for s in series {
        for p in &s.points {
            if let (Some(t), Some(v)) = (p.cycle_time, p.value) {
                if t.is_finite() && v.is_finite() {
                    groups.entry(OrderedFloat(t)).or_default().push(v);
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|(t, values)| {
            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            let std = sample_std(&values, mean);
            EnvelopePoint {
                cycle_time: t.into_inner(),
                count,
                mean,
                median: median(values),
                std,
                upper: std.map(|s| mean + s),
                lower: std.map(|s| mean - s),
            }
        })
        .collect()
}

fn check_unique<'a>(names: impl IntoIterator<Item = &'a String>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::DuplicateParameter(name.clone()));
        }
    }
    Ok(())
}

/// Snittprofiler for flere parametere over de radene der alle valgte
/// parametere og syklustiden har gyldige verdier. Rader med feil antall
/// verdier droppes også, slik at profilene deler de samme radene.
pub fn joint_profiles(selection: &ParameterSelection) -> Result<Vec<(String, Vec<EnvelopePoint>)>, ConfigError> {
    check_unique(&selection.names)?;

    let width = selection.names.len();
    let complete: Vec<(f64, Vec<f64>)> = selection
        .rows
        .iter()
        .filter(|r| r.values.len() == width)
        .filter_map(|r| {
            let t = r.cycle_time.filter(|t| t.is_finite())?;
            let values = r
                .values
                .iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect::<Option<Vec<f64>>>()?;
            Some((t, values))
        })
        .collect();

    Ok(selection
        .names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let series = CycleSeries {
                sheet: name.clone(),
                points: complete
                    .iter()
                    .map(|(t, values)| CyclePoint {
                        cycle_time: Some(*t),
                        value: Some(values[col]),
                        step: None,
                    })
                    .collect(),
            };
            (name.clone(), envelope(std::slice::from_ref(&series)))
        })
        .collect())
}

/// Ranger parametere etter spennvidde i snittkurven; størst på primæraksen.
pub fn rank_parameters(profiles: &[(String, Vec<EnvelopePoint>)]) -> Result<Vec<RankedParameter>, ConfigError> {
    check_unique(profiles.iter().map(|(name, _)| name))?;

    let mut ranked: Vec<(String, f64)> = profiles
        .iter()
        .map(|(name, points)| {
            let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.mean), hi.max(p.mean))
            });
            let range = if points.is_empty() { 0.0 } else { hi - lo };
            (name.clone(), range)
        })
        .collect();
    // stabil sortering: like spenn beholder valgt rekkefølge
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(ranked
        .into_iter()
        .enumerate()
        .map(|(i, (name, range))| RankedParameter {
            name,
            range,
            axis: if i == 0 { Axis::Primary } else { Axis::Secondary },
        })
        .collect())
}
