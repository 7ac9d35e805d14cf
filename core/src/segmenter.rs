// core/src/segmenter.rs
use log::{debug, info, warn};

use crate::error::{ConfigError, SkipReason};
use crate::types::{
    DiscardedPhase, IntervalRecord, Sample, SegmentConfig, SegmentReport, SkippedInterval,
    TempSource,
};

/// kW → W, slik at alpha havner i W/(m²·K).
pub const POWER_SCALE: f64 = 1000.0;

/// alpha = P·1000 / (A · (Tc − Tm))
#[inline]
pub fn coefficient(mean_power: f64, mean_compound: f64, mean_machine: f64, cooling_surface: f64) -> f64 {
    (mean_power * POWER_SCALE) / (cooling_surface * (mean_compound - mean_machine))
}

/// Snitt over gyldige verdier; None når alt mangler.
fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut cnt = 0usize;
    for v in values.into_iter().flatten() {
        if v.is_finite() {
            sum += v;
            cnt += 1;
        }
    }
    if cnt == 0 { None } else { Some(sum / cnt as f64) }
}

fn resolve_temp(
    source: TempSource,
    slice: &[Sample],
    pick: fn(&Sample) -> Option<f64>,
) -> Option<f64> {
    match source {
        TempSource::Fixed(v) => Some(v),
        TempSource::Measured => mean_of(slice.iter().map(pick)),
    }
}

fn check_samples(samples: &[Sample]) -> Result<(), ConfigError> {
    if samples.is_empty() {
        return Err(ConfigError::EmptyTable);
    }
    for (index, s) in samples.iter().enumerate() {
        if !s.time.is_finite() {
            return Err(ConfigError::NonFiniteSample { index, field: "time" });
        }
        if !s.reference.is_finite() {
            return Err(ConfigError::NonFiniteSample { index, field: "reference" });
        }
    }
    Ok(())
}

/// Finn maksimale faser der referansen holder seg innenfor `tolerance` fra
/// fasens første verdi, og beregn alpha for hver fase som varer minst
/// `min_duration`.
///
/// Input sorteres stabilt på tid før skanningen. Indeksene i resultatet
/// peker inn i den sorterte rekkefølgen. Funksjonen har ingen sideeffekter
/// utover logging.
pub fn segment(samples: &[Sample], config: &SegmentConfig) -> Result<SegmentReport, ConfigError> {
    config.validate()?;
    check_samples(samples)?;

    let mut sorted = samples.to_vec();
    // Vec::sort_by er stabil → like tider beholder opprinnelig rekkefølge
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let n = sorted.len();
    let mut report = SegmentReport {
        min_duration: config.min_duration,
        ..SegmentReport::default()
    };

    let mut start = 0usize;
    while start < n {
        let anchor = sorted[start].reference;

        let mut end = start;
        while end < n && (sorted[end].reference - anchor).abs() <= config.tolerance {
            end += 1;
        }

        let start_time = sorted[start].time;
        let end_time = sorted[end - 1].time;
        let duration = end_time - start_time;

        if duration >= config.min_duration {
            let slice = &sorted[start..end];
            match evaluate(slice, config) {
                Ok((power_values, mean_power, mean_compound, mean_machine, alpha)) => {
                    debug!(
                        "phase anchor={} [{}, {}) t={}..{} alpha={:.4}",
                        anchor, start, end, start_time, end_time, alpha
                    );
                    report.intervals.push(IntervalRecord {
                        anchor,
                        start_time,
                        end_time,
                        start_index: start,
                        end_index: end,
                        power_values,
                        mean_power,
                        mean_compound,
                        mean_machine,
                        alpha,
                    });
                }
                Err(reason) => {
                    warn!("skipping phase anchor={} t={}..{}: {}", anchor, start_time, end_time, reason);
                    report.skipped.push(SkippedInterval {
                        anchor,
                        start_time,
                        end_time,
                        start_index: start,
                        end_index: end,
                        reason,
                    });
                }
            }
        } else {
            report.discarded.push(DiscardedPhase {
                anchor,
                start_time,
                end_time,
                start_index: start,
                end_index: end,
                duration,
            });
        }

        start = end;
    }

    info!(
        "segmented {} samples: {} intervals, {} skipped, {} discarded",
        n,
        report.intervals.len(),
        report.skipped.len(),
        report.discarded.len()
    );
    Ok(report)
}

type Evaluated = (Vec<f64>, f64, f64, f64, f64);

fn evaluate(slice: &[Sample], config: &SegmentConfig) -> Result<Evaluated, SkipReason> {
    let power_values: Vec<f64> = slice
        .iter()
        .filter_map(|s| s.power)
        .filter(|p| p.is_finite())
        .collect();
    if power_values.is_empty() {
        return Err(SkipReason::MissingPower);
    }
    let mean_power = power_values.iter().sum::<f64>() / power_values.len() as f64;

    let mean_compound = resolve_temp(config.compound, slice, |s| s.compound_temp)
        .ok_or(SkipReason::MissingCompoundTemp)?;
    let mean_machine = resolve_temp(config.machine, slice, |s| s.machine_temp)
        .ok_or(SkipReason::MissingMachineTemp)?;

    if mean_compound == mean_machine {
        return Err(SkipReason::EqualTemperatures { temp: mean_compound });
    }

    let alpha = coefficient(mean_power, mean_compound, mean_machine, config.cooling_surface);
    if !alpha.is_finite() {
        return Err(SkipReason::NonFiniteCoefficient);
    }

    Ok((power_values, mean_power, mean_compound, mean_machine, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_ignores_missing_and_non_finite() {
        let m = mean_of([Some(1.0), None, Some(f64::NAN), Some(3.0)]);
        assert_eq!(m, Some(2.0));
        assert_eq!(mean_of([None, None]), None);
    }

    #[test]
    fn coefficient_uses_power_scale() {
        // 2 kW over 4 m² og 50 K → 10 W/(m²·K)
        let a = coefficient(2.0, 80.0, 30.0, 4.0);
        assert!((a - 10.0).abs() < 1e-12);
    }

    #[test]
    fn single_sample_phase_has_zero_duration() {
        let samples = vec![Sample::new(0.0, 50.0, Some(1.0))];
        let cfg = SegmentConfig {
            min_duration: 0.0,
            compound: TempSource::Fixed(60.0),
            machine: TempSource::Fixed(20.0),
            ..SegmentConfig::new(0.0, 1.0)
        };
        let report = segment(&samples, &cfg).unwrap();
        assert_eq!(report.intervals.len(), 1);
        assert_eq!(report.intervals[0].duration(), 0.0);
    }
}
