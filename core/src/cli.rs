use crate::types::SegmentReport;

/// Tekstrapport: ett blokk per intervall, deretter oppsummering av hoppede/forkastede faser.
pub fn format_interval_report(report: &SegmentReport, cooling_surface: f64) -> String {
    let mut out = String::new();

    if report.is_empty() {
        out.push_str(&format!(
            "No intervals found where Active Temp is constant for at least {} time units within the given tolerance.\n",
            report.min_duration
        ));
    } else {
        out.push_str("--- Mean Value Calculation ---\n");
        for r in &report.intervals {
            out.push_str(&format!("Active Temp value: {}\n", r.anchor));
            out.push_str(&format!("Interval start: {}\n", r.start_time));
            out.push_str(&format!("Interval end: {}\n", r.end_time));
            out.push_str(&format!("Mean Power value: {:.4}\n", r.mean_power));
            out.push_str(&format!("Mean Compound Temp: {:.4}\n", r.mean_compound));
            out.push_str(&format!("Mean Machine Temp: {:.4}\n", r.mean_machine));
            out.push_str(&format!("Alpha: {:.4}\n", r.alpha));
            out.push_str(&format!("Cooling surface: {}\n", cooling_surface));
            out.push_str("---\n");
        }
    }

    out.push_str(&format!(
        "Skipped: {}  Discarded (< min duration): {}\n",
        report.skipped.len(),
        report.discarded.len()
    ));
    for s in &report.skipped {
        out.push_str(&format!(
            "  skipped Active Temp {} [{} .. {}]: {}\n",
            s.anchor,
            s.start_time,
            s.end_time,
            s.message()
        ));
    }

    out
}

pub fn print_interval_report(report: &SegmentReport, cooling_surface: f64) {
    print!("{}", format_interval_report(report, cooling_surface));
}
