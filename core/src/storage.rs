use std::path::Path;

use anyhow::Context;
use log::{info, warn};

use crate::types::SegmentSettings;

/// Leser innstillinger fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-innstillinger.
pub fn load_settings<P: AsRef<Path>>(path: P) -> anyhow::Result<SegmentSettings> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let mut de = serde_json::Deserializer::from_str(&contents);
        let settings: SegmentSettings = serde_path_to_error::deserialize(&mut de)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        info!(
            "settings loaded from {} (tolerance={}, min_duration={}, cooling_surface={})",
            path.display(),
            settings.tolerance,
            settings.min_duration,
            settings.cooling_surface
        );
        Ok(settings)
    } else {
        warn!("no settings at {}, using defaults", path.display());
        Ok(SegmentSettings::default())
    }
}

/// Lagrer innstillinger som JSON (pretty-print) og stempler `saved_at`.
pub fn save_settings<P: AsRef<Path>>(settings: &SegmentSettings, path: P) -> anyhow::Result<SegmentSettings> {
    let path = path.as_ref();
    let mut stamped = settings.clone();
    stamped.saved_at = Some(chrono::Utc::now());

    let json = serde_json::to_string_pretty(&stamped)?;
    std::fs::write(path, json).with_context(|| format!("writing settings {}", path.display()))?;
    info!("settings saved to {}", path.display());
    Ok(stamped)
}
