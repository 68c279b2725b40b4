//! Threshold persistence over the settings store.
//!
//! The whole configuration is one JSON record under [`THRESHOLDS_KEY`].
//! A missing record means defaults. A record that no longer parses also means
//! defaults; it is logged and left in place until the next save overwrites it.

use tracing::warn;

use mattrack_core::{SettingsStore, StoreError, ThresholdConfig};

/// Settings key holding the threshold JSON.
pub const THRESHOLDS_KEY: &str = "promotionThresholds";

/// Load the persisted thresholds, falling back to defaults.
///
/// Only storage failures are errors; absence and corruption are not.
pub fn load_thresholds<S>(store: &S) -> Result<ThresholdConfig, StoreError>
where
    S: SettingsStore + ?Sized,
{
    let Some(raw) = store.read_setting(THRESHOLDS_KEY)? else {
        return Ok(ThresholdConfig::default());
    };
    match ThresholdConfig::from_json(&raw) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(key = THRESHOLDS_KEY, error = %e, "stored thresholds are unreadable, using defaults");
            Ok(ThresholdConfig::default())
        }
    }
}

/// Replace the persisted thresholds wholesale. Values are not validated.
pub fn save_thresholds<S>(store: &S, config: &ThresholdConfig) -> Result<(), StoreError>
where
    S: SettingsStore + ?Sized,
{
    let json = config
        .to_json()
        .map_err(|e| StoreError::Backend(format!("failed to encode thresholds: {e}")))?;
    store.write_setting(THRESHOLDS_KEY, &json)
}
