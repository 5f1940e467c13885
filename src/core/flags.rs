use crate::domain::ports::SettingsStore;

pub const CO2_SCALE_ENABLED: &str = "CO2_SCALE_ENABLED";
pub const ECO_BADGE_ENABLED: &str = "ECO_BADGE_ENABLED";

/// Unset counts as enabled; only the literal `"true"` enables otherwise.
fn enabled_or_unset(store: &dyn SettingsStore, key: &str) -> bool {
    match store.get(key) {
        None => true,
        Some(value) => value == "true",
    }
}

pub fn co2_scale_enabled(store: &dyn SettingsStore) -> bool {
    enabled_or_unset(store, CO2_SCALE_ENABLED)
}

/// The badge lives on the CO2 scale, so it is off whenever the scale is.
pub fn eco_badge_enabled(store: &dyn SettingsStore) -> bool {
    co2_scale_enabled(store) && enabled_or_unset(store, ECO_BADGE_ENABLED)
}
