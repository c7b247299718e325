//! Viewer Configuration
//!
//! Settings the render layer owns but the core consumes: tournament mode,
//! partition visibility, and replay pacing. Every field has a default;
//! `from_env` overrides them from `MATCH_VIEWER_*` variables.

use std::env;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::world::registry::{Partition, VisibilityFilter};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MATCH_VIEWER_";

// =============================================================================
// VISIBILITY
// =============================================================================

/// Stock visibility predicate over the two partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Draw ground units
    pub show_surface: bool,
    /// Draw flying units
    pub show_airborne: bool,
}

impl Visibility {
    /// Both partitions.
    pub const ALL: Visibility = Visibility { show_surface: true, show_airborne: true };

    /// Ground units only.
    pub const SURFACE_ONLY: Visibility = Visibility { show_surface: true, show_airborne: false };

    /// Flying units only.
    pub const AIRBORNE_ONLY: Visibility = Visibility { show_surface: false, show_airborne: true };
}

impl Default for Visibility {
    fn default() -> Self {
        Self::ALL
    }
}

impl VisibilityFilter for Visibility {
    fn shows(&self, partition: Partition) -> bool {
        match partition {
            Partition::Surface => self.show_surface,
            Partition::Airborne => self.show_airborne,
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Flags the signal dispatcher consults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Suppress indicator strings (restricted display)
    pub tournament_mode: bool,
}

// =============================================================================
// VIEWER
// =============================================================================

/// Top-level viewer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Restricted display mode
    pub tournament_mode: bool,
    /// Which partitions the renderer walks
    pub visibility: Visibility,
    /// Render thread snapshot period in milliseconds
    pub snapshot_interval_ms: u64,
    /// Record a state-hash checkpoint every N rounds (0 disables)
    pub checkpoint_interval: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tournament_mode: false,
            visibility: Visibility::ALL,
            snapshot_interval_ms: 16, // ~60 fps
            checkpoint_interval: 50,
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by `MATCH_VIEWER_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = read("TOURNAMENT").and_then(|v| parse_flag("TOURNAMENT", &v)) {
            config.tournament_mode = v;
        }
        if let Some(v) = read("SHOW_SURFACE").and_then(|v| parse_flag("SHOW_SURFACE", &v)) {
            config.visibility.show_surface = v;
        }
        if let Some(v) = read("SHOW_AIRBORNE").and_then(|v| parse_flag("SHOW_AIRBORNE", &v)) {
            config.visibility.show_airborne = v;
        }
        if let Some(v) = read("SNAPSHOT_MS").and_then(|v| parse_number("SNAPSHOT_MS", &v)) {
            config.snapshot_interval_ms = v;
        }
        if let Some(v) = read("CHECKPOINT_INTERVAL").and_then(|v| parse_number("CHECKPOINT_INTERVAL", &v)) {
            config.checkpoint_interval = v;
        }
        config
    }

    /// Dispatcher flags derived from this configuration.
    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig { tournament_mode: self.tournament_mode }
    }
}

fn parse_flag(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            warn!(var = %name, value = %other, "ignoring unparseable flag");
            None
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = %name, value = %value, "ignoring unparseable number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::from_lookup(|_| None);
        assert_eq!(config, ViewerConfig::default());
        assert!(!config.dispatch().tournament_mode);
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::from_lookup(lookup_from(&[
            ("MATCH_VIEWER_TOURNAMENT", "true"),
            ("MATCH_VIEWER_SHOW_AIRBORNE", "0"),
            ("MATCH_VIEWER_SNAPSHOT_MS", "100"),
            ("MATCH_VIEWER_CHECKPOINT_INTERVAL", "5"),
        ]));
        assert!(config.tournament_mode);
        assert_eq!(config.visibility, Visibility::SURFACE_ONLY);
        assert_eq!(config.snapshot_interval_ms, 100);
        assert_eq!(config.checkpoint_interval, 5);
    }

    #[test]
    fn test_bad_values_ignored() {
        let config = ViewerConfig::from_lookup(lookup_from(&[
            ("MATCH_VIEWER_TOURNAMENT", "maybe"),
            ("MATCH_VIEWER_SNAPSHOT_MS", "-3"),
        ]));
        assert!(!config.tournament_mode);
        assert_eq!(config.snapshot_interval_ms, 16);
    }

    #[test]
    fn test_visibility_filter() {
        assert!(Visibility::ALL.shows(Partition::Airborne));
        assert!(!Visibility::SURFACE_ONLY.shows(Partition::Airborne));
        assert!(Visibility::AIRBORNE_ONLY.shows(Partition::Airborne));
    }
}
