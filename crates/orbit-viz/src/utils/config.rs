//! Configuration file management.
//!
//! Handles loading user preferences from `~/.orbit-viz.toml` and watching the
//! file so the `[settings]` table can be tuned while the visualization runs.

use anyhow::Context;
use orbit_viz_core::{AdapterConfig, AnalyzerConfig, Settings};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_SOURCE: &str = "default";
/// Wrapper default; the analyzer's own default is lighter
const DEFAULT_SMOOTHING: f32 = 0.3;

const CONFIG_TEMPLATE: &str = r#"# orbit-viz configuration file
# Changes to [settings] are picked up while the visualization runs.

# Audio source: capture device name ("default" = system default input)
# or a path to a .wav file
# source = "default"

# Analysis resolution and time smoothing (0.0 - 1.0)
# band_count = 32
# smoothing = 0.3

# Analyse media files without playing them
# muted = false

# Timeout in seconds when probing an audio device (default: 3)
# device_timeout_secs = 3

# Fallback animation when the input is silent
# stall_timeout_ms = 250        # Time without input before the fallback resumes
# fallback_interval_ms = 16     # ~60 Hz
# fallback_frequency = 15.0
# fallback_amplitude = 0.6

# =============================================================================
# Rendering
# =============================================================================

[settings]
# speed = 1.0
# rotation_speed = -1.0
# rotation_radius_from = 178.0
# rotation_radius_to = 280.0
# rotation_radius_speed = 1.5
# connection_distance = 0.0
# connection_distance_fract = 12.1
# line_width = 4.4
# size = 0.4
# kill_after = 190
# hue = 187.0
# saturation = 100.0
# brightness = 50.0
# background_saturation = 0.0
# background_brightness = 0.0
# background_alpha = 0.033
# random_size = 0.0
# push_every = 1
# scale_from = 680.0
# scale_to = 760.0
# scale_min = -0.4
# scale_max = 0.1
"#;

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Config {
    pub source: Option<String>,
    pub band_count: Option<usize>,
    pub smoothing: Option<f32>,
    pub muted: Option<bool>,
    pub device_timeout_secs: Option<u64>,

    // Fallback tuning
    pub stall_timeout_ms: Option<u64>,
    pub fallback_interval_ms: Option<u64>,
    pub fallback_frequency: Option<f32>,
    pub fallback_amplitude: Option<f32>,

    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".orbit-viz.toml"))
    }

    /// Loads the config at `path`, creating the template on first run.
    /// Any failure falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            match fs::write(path, CONFIG_TEMPLATE) {
                Ok(()) => log::info!("Created config template at {:?}", path),
                Err(e) => log::warn!("Could not create config template at {:?}: {}", path, e),
            }
        }

        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::parse(&text).with_context(|| format!("Failed to parse config {:?}", path))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Whether anything outside `[settings]` differs; those keys are read once.
    pub fn requires_restart(&self, other: &Config) -> bool {
        let mut left = self.clone();
        left.settings = other.settings.clone();
        left != *other
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(
            self.device_timeout_secs
                .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS),
        )
    }

    pub fn analyzer(&self) -> AnalyzerConfig {
        let defaults = AnalyzerConfig::default();
        AnalyzerConfig {
            band_count: self.band_count.unwrap_or(defaults.band_count),
            smoothing: self.smoothing.unwrap_or(DEFAULT_SMOOTHING),
            muted: self.muted.unwrap_or(defaults.muted),
        }
    }

    pub fn adapter(&self) -> AdapterConfig {
        let defaults = AdapterConfig::default();
        AdapterConfig {
            stall_timeout: self
                .stall_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.stall_timeout),
            fallback_interval: self
                .fallback_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fallback_interval),
            fallback_frequency: self
                .fallback_frequency
                .unwrap_or(defaults.fallback_frequency),
            fallback_amplitude: self
                .fallback_amplitude
                .unwrap_or(defaults.fallback_amplitude),
        }
    }
}

/// Polls the config file's modification time and re-reads it when it changes.
pub struct ConfigWatcher {
    path: Option<PathBuf>,
    last_modified: Option<SystemTime>,
    check_counter: u32,
}

impl ConfigWatcher {
    const CHECK_INTERVAL: u32 = 30; // Check every 30 frames (~0.5s at 60fps)

    pub fn new(path: Option<PathBuf>) -> Self {
        let last_modified = path.as_deref().and_then(modified_time);
        Self {
            path,
            last_modified,
            check_counter: 0,
        }
    }

    /// Call once per frame. Returns the new config when the file changed.
    pub fn check_reload(&mut self) -> Option<Config> {
        self.check_counter += 1;
        if self.check_counter < Self::CHECK_INTERVAL {
            return None;
        }
        self.check_counter = 0;

        let path = self.path.as_deref()?;
        let modified = modified_time(path)?;
        if self.last_modified.is_some_and(|last| modified <= last) {
            return None;
        }
        self.last_modified = Some(modified);

        self.reload()
    }

    /// Re-reads the file regardless of its modification time.
    pub fn reload(&mut self) -> Option<Config> {
        let path = self.path.as_deref()?;
        match Config::read(path) {
            Ok(config) => {
                log::info!("Reloaded settings from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Reload failed: {:#}", e);
                None
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.source(), "default");
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.analyzer().band_count, 32);
        assert_eq!(config.analyzer().smoothing, 0.3);
        assert!(!config.analyzer().muted);
        assert_eq!(config.adapter(), AdapterConfig::default());
        assert_eq!(config.device_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse(
            r#"
source = "track.wav"
band_count = 64
muted = true
stall_timeout_ms = 500
fallback_amplitude = 0.2

[settings]
hue = 300.0
push_every = 4
"#,
        )
        .unwrap();

        assert_eq!(config.source(), "track.wav");
        let analyzer = config.analyzer();
        assert_eq!(analyzer.band_count, 64);
        assert!(analyzer.muted);
        let adapter = config.adapter();
        assert_eq!(adapter.stall_timeout, Duration::from_millis(500));
        assert_eq!(adapter.fallback_amplitude, 0.2);
        assert_eq!(adapter.fallback_frequency, 15.0);
        assert_eq!(config.settings.hue, 300.0);
        assert_eq!(config.settings.push_every, 4);
        assert_eq!(config.settings.kill_after, 190);
    }

    #[test]
    fn test_watcher_reloads_changed_file() {
        let path = std::env::temp_dir().join(format!(
            "orbit-viz-watch-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[settings]\nhue = 10.0\n").unwrap();

        let mut watcher = ConfigWatcher::new(Some(path.clone()));
        let forced = watcher.reload().unwrap();
        assert_eq!(forced.settings.hue, 10.0);

        // Unchanged file: no reload on the polling frame
        for _ in 0..ConfigWatcher::CHECK_INTERVAL {
            assert!(watcher.check_reload().is_none());
        }

        fs::write(&path, "[settings]\nhue = 42.0\n").unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        // Only the polling frame looks at the file
        for _ in 1..ConfigWatcher::CHECK_INTERVAL {
            assert!(watcher.check_reload().is_none());
        }
        let reloaded = watcher.check_reload().unwrap();
        assert_eq!(reloaded.settings.hue, 42.0);

        // Same mtime again: nothing new
        for _ in 0..ConfigWatcher::CHECK_INTERVAL {
            assert!(watcher.check_reload().is_none());
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_restart_only_keys() {
        let base = Config::parse("band_count = 32\n[settings]\nhue = 1.0\n").unwrap();
        let retuned = Config::parse("band_count = 32\n[settings]\nhue = 2.0\n").unwrap();
        let rebanded = Config::parse("band_count = 64\n[settings]\nhue = 1.0\n").unwrap();

        assert!(!retuned.requires_restart(&base));
        assert!(rebanded.requires_restart(&base));
    }

    #[test]
    fn test_missing_path_loads_defaults() {
        let mut watcher = ConfigWatcher::new(None);
        assert!(watcher.reload().is_none());
        let config = Config::load(None);
        assert_eq!(config.settings, Settings::default());
    }
}
