//! Operator defaults vault – reads/writes `~/.visor/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use visor_types::Mode;

/// Persisted boot-time defaults stored in `~/.visor/config.toml`.
///
/// These seed the shared runtime configuration at startup; the console can
/// change everything at runtime without touching the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootConfig {
    /// Processing mode selected at power-on.
    #[serde(default = "default_mode")]
    pub mode: Mode,

    /// Detector sensitivity at power-on.
    #[serde(default = "default_consecutive_threshold")]
    pub consecutive_threshold: i32,

    /// Minimum edge spacing at power-on.
    #[serde(default = "default_dithering_gap")]
    pub dithering_gap: i32,
}

fn default_mode() -> Mode {
    Mode::Color
}
fn default_consecutive_threshold() -> i32 {
    7
}
fn default_dithering_gap() -> i32 {
    3
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            consecutive_threshold: default_consecutive_threshold(),
            dithering_gap: default_dithering_gap(),
        }
    }
}

/// Return the path to `~/.visor/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".visor").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<BootConfig>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<BootConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: BootConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `VISOR_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `VISOR_MODE` | `mode` (`color`, `raw_threshold`, `simple_edge`, `lookback_edge`) |
/// | `VISOR_THRESHOLD` | `consecutive_threshold` |
/// | `VISOR_DITHERING_GAP` | `dithering_gap` |
pub fn apply_env_overrides(cfg: &mut BootConfig) {
    if let Ok(v) = std::env::var("VISOR_MODE")
        && let Some(mode) = parse_mode(&v)
    {
        cfg.mode = mode;
    }
    if let Ok(v) = std::env::var("VISOR_THRESHOLD")
        && let Ok(value) = v.parse::<i32>()
    {
        cfg.consecutive_threshold = value;
    }
    if let Ok(v) = std::env::var("VISOR_DITHERING_GAP")
        && let Ok(value) = v.parse::<i32>()
    {
        cfg.dithering_gap = value;
    }
}

fn parse_mode(raw: &str) -> Option<Mode> {
    match raw.trim().to_lowercase().as_str() {
        "color" => Some(Mode::Color),
        "raw_threshold" => Some(Mode::RawThreshold),
        "simple_edge" => Some(Mode::SimpleEdge),
        "lookback_edge" => Some(Mode::LookbackEdge),
        _ => None,
    }
}

/// Save the config to disk, creating `~/.visor/` if necessary.
pub fn save(cfg: &BootConfig) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &BootConfig, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = BootConfig::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.mode, Mode::Color);
        assert_eq!(loaded.consecutive_threshold, 7);
        assert_eq!(loaded.dithering_gap, 3);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "mode = \"simple_edge\"\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.mode, Mode::SimpleEdge);
        assert_eq!(loaded.consecutive_threshold, 7);
        assert_eq!(loaded.dithering_gap, 3);
    }

    #[test]
    fn config_path_points_to_visor_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".visor"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn parse_mode_accepts_snake_case_names() {
        assert_eq!(parse_mode("color"), Some(Mode::Color));
        assert_eq!(parse_mode("LOOKBACK_EDGE"), Some(Mode::LookbackEdge));
        assert_eq!(parse_mode("sobel"), None);
    }

    #[test]
    fn apply_env_overrides_changes_threshold() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("VISOR_THRESHOLD", "11") };
        let mut cfg = BootConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.consecutive_threshold, 11);
        unsafe { std::env::remove_var("VISOR_THRESHOLD") };
    }

    #[test]
    fn apply_env_overrides_mode_valid_then_invalid() {
        // Both cases in one test so parallel test threads never race on the
        // same variable.
        // SAFETY: no other test touches VISOR_MODE.
        unsafe { std::env::set_var("VISOR_MODE", "lookback_edge") };
        let mut cfg = BootConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.mode, Mode::LookbackEdge);

        unsafe { std::env::set_var("VISOR_MODE", "not-a-mode") };
        let mut cfg = BootConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.mode, Mode::Color);
        unsafe { std::env::remove_var("VISOR_MODE") };
    }
}
