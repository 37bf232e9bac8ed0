use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisSettings, Feature};

pub const LOCAL_CONFIG: &str = "deconstruct.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub channel: usize,
    /// Feature names to extract; empty means all of them.
    #[serde(default)]
    pub features: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            channel: 0,
            features: Vec::new(),
        }
    }
}

impl OutputConfig {
    /// Resolves the configured names, skipping (and reporting) unknown ones.
    pub fn resolved_features(&self) -> Vec<Feature> {
        self.features
            .iter()
            .filter_map(|name| {
                let feature = Feature::from_name(name);
                if feature.is_none() {
                    log::warn!("Ignoring unsupported feature '{}' in config", name);
                }
                feature
            })
            .collect()
    }
}

fn default_directory() -> PathBuf { PathBuf::from(".") }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// Explicit path, else `./deconstruct.toml`, else the user config directory.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("deconstruct").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("deconstruct").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis, AnalysisSettings::default());
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert!(config.output.features.is_empty());
    }

    #[test]
    fn full_file() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            window_size_ms = 25.0
            hop_size_pct = 25.0
            normalize_output = false
            smooth_output = true
            smooth_time_ms = 40.0

            [output]
            directory = "curves"
            channel = 1
            features = ["Amplitude", "pitch", "Loudness"]
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.window_size_ms, 25.0);
        assert!(!config.analysis.normalize_output);
        assert_eq!(config.analysis.min_value, -1.0);
        assert_eq!(config.output.channel, 1);
        assert_eq!(config.output.resolved_features(), vec![Feature::Amplitude, Feature::Pitch]);
    }

    #[test]
    fn load_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[analysis]\nwindow_size_ms = \"wide\"\n").unwrap();
        assert!(load_config(&path).is_err());
        assert!(load_config(&dir.path().join("none.toml")).is_err());

        let explicit = dir.path().join("x.toml");
        assert_eq!(find_config(Some(&explicit)), Some(explicit.clone()));
    }
}
