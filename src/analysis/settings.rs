use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Per-extraction configuration.
///
/// Only Amplitude and Panning follow `window_size_ms` / `hop_size_pct`; the
/// other extractors use fixed frame sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_window_size_ms")]
    pub window_size_ms: f32,
    #[serde(default = "default_hop_size_pct")]
    pub hop_size_pct: f32,
    #[serde(default = "default_normalize")]
    pub normalize_output: bool,
    /// Display range hint for editors; extraction does not clip to it.
    #[serde(default = "default_min_value")]
    pub min_value: f32,
    #[serde(default = "default_max_value")]
    pub max_value: f32,
    #[serde(default)]
    pub smooth_output: bool,
    #[serde(default = "default_smooth_time_ms")]
    pub smooth_time_ms: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            window_size_ms: default_window_size_ms(),
            hop_size_pct: default_hop_size_pct(),
            normalize_output: default_normalize(),
            min_value: default_min_value(),
            max_value: default_max_value(),
            smooth_output: false,
            smooth_time_ms: default_smooth_time_ms(),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.window_size_ms > 0.0 && self.window_size_ms.is_finite()) {
            return Err(SettingsError::WindowSize(self.window_size_ms));
        }
        if !(self.hop_size_pct > 0.0 && self.hop_size_pct <= 100.0) {
            return Err(SettingsError::HopSize(self.hop_size_pct));
        }
        if self.smooth_output && !(self.smooth_time_ms > 0.0 && self.smooth_time_ms.is_finite()) {
            return Err(SettingsError::SmoothTime(self.smooth_time_ms));
        }
        if !(self.min_value < self.max_value) {
            return Err(SettingsError::ValueRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}

fn default_window_size_ms() -> f32 { 15.0 }
fn default_hop_size_pct() -> f32 { 50.0 }
fn default_normalize() -> bool { true }
fn default_min_value() -> f32 { -1.0 }
fn default_max_value() -> f32 { 1.0 }
fn default_smooth_time_ms() -> f32 { 10.0 }
