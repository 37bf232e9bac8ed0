use thiserror::Error;

use crate::analysis::Feature;

/// Rejected analysis settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("window size must be > 0 ms, got {0}")]
    WindowSize(f32),

    #[error("hop size must be in (0, 100] percent, got {0}")]
    HopSize(f32),

    #[error("smoothing time must be > 0 ms, got {0}")]
    SmoothTime(f32),

    #[error("value range is empty: min {min} >= max {max}")]
    ValueRange { min: f32, max: f32 },
}

/// A breakpoint edit or export that names something that does not exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("feature '{0}' has not been extracted")]
    FeatureNotExtracted(Feature),

    #[error("feature '{feature}' has no output {index} (it has {count})")]
    OutputOutOfRange {
        feature: Feature,
        index: usize,
        count: usize,
    },

    #[error("output {output} of '{feature}' has no point {index} (it has {count})")]
    PointOutOfRange {
        feature: Feature,
        output: usize,
        index: usize,
        count: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no audio signal is loaded")]
    NoSignal,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
