//! Offline audio feature extraction into editable breakpoint curves.
//!
//! A decoded [`AudioSignal`] is run through one of the five extractors in
//! [`analysis`], producing a [`FeatureResult`] of time/value series that a
//! [`Session`] stores, edits and writes out as plain text.

pub mod analysis;
pub mod audio;
pub mod breakpoints;
pub mod config;
pub mod error;
pub mod session;

pub use analysis::{AnalysisSettings, ExtractorDescriptor, ExtractorRegistry, Feature};
pub use audio::AudioSignal;
pub use breakpoints::{Breakpoint, BreakpointSeries, FeatureResult};
pub use error::{SessionError, SettingsError, StoreError};
pub use session::{AnalysisState, Session};
