//! Feature extraction: frame stepping, the spectral transform and the five
//! extractors behind a closed [`Feature`] enum.

pub mod amplitude;
pub mod framing;
pub mod panning;
pub mod pitch;
pub mod registry;
pub mod settings;
pub mod smoothing;
pub mod spectral;
pub mod spectrum;
pub mod transient;

pub use registry::{Colour, ExtractorDescriptor, ExtractorRegistry, Feature, FeatureExtractor};
pub use settings::AnalysisSettings;
