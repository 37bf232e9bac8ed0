use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::amplitude::AmplitudeExtractor;
use super::panning::PanningExtractor;
use super::pitch::PitchExtractor;
use super::settings::AnalysisSettings;
use super::smoothing;
use super::spectral::SpectralExtractor;
use super::transient::TransientExtractor;
use crate::audio::AudioSignal;
use crate::breakpoints::FeatureResult;

const AMPLITUDE_OUTPUTS: &[&str] = &["RMS", "Peak"];
const PANNING_OUTPUTS: &[&str] = &["Pan Position", "Stereo Width", "Balance"];
const SPECTRAL_OUTPUTS: &[&str] = &["Centroid", "Flux", "Flatness", "Rolloff"];
const PITCH_OUTPUTS: &[&str] = &["Frequency", "Confidence"];
const TRANSIENT_OUTPUTS: &[&str] = &["Onset Strength"];

/// The closed set of features this crate knows how to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Amplitude,
    Panning,
    Spectral,
    Pitch,
    Transients,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Amplitude,
        Feature::Panning,
        Feature::Spectral,
        Feature::Pitch,
        Feature::Transients,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            Feature::Amplitude => "Amplitude",
            Feature::Panning => "Panning",
            Feature::Spectral => "Spectral",
            Feature::Pitch => "Pitch",
            Feature::Transients => "Transients",
        }
    }

    /// Case-insensitive lookup; `None` means the feature is unsupported.
    pub fn from_name(name: &str) -> Option<Feature> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Position in [`Feature::ALL`], used to index per-feature tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> ExtractorDescriptor {
        let (colour, output_names, supports_multichannel) = match self {
            Feature::Amplitude => (Colour::GREEN, AMPLITUDE_OUTPUTS, true),
            Feature::Panning => (Colour::BLUE, PANNING_OUTPUTS, true),
            Feature::Spectral => (Colour::PURPLE, SPECTRAL_OUTPUTS, false),
            Feature::Pitch => (Colour::ORANGE, PITCH_OUTPUTS, false),
            Feature::Transients => (Colour::RED, TRANSIENT_OUTPUTS, false),
        };
        ExtractorDescriptor {
            name: self.name(),
            colour,
            output_count: output_names.len(),
            output_names,
            supports_multichannel,
        }
    }

    pub fn output_count(self) -> usize {
        self.descriptor().output_count
    }

    pub fn output_name(self, index: usize) -> Option<&'static str> {
        self.descriptor().output_names.get(index).copied()
    }

    pub fn colour(self) -> Colour {
        self.descriptor().colour
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::from_name(s).ok_or_else(|| {
            let known: Vec<_> = Feature::ALL.iter().map(|f| f.name()).collect();
            format!("unknown feature '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}

/// Display colour of a feature's curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const GREEN: Colour = Colour::rgb(0x00, 0x80, 0x00);
    pub const BLUE: Colour = Colour::rgb(0x00, 0x00, 0xff);
    pub const PURPLE: Colour = Colour::rgb(0x80, 0x00, 0x80);
    pub const ORANGE: Colour = Colour::rgb(0xff, 0xa5, 0x00);
    pub const RED: Colour = Colour::rgb(0xff, 0x00, 0x00);
    /// Fallback for names that do not map to a feature.
    pub const WHITE: Colour = Colour::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractorDescriptor {
    pub name: &'static str,
    pub colour: Colour,
    pub output_count: usize,
    pub output_names: &'static [&'static str],
    pub supports_multichannel: bool,
}

/// An algorithm turning a signal into one series per declared output.
pub trait FeatureExtractor: Send + Sync {
    fn feature(&self) -> Feature;

    /// Runs over the whole signal. `channel` is already clamped into range.
    ///
    /// The returned result always has `feature().output_count()` outputs.
    fn extract(&self, signal: &AudioSignal, channel: usize, settings: &AnalysisSettings) -> FeatureResult;

    fn descriptor(&self) -> ExtractorDescriptor {
        self.feature().descriptor()
    }
}

/// Enum-indexed table of extractor instances.
pub struct ExtractorRegistry {
    extractors: [Box<dyn FeatureExtractor>; Feature::COUNT],
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: [
                Box::new(AmplitudeExtractor) as Box<dyn FeatureExtractor>,
                Box::new(PanningExtractor),
                Box::new(SpectralExtractor::default()),
                Box::new(PitchExtractor),
                Box::new(TransientExtractor::default()),
            ],
        }
    }

    pub fn get(&self, feature: Feature) -> &dyn FeatureExtractor {
        self.extractors[feature.index()].as_ref()
    }

    /// Looks an extractor up by name; unknown names give `None`.
    pub fn by_name(&self, name: &str) -> Option<&dyn FeatureExtractor> {
        Feature::from_name(name).map(|f| self.get(f))
    }

    pub fn available(&self) -> impl Iterator<Item = Feature> + '_ {
        self.extractors.iter().map(|e| e.feature())
    }

    /// Colour for a feature name, white when the name is unknown.
    pub fn colour_for(&self, name: &str) -> Colour {
        Feature::from_name(name).map_or(Colour::WHITE, Feature::colour)
    }

    /// Extracts `feature` and applies output smoothing when requested.
    pub fn run(
        &self,
        feature: Feature,
        signal: &AudioSignal,
        channel: usize,
        settings: &AnalysisSettings,
    ) -> FeatureResult {
        let channel = signal.clamp_channel(channel);
        let mut result = self.get(feature).extract(signal, channel, settings);
        debug_assert_eq!(result.num_outputs(), feature.output_count());

        if settings.smooth_output {
            for series in result.outputs_mut() {
                smoothing::smooth_series(series, settings.smooth_time_ms as f64 / 1000.0);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_feature_index() {
        let registry = ExtractorRegistry::new();
        for feature in Feature::ALL {
            assert_eq!(registry.get(feature).feature(), feature);
        }
        assert_eq!(registry.available().collect::<Vec<_>>(), Feature::ALL.to_vec());
    }

    #[test]
    fn name_lookup() {
        assert_eq!(Feature::from_name("pitch"), Some(Feature::Pitch));
        assert_eq!(Feature::from_name(" Transients "), Some(Feature::Transients));
        assert_eq!(Feature::from_name("Loudness"), None);
        assert!("Loudness".parse::<Feature>().is_err());

        let registry = ExtractorRegistry::new();
        assert!(registry.by_name("Loudness").is_none());
        assert_eq!(registry.colour_for("Loudness"), Colour::WHITE);
        assert_eq!(registry.colour_for("Amplitude"), Colour::GREEN);
    }

    #[test]
    fn descriptors() {
        let d = Feature::Panning.descriptor();
        assert_eq!(d.output_count, 3);
        assert_eq!(d.output_names[1], "Stereo Width");
        assert!(d.supports_multichannel);
        assert!(!Feature::Spectral.descriptor().supports_multichannel);
        assert_eq!(Feature::Transients.output_name(0), Some("Onset Strength"));
        assert_eq!(Feature::Transients.output_name(1), None);
        assert_eq!(Colour::ORANGE.to_string(), "#ffa500");
    }

    #[test]
    fn every_extractor_honours_output_count_on_empty_signal() {
        let registry = ExtractorRegistry::new();
        let signal = AudioSignal::stereo(Vec::new(), Vec::new(), 44100.0);
        let settings = AnalysisSettings::default();
        for feature in Feature::ALL {
            let result = registry.run(feature, &signal, 0, &settings);
            assert_eq!(result.num_outputs(), feature.output_count(), "{feature}");
            assert_eq!(result.total_points(), 0, "{feature}");
        }
    }

    #[test]
    fn descriptor_serialises_to_json() {
        let json = serde_json::to_value(Feature::Pitch.descriptor()).unwrap();
        assert_eq!(json["name"], "Pitch");
        assert_eq!(json["output_count"], 2);
        assert_eq!(json["output_names"][1], "Confidence");
    }
}
