use super::amplitude::rms_and_peak;
use super::framing::{frame_time, FrameStepper};
use super::registry::{Feature, FeatureExtractor};
use super::settings::AnalysisSettings;
use crate::audio::AudioSignal;
use crate::breakpoints::{BreakpointSeries, FeatureResult};

const WINDOW: usize = 1024;
const HOP: usize = 512;

/// Onset strength as the half-wave rectified rise in frame RMS.
pub struct TransientExtractor {
    stepper: FrameStepper,
}

impl Default for TransientExtractor {
    fn default() -> Self {
        Self {
            stepper: FrameStepper::fixed(WINDOW, HOP),
        }
    }
}

impl FeatureExtractor for TransientExtractor {
    fn feature(&self) -> Feature {
        Feature::Transients
    }

    fn extract(&self, signal: &AudioSignal, channel: usize, _settings: &AnalysisSettings) -> FeatureResult {
        let samples = signal.channel(channel);
        let sr = signal.sample_rate();

        let mut onsets = BreakpointSeries::new();
        let mut previous_energy = 0.0f64;

        for frame in self.stepper.full_frames(samples.len()) {
            let time = frame_time(frame.start, sr);
            let (energy, _) = rms_and_peak(&samples[frame]);
            onsets.push_ordered(time, (energy - previous_energy).max(0.0));
            previous_energy = energy;
        }

        log::debug!("Transients: {} frames", onsets.len());

        FeatureResult::from_outputs(vec![onsets])
    }
}
