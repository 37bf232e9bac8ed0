use super::framing::{frame_time, FrameStepper};
use super::registry::{Feature, FeatureExtractor};
use super::settings::AnalysisSettings;
use crate::audio::AudioSignal;
use crate::breakpoints::{BreakpointSeries, FeatureResult};

/// Windowed RMS and peak level of one channel.
pub struct AmplitudeExtractor;

impl FeatureExtractor for AmplitudeExtractor {
    fn feature(&self) -> Feature {
        Feature::Amplitude
    }

    fn extract(&self, signal: &AudioSignal, channel: usize, settings: &AnalysisSettings) -> FeatureResult {
        let samples = signal.channel(channel);
        let sr = signal.sample_rate();
        let stepper = FrameStepper::from_settings(settings, sr);

        let mut rms = BreakpointSeries::new();
        let mut peak = BreakpointSeries::new();

        for frame in stepper.frames(samples.len()) {
            let time = frame_time(frame.start, sr);
            let (r, p) = rms_and_peak(&samples[frame]);
            rms.push_ordered(time, r);
            peak.push_ordered(time, p);
        }

        if settings.normalize_output {
            rms.normalize_to_peak();
            peak.normalize_to_peak();
        }

        log::debug!(
            "Amplitude: {} frames (window={}, hop={}), max rms={:.4}, max peak={:.4}",
            rms.len(),
            stepper.window(),
            stepper.hop(),
            rms.max_value().unwrap_or(0.0),
            peak.max_value().unwrap_or(0.0)
        );

        FeatureResult::from_outputs(vec![rms, peak])
    }
}

/// RMS and absolute peak of a non-empty frame.
pub fn rms_and_peak(frame: &[f32]) -> (f64, f64) {
    if frame.is_empty() {
        return (0.0, 0.0);
    }
    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f64;
    for &s in frame {
        let s = s as f64;
        sum_sq += s * s;
        peak = peak.max(s.abs());
    }
    ((sum_sq / frame.len() as f64).sqrt(), peak)
}
