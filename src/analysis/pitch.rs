use super::framing::{frame_time, FrameStepper};
use super::registry::{Feature, FeatureExtractor};
use super::settings::AnalysisSettings;
use crate::audio::AudioSignal;
use crate::breakpoints::{BreakpointSeries, FeatureResult};

const WINDOW_SECONDS: f64 = 0.05;
const MAX_FREQUENCY_HZ: f64 = 1000.0;
const MIN_FREQUENCY_HZ: f64 = 50.0;

/// Autocorrelation pitch tracker over fixed 50 ms frames, 50% hop.
pub struct PitchExtractor;

/// Detected fundamental and how periodic the frame is (0..=1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchEstimate {
    pub frequency: f64,
    pub confidence: f64,
}

impl PitchEstimate {
    const NONE: PitchEstimate = PitchEstimate { frequency: 0.0, confidence: 0.0 };
}

impl FeatureExtractor for PitchExtractor {
    fn feature(&self) -> Feature {
        Feature::Pitch
    }

    fn extract(&self, signal: &AudioSignal, channel: usize, _settings: &AnalysisSettings) -> FeatureResult {
        let samples = signal.channel(channel);
        let sr = signal.sample_rate();
        let window = (WINDOW_SECONDS * sr) as usize;
        let stepper = FrameStepper::fixed(window, window / 2);

        let mut frequency = BreakpointSeries::new();
        let mut confidence = BreakpointSeries::new();

        for frame in stepper.full_frames(samples.len()) {
            let time = frame_time(frame.start, sr);
            let estimate = detect_pitch(&samples[frame], sr);
            frequency.push_ordered(time, estimate.frequency);
            confidence.push_ordered(time, estimate.confidence);
        }

        log::debug!("Pitch: {} frames of {} samples", frequency.len(), stepper.window());

        FeatureResult::from_outputs(vec![frequency, confidence])
    }
}

/// Share of the best normalized correlation a peak needs to count as the period.
const KEY_PEAK_RATIO: f64 = 0.9;

/// Picks the period lag in `[sr/1000, sr/50)` from the normalized autocorrelation.
///
/// Each lag is scored as `Σ x[i]·x[i+lag]` over the energies of the two
/// overlapping spans, so long lags are not penalised for having fewer terms.
/// The first local peak within [`KEY_PEAK_RATIO`] of the best score wins,
/// which keeps period multiples from outranking the fundamental. Confidence is
/// that peak's score.
pub fn detect_pitch(frame: &[f32], sample_rate: f64) -> PitchEstimate {
    let min_lag = ((sample_rate / MAX_FREQUENCY_HZ) as usize).max(1);
    let max_lag = (sample_rate / MIN_FREQUENCY_HZ) as usize;
    if min_lag >= max_lag {
        return PitchEstimate::NONE;
    }

    let energy = running_energy(frame);
    if energy.last().copied().unwrap_or(0.0) <= 0.0 {
        return PitchEstimate::NONE;
    }

    // One extra lag on each side so the range edges can be judged as peaks.
    let first = min_lag - 1;
    let scores: Vec<f64> = (first..=max_lag)
        .map(|lag| normalized_correlation(frame, &energy, lag))
        .collect();
    let mut in_range = 1..scores.len() - 1;

    let mut best = in_range.start;
    for i in in_range.clone() {
        if scores[i] > scores[best] {
            best = i;
        }
    }

    let threshold = KEY_PEAK_RATIO * scores[best];
    let peak = in_range
        .find(|&i| scores[i] >= threshold && scores[i] >= scores[i - 1] && scores[i] > scores[i + 1])
        .unwrap_or(best);

    PitchEstimate {
        frequency: sample_rate / (first + peak) as f64,
        confidence: scores[peak].clamp(0.0, 1.0),
    }
}

/// `energy[k]` is the sum of squares of the first `k` samples.
fn running_energy(frame: &[f32]) -> Vec<f64> {
    let mut energy = Vec::with_capacity(frame.len() + 1);
    energy.push(0.0);
    let mut acc = 0.0;
    for &s in frame {
        acc += s as f64 * s as f64;
        energy.push(acc);
    }
    energy
}

fn normalized_correlation(frame: &[f32], energy: &[f64], lag: usize) -> f64 {
    let n = frame.len();
    if lag >= n {
        return 0.0;
    }
    let head = energy[n - lag];
    let tail = energy[n] - energy[lag];
    let denom = (head * tail).sqrt();
    if denom <= 0.0 {
        return 0.0;
    }
    let corr: f64 = frame
        .iter()
        .zip(&frame[lag..])
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum();
    corr / denom
}
