use super::framing::{frame_time, FrameStepper};
use super::registry::{Feature, FeatureExtractor};
use super::settings::AnalysisSettings;
use crate::audio::AudioSignal;
use crate::breakpoints::{BreakpointSeries, FeatureResult};

/// Stereo image of channels 0 and 1: pan position, width and RMS balance.
pub struct PanningExtractor;

/// Per-frame stereo statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoFrame {
    pub pan: f64,
    pub width: f64,
    pub balance: f64,
}

impl FeatureExtractor for PanningExtractor {
    fn feature(&self) -> Feature {
        Feature::Panning
    }

    fn extract(&self, signal: &AudioSignal, _channel: usize, settings: &AnalysisSettings) -> FeatureResult {
        let mut pan = BreakpointSeries::new();
        let mut width = BreakpointSeries::new();
        let mut balance = BreakpointSeries::new();

        if signal.num_channels() < 2 {
            log::warn!("Panning needs a stereo signal, got {} channel(s)", signal.num_channels());
            pan.push_ordered(0.0, 0.0);
            width.push_ordered(0.0, 0.0);
            balance.push_ordered(0.0, 0.0);
            return FeatureResult::from_outputs(vec![pan, width, balance]);
        }

        let left = signal.channel(0);
        let right = signal.channel(1);
        let sr = signal.sample_rate();
        let stepper = FrameStepper::from_settings(settings, sr);

        for frame in stepper.frames(left.len()) {
            let time = frame_time(frame.start, sr);
            let stats = stereo_frame(&left[frame.clone()], &right[frame]);
            pan.push_ordered(time, stats.pan);
            width.push_ordered(time, stats.width);
            balance.push_ordered(time, stats.balance);
        }

        log::debug!("Panning: {} frames", pan.len());

        FeatureResult::from_outputs(vec![pan, width, balance])
    }
}

/// Stereo statistics of two equally long frames.
pub fn stereo_frame(left: &[f32], right: &[f32]) -> StereoFrame {
    let len = left.len().min(right.len());
    if len == 0 {
        return StereoFrame { pan: 0.0, width: 0.5, balance: 0.0 };
    }

    let (mut left_sum, mut right_sum) = (0.0f64, 0.0f64);
    let (mut left_sq, mut right_sq) = (0.0f64, 0.0f64);
    let mut corr_sum = 0.0f64;
    for (&l, &r) in left.iter().zip(right) {
        let (l, r) = (l as f64, r as f64);
        left_sum += l.abs();
        right_sum += r.abs();
        left_sq += l * l;
        right_sq += r * r;
        corr_sum += l * r;
    }

    let total = left_sum + right_sum;
    let pan = if total > 0.0 { (right_sum - left_sum) / total } else { 0.0 };

    let left_rms = (left_sq / len as f64).sqrt();
    let right_rms = (right_sq / len as f64).sqrt();

    // len * rmsL * rmsR, written so identical channels give exactly 1.
    let denom = (left_sq * right_sq).sqrt();
    let corr = if denom > 0.0 { (corr_sum / denom).clamp(-1.0, 1.0) } else { 0.0 };
    let width = 1.0 - (corr * 0.5 + 0.5);

    let total_rms = left_rms + right_rms;
    let balance = if total_rms > 0.0 { (right_rms - left_rms) / total_rms } else { 0.0 };

    StereoFrame { pan, width, balance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_signals::{noise, sine};

    #[test]
    fn identical_channels_are_centred_and_narrow() {
        let samples = sine(330.0, 0.7, 44100.0, 44100);
        let signal = AudioSignal::stereo(samples.clone(), samples, 44100.0);
        let result = PanningExtractor.extract(&signal, 0, &AnalysisSettings::default());
        assert_eq!(result.num_outputs(), 3);
        assert!(result.output(0).unwrap().len() > 100);
        for series in result.outputs() {
            assert!(series.values().all(|v| v == 0.0));
        }
    }

    #[test]
    fn inverted_channels_are_fully_wide() {
        let left = noise(2048, 11);
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let stats = stereo_frame(&left, &right);
        assert_eq!(stats.width, 1.0);
        assert_eq!(stats.pan, 0.0);
        assert_eq!(stats.balance, 0.0);
    }

    #[test]
    fn hard_right_signal() {
        let stats = stereo_frame(&[0.0; 64], &sine(1000.0, 0.5, 44100.0, 64));
        assert_eq!(stats.pan, 1.0);
        assert_eq!(stats.balance, 1.0);
        // One silent side: correlation guard gives 0, so width sits at 0.5.
        assert_eq!(stats.width, 0.5);
    }

    #[test]
    fn ranges_hold_for_unrelated_channels() {
        let signal = AudioSignal::stereo(noise(8000, 1), noise(8000, 2), 8000.0);
        let result = PanningExtractor.extract(&signal, 0, &AnalysisSettings::default());
        let [pan, width, balance] = result.outputs() else {
            panic!("expected three outputs");
        };
        assert!(pan.values().all(|v| (-1.0..=1.0).contains(&v)));
        assert!(balance.values().all(|v| (-1.0..=1.0).contains(&v)));
        assert!(width.values().all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn mono_input_gives_single_zero_points() {
        let signal = AudioSignal::mono(noise(1000, 5), 44100.0);
        let result = PanningExtractor.extract(&signal, 0, &AnalysisSettings::default());
        assert_eq!(result.num_outputs(), 3);
        for series in result.outputs() {
            assert_eq!(series.len(), 1);
            assert_eq!(series.points()[0].time, 0.0);
            assert_eq!(series.points()[0].value, 0.0);
        }
    }
}
