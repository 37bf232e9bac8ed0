use super::framing::{frame_time, FrameStepper};
use super::registry::{Feature, FeatureExtractor};
use super::settings::AnalysisSettings;
use super::spectrum::SpectralTransform;
use crate::audio::AudioSignal;
use crate::breakpoints::{BreakpointSeries, FeatureResult};

pub const FFT_SIZE: usize = 2048;
const ROLLOFF_FRACTION: f64 = 0.85;

/// Spectral shape descriptors over fixed 2048-sample frames, hop N/2.
///
/// Frame sizes ignore the window/hop settings.
pub struct SpectralExtractor {
    fft_size: usize,
}

impl Default for SpectralExtractor {
    fn default() -> Self {
        Self { fft_size: FFT_SIZE }
    }
}

impl FeatureExtractor for SpectralExtractor {
    fn feature(&self) -> Feature {
        Feature::Spectral
    }

    fn extract(&self, signal: &AudioSignal, channel: usize, _settings: &AnalysisSettings) -> FeatureResult {
        let samples = signal.channel(channel);
        let sr = signal.sample_rate();
        let stepper = FrameStepper::fixed(self.fft_size, self.fft_size / 2);
        let bin_hz = sr / self.fft_size as f64;
        let nyquist = sr / 2.0;

        let mut centroid = BreakpointSeries::new();
        let mut flux = BreakpointSeries::new();
        let mut flatness = BreakpointSeries::new();
        let mut rolloff = BreakpointSeries::new();

        if stepper.full_frame_count(samples.len()) == 0 {
            return FeatureResult::from_outputs(vec![centroid, flux, flatness, rolloff]);
        }

        let mut transform = SpectralTransform::new(self.fft_size);
        let mut previous: Option<Vec<f32>> = None;

        for frame in stepper.full_frames(samples.len()) {
            let time = frame_time(frame.start, sr);
            let mags = transform.magnitudes(&samples[frame]);

            centroid.push_ordered(time, spectral_centroid(mags, bin_hz));
            flux.push_ordered(time, previous.as_deref().map_or(0.0, |prev| spectral_flux(mags, prev)));
            flatness.push_ordered(time, spectral_flatness(mags));
            rolloff.push_ordered(time, spectral_rolloff(mags, bin_hz, nyquist));

            match previous.as_mut() {
                Some(prev) => prev.copy_from_slice(mags),
                None => previous = Some(mags.to_vec()),
            }
        }

        log::debug!("Spectral: {} frames of {} samples", centroid.len(), self.fft_size);

        FeatureResult::from_outputs(vec![centroid, flux, flatness, rolloff])
    }
}

/// Magnitude-weighted mean frequency; 0 for an empty spectrum.
pub fn spectral_centroid(mags: &[f32], bin_hz: f64) -> f64 {
    let mut weighted = 0.0f64;
    let mut total = 0.0f64;
    for (i, &m) in mags.iter().enumerate() {
        weighted += i as f64 * bin_hz * m as f64;
        total += m as f64;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// RMS difference between two spectra.
pub fn spectral_flux(current: &[f32], previous: &[f32]) -> f64 {
    if current.is_empty() {
        return 0.0;
    }
    let sum: f64 = current
        .iter()
        .zip(previous)
        .map(|(&c, &p)| {
            let d = c as f64 - p as f64;
            d * d
        })
        .sum();
    (sum / current.len() as f64).sqrt()
}

/// Geometric over arithmetic mean of the strictly positive bins.
pub fn spectral_flatness(mags: &[f32]) -> f64 {
    let mut log_sum = 0.0f64;
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for &m in mags.iter().filter(|&&m| m > 0.0) {
        log_sum += (m as f64).ln();
        sum += m as f64;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    let arithmetic = sum / count as f64;
    if arithmetic > 0.0 {
        let geometric = (log_sum / count as f64).exp();
        (geometric / arithmetic).min(1.0)
    } else {
        0.0
    }
}

/// Frequency below which 85% of the magnitude sum lies.
pub fn spectral_rolloff(mags: &[f32], bin_hz: f64, nyquist: f64) -> f64 {
    let total: f64 = mags.iter().map(|&m| m as f64).sum();
    let threshold = total * ROLLOFF_FRACTION;
    let mut cumulative = 0.0f64;
    for (i, &m) in mags.iter().enumerate() {
        cumulative += m as f64;
        if cumulative >= threshold {
            return i as f64 * bin_hz;
        }
    }
    nyquist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_signals::{noise, sine};

    fn extract(samples: Vec<f32>, sr: f64) -> FeatureResult {
        let signal = AudioSignal::mono(samples, sr);
        SpectralExtractor::default().extract(&signal, 0, &AnalysisSettings::default())
    }

    #[test]
    fn frame_count_uses_full_windows() {
        assert_eq!(extract(vec![0.1; 2047], 44100.0).total_points(), 0);
        let result = extract(noise(2048 * 3, 9), 44100.0);
        // floor((6144 - 2048) / 1024) + 1
        assert_eq!(result.output(0).unwrap().len(), 5);
        assert_eq!(result.output(3).unwrap().points()[1].time, 1024.0 / 44100.0);
    }

    #[test]
    fn sine_centroid_near_its_frequency() {
        let sr = 44100.0;
        let result = extract(sine(1000.0, 0.5, sr as f32, 8192), sr);
        for c in result.output(0).unwrap().values() {
            assert!((c - 1000.0).abs() < 60.0, "centroid={c}");
        }
        for r in result.output(3).unwrap().values() {
            assert!((r - 1000.0).abs() < 2.0 * sr / FFT_SIZE as f64, "rolloff={r}");
        }
    }

    #[test]
    fn flux_is_zero_first_and_for_steady_signals() {
        let result = extract(sine(441.0, 0.5, 44100.0, 8192), 44100.0);
        let flux = result.output(1).unwrap();
        assert_eq!(flux.points()[0].value, 0.0);

        let result = extract(noise(8192, 4), 44100.0);
        assert!(result.output(1).unwrap().points()[1].value > 0.0);
    }

    #[test]
    fn ranges_hold_for_noise() {
        let sr = 22050.0;
        let result = extract(noise(22050, 21), sr);
        let [centroid, flux, flatness, rolloff] = result.outputs() else {
            panic!("expected four outputs");
        };
        assert!(centroid.values().all(|v| (0.0..=sr / 2.0).contains(&v)));
        assert!(rolloff.values().all(|v| v > 0.0 && v <= sr / 2.0));
        assert!(flatness.values().all(|v| (0.0..=1.0).contains(&v)));
        assert!(flux.values().all(|v| v >= 0.0 && v.is_finite()));
        // White noise is spectrally flat compared with a sine.
        let sine_flat = extract(sine(1000.0, 0.5, sr as f32, 22050), sr);
        let noise_mean: f64 = flatness.values().sum::<f64>() / flatness.len() as f64;
        let sine_mean: f64 = sine_flat.output(2).unwrap().values().sum::<f64>() / sine_flat.output(2).unwrap().len() as f64;
        assert!(noise_mean > sine_mean);
    }

    #[test]
    fn silence_is_guarded() {
        let result = extract(vec![0.0; 4096], 44100.0);
        for series in result.outputs() {
            assert!(series.values().all(|v| v == 0.0));
        }
    }

    #[test]
    fn descriptor_guards() {
        assert_eq!(spectral_centroid(&[], 10.0), 0.0);
        assert_eq!(spectral_flatness(&[0.0, 0.0]), 0.0);
        assert_eq!(spectral_flux(&[], &[]), 0.0);
        assert!((spectral_flatness(&[2.0, 2.0, 2.0]) - 1.0).abs() < 1e-12);
        // Energy only in the last bin.
        assert_eq!(spectral_rolloff(&[0.0, 0.0, 1.0], 100.0, 400.0), 200.0);
    }
}
