use std::ops::Range;

use super::settings::AnalysisSettings;

/// Window and hop lengths in samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStepper {
    window: usize,
    hop: usize,
}

impl FrameStepper {
    /// Derives window/hop from the settings, truncating to whole samples.
    pub fn from_settings(settings: &AnalysisSettings, sample_rate: f64) -> Self {
        let window = to_samples(settings.window_size_ms as f64 * sample_rate / 1000.0).max(1);
        let hop = to_samples(window as f64 * settings.hop_size_pct as f64 / 100.0).max(1);
        Self { window, hop }
    }

    pub fn fixed(window: usize, hop: usize) -> Self {
        Self {
            window: window.max(1),
            hop: hop.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Every frame start in `[0, num_samples)`, the last frame possibly short.
    pub fn frames(&self, num_samples: usize) -> impl Iterator<Item = Range<usize>> {
        let window = self.window;
        (0..num_samples)
            .step_by(self.hop)
            .map(move |start| start..(start + window).min(num_samples))
            .filter(|r| !r.is_empty())
    }

    /// Only frames where the whole window fits.
    pub fn full_frames(&self, num_samples: usize) -> impl Iterator<Item = Range<usize>> {
        let window = self.window;
        let last_start = num_samples.checked_sub(window);
        (0..=last_start.unwrap_or(0))
            .step_by(self.hop)
            .take_while(move |_| last_start.is_some())
            .map(move |start| start..start + window)
    }

    pub fn frame_count(&self, num_samples: usize) -> usize {
        num_samples.div_ceil(self.hop)
    }

    pub fn full_frame_count(&self, num_samples: usize) -> usize {
        match num_samples.checked_sub(self.window) {
            Some(span) => span / self.hop + 1,
            None => 0,
        }
    }
}

/// Timestamp of a frame, in seconds.
pub fn frame_time(start: usize, sample_rate: f64) -> f64 {
    if sample_rate > 0.0 {
        start as f64 / sample_rate
    } else {
        0.0
    }
}

fn to_samples(x: f64) -> usize {
    if x.is_finite() && x > 0.0 {
        x as usize
    } else {
        0
    }
}
