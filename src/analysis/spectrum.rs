use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Fixed-size Hann-windowed magnitude spectrum.
///
/// The plan and buffers are allocated once; `magnitudes` reuses them for
/// every frame.
pub struct SpectralTransform {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectralTransform {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            size,
            fft,
            window: hann_window(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            magnitudes: vec![0.0; size / 2],
        }
    }

    pub fn num_bins(&self) -> usize {
        self.size / 2
    }

    /// Windows `frame`, transforms it and returns the first N/2 magnitudes.
    ///
    /// A short frame is zero-padded; samples beyond the FFT size are ignored.
    pub fn magnitudes(&mut self, frame: &[f32]) -> &[f32] {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = frame.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (mag, c) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *mag = c.norm();
        }
        &self.magnitudes
    }
}

/// Periodic Hann window, `0.5 * (1 - cos(2*pi*i/N))`.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}
