/// Decoded audio held as one sample vector per channel.
///
/// Extractors only ever borrow this; it is replaced wholesale when a new
/// file is loaded.
#[derive(Clone, Debug)]
pub struct AudioSignal {
    channels: Vec<Vec<f32>>,
    sample_rate: f64,
}

impl AudioSignal {
    /// Builds a signal from planar channel data.
    ///
    /// Channels longer than the shortest one are truncated so every channel
    /// has the same sample count.
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: f64) -> Self {
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        for ch in &mut channels {
            ch.truncate(len);
        }
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: f64) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: f64) -> Self {
        Self::new(vec![left, right], sample_rate)
    }

    /// Splits interleaved frames (`L R L R ...`) into planar channels.
    pub fn from_interleaved(samples: &[f32], num_channels: usize, sample_rate: f64) -> Self {
        let num_channels = num_channels.max(1);
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(channels, sample_rate)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.num_samples() as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    /// Samples of one channel; out-of-range indices give an empty slice.
    pub fn channel(&self, index: usize) -> &[f32] {
        self.channels.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Clamps a requested channel into the valid range.
    pub fn clamp_channel(&self, channel: usize) -> usize {
        channel.min(self.num_channels().saturating_sub(1))
    }
}
