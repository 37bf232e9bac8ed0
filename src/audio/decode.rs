use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::signal::AudioSignal;

/// Decodes a whole file into memory, keeping every channel.
pub fn decode_audio(path: &Path) -> Result<AudioSignal> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let declared_channels = track.codec_params.channels.map(|c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut channels: Option<usize> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(err)) => {
                log::debug!("Skipping undecodable packet: {}", err);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if !accept_layout(&mut channels, spec.channels.count()) {
            log::warn!(
                "Skipping packet with {} channel(s) in a {}-channel stream",
                spec.channels.count(),
                channels.unwrap_or_default()
            );
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    let channels = channels.or(declared_channels).unwrap_or(1);
    let signal = AudioSignal::from_interleaved(&interleaved, channels, sample_rate as f64);

    log::info!(
        "Decoded audio: {} channel(s), {} samples, {}Hz, {:.1}s",
        signal.num_channels(),
        signal.num_samples(),
        sample_rate,
        signal.duration()
    );

    Ok(signal)
}

/// The first decoded packet fixes the channel count for the whole stream.
fn accept_layout(fixed: &mut Option<usize>, count: usize) -> bool {
    *fixed.get_or_insert(count) == count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[[i16; 2]]) {
        let data_len = (frames.len() * channels as usize * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
        bytes.extend_from_slice(&(channels * 2).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for frame in frames {
            for &s in &frame[..channels as usize] {
                bytes.extend_from_slice(&s.to_le_bytes());
            }
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn first_layout_wins() {
        let mut channels = None;
        assert!(accept_layout(&mut channels, 2));
        assert!(accept_layout(&mut channels, 2));
        assert!(!accept_layout(&mut channels, 1));
        assert_eq!(channels, Some(2));
    }

    #[test]
    fn stereo_wav_keeps_channels_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 8000, &[[16384, -16384]; 400]);

        let signal = decode_audio(&path).unwrap();
        assert_eq!(signal.num_channels(), 2);
        assert_eq!(signal.num_samples(), 400);
        assert_eq!(signal.sample_rate(), 8000.0);
        assert!(signal.channel(0).iter().all(|&s| (s - 0.5).abs() < 1e-4));
        assert!(signal.channel(1).iter().all(|&s| (s + 0.5).abs() < 1e-4));
    }
}
