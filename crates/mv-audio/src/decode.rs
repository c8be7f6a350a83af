use std::fs::File;
use std::path::Path;

use mv_core::Waveform;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// Decode an audio file into mono f32 samples at its native rate.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use mv_audio::decode::decode_file;
/// let wave = decode_file("voice.wav").unwrap();
/// println!("{} samples @ {} Hz", wave.len(), wave.sample_rate());
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<Waveform, AudioError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), &hint, &path.display().to_string())
}

fn decode_source(
    source: Box<dyn MediaSource>,
    hint: &Hint,
    label: &str,
) -> Result<Waveform, AudioError> {
    let mss = MediaSourceStream::new(source, MediaSourceStreamOptions::default());

    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;
    let track = format.default_track().ok_or(AudioError::NoTrack)?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("taux d'échantillonnage inconnu".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let track_id = track.id;
    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;
    let mut frame_errors = 0usize;
    let mut last_error = String::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Audio decode packet error: {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Audio decode frame error: {e}");
                frame_errors += 1;
                last_error = e.to_string();
                continue;
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        downmix_into(buf.samples(), channels, &mut mono);
    }

    if mono.is_empty() && frame_errors > 0 {
        return Err(AudioError::DecodeError(last_error));
    }

    log::info!(
        "Decoded {} samples @ {}Hz from {label}",
        mono.len(),
        sample_rate
    );

    Ok(Waveform::new(mono, sample_rate)?)
}

/// Average interleaved channels into mono, appending to `out`.
///
/// # Example
/// ```
/// use mv_audio::decode::downmix_into;
/// let mut mono = Vec::new();
/// downmix_into(&[1.0, 0.0, 0.5, 0.5], 2, &mut mono);
/// assert_eq!(mono, vec![0.5, 0.5]);
/// ```
pub fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_wav(dir: &Path, channels: u16, sample_rate: u32, frames: &[Vec<i16>]) -> PathBuf {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = dir.join("clip.wav");
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn decodes_mono_wav() {
        let frames: Vec<Vec<i16>> = (0..8000).map(|i| vec![(i % 100) as i16 * 100]).collect();
        let dir = tempfile::tempdir().unwrap();
        let wave = decode_file(write_wav(dir.path(), 1, 8000, &frames)).unwrap();
        assert_eq!(wave.sample_rate(), 8000);
        assert_eq!(wave.len(), 8000);
    }

    #[test]
    fn stereo_is_downmixed() {
        let frames: Vec<Vec<i16>> = (0..4000).map(|_| vec![16384, -16384]).collect();
        let dir = tempfile::tempdir().unwrap();
        let wave = decode_file(write_wav(dir.path(), 2, 16000, &frames)).unwrap();
        assert_eq!(wave.len(), 4000);
        assert!(wave.samples().iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn garbage_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"definitely not audio, just text").unwrap();
        assert!(decode_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = decode_file("no/such/voice.wav").unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
    }

    #[test]
    fn downmix_ignores_trailing_partial_frame() {
        let mut out = vec![9.0];
        downmix_into(&[0.2, 0.4, 1.0], 2, &mut out);
        assert_eq!(out.len(), 2);
        assert!((out[1] - 0.3).abs() < 1e-6);
    }
}
