use audioadapter_buffers::direct::SequentialSliceOfVecs;
use rubato::{
    Async, FixedAsync, Resampler, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

use crate::error::AudioError;

/// Input frames fed to the resampler per call.
const CHUNK_SIZE: usize = 1024;

/// Band-limited sample rate conversion of a mono buffer, via rubato.
///
/// A windowed-sinc interpolator low-passes below the lower Nyquist rate, so
/// 44.1/48 kHz uploads do not fold their high band into the analysis range.
/// The output is aligned with the input (resampler delay removed) and holds
/// `len · to / from` samples. Returns the input unchanged when the rates match.
///
/// # Errors
/// Returns [`AudioError::Resample`] if rubato rejects the ratio or a buffer.
///
/// # Example
/// ```
/// use mv_audio::resample::resample;
/// let out = resample(&vec![0.0f32; 44100], 44100, 22050).unwrap();
/// assert_eq!(out.len(), 22050);
/// ```
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler =
        Async::<f32>::new_sinc(ratio, 1.0, &params, CHUNK_SIZE, 1, FixedAsync::Input)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

    let expected = (samples.len() as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let delay = resampler.output_delay();
    let max_out = resampler.output_frames_max();

    let mut out = Vec::with_capacity(delay + expected + max_out);
    let mut block_out = vec![vec![0.0f32; max_out]; 1];
    let mut pos = 0;

    // Past the end of the input, zeros flush the filter tail.
    while out.len() < delay + expected {
        let needed = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; needed];
        if pos < samples.len() {
            let end = (pos + needed).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
        }
        pos += needed;

        let block_in = vec![chunk];
        let written = {
            let input = SequentialSliceOfVecs::new(&block_in, 1, needed)
                .map_err(|e| AudioError::Resample(e.to_string()))?;
            let mut output = SequentialSliceOfVecs::new_mut(&mut block_out, 1, max_out)
                .map_err(|e| AudioError::Resample(e.to_string()))?;
            let (_, written) = resampler
                .process_into_buffer(&input, &mut output, None)
                .map_err(|e| AudioError::Resample(e.to_string()))?;
            written
        };
        if written == 0 {
            break;
        }
        out.extend_from_slice(&block_out[0][..written]);
    }

    log::debug!(
        "Rééchantillonnage {from_rate}Hz -> {to_rate}Hz : {} -> {expected} échantillons (délai {delay})",
        samples.len()
    );
    Ok(out.into_iter().skip(delay).take(expected).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: u32, secs: f64) -> Vec<f32> {
        (0..(f64::from(sample_rate) * secs) as usize)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                (0.5 * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
            })
            .collect()
    }

    /// RMS away from the edges, where the filter has settled.
    fn inner_rms(samples: &[f32]) -> f32 {
        let margin = samples.len() / 10;
        let inner = &samples[margin..samples.len() - margin];
        (inner.iter().map(|s| s * s).sum::<f32>() / inner.len() as f32).sqrt()
    }

    #[test]
    fn same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&input, 44100, 44100).unwrap(), input);
    }

    #[test]
    fn length_follows_ratio() {
        let input = vec![0.0f32; 48000 * 3];
        assert_eq!(resample(&input, 48000, 22050).unwrap().len(), 22050 * 3);
        assert_eq!(resample(&input, 48000, 16000).unwrap().len(), 16000 * 3);
        assert_eq!(resample(&vec![0.0f32; 8000], 8000, 22050).unwrap().len(), 22050);
    }

    #[test]
    fn in_band_tone_keeps_its_level() {
        let input = tone(1000.0, 44100, 2.0);
        let out = resample(&input, 44100, 22050).unwrap();
        let ratio = inner_rms(&out) / inner_rms(&input);
        assert!((ratio - 1.0).abs() < 0.05, "level ratio {ratio}");
    }

    #[test]
    fn content_above_new_nyquist_is_filtered_out() {
        // 15 kHz would alias to 7.05 kHz without a low-pass.
        let input = tone(15000.0, 44100, 2.0);
        let out = resample(&input, 44100, 22050).unwrap();
        let ratio = inner_rms(&out) / inner_rms(&input);
        assert!(ratio < 0.05, "alias leak {ratio}");
    }

    #[test]
    fn output_is_time_aligned() {
        // A single burst in the middle stays in the middle.
        let mut input = vec![0.0f32; 44100];
        for s in &mut input[22000..22100] {
            *s = 1.0;
        }
        let out = resample(&input, 44100, 22050).unwrap();
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap();
        assert!(peak.abs_diff(11025) < 40, "peak at {peak}");
    }
}
