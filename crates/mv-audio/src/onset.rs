use crate::fft::FftPipeline;
use crate::mel::MelFilterbank;

/// Power floor before the dB conversion.
const AMIN: f32 = 1e-10;
/// Dynamic range kept below the loudest mel cell.
const TOP_DB: f32 = 80.0;

/// Onset strength envelope via log-mel spectral flux.
///
/// Each frame is a centered, Hann-windowed `n_fft`-point STFT frame, projected
/// on `n_mels` mel bands and converted to dB (clipped to 80 dB under the
/// loudest cell). The envelope is the band-averaged, half-wave rectified
/// difference between consecutive frames, so rising energy registers and
/// decaying energy does not.
///
/// Returns one value per frame (`1 + len / hop`), the first being 0.
///
/// # Example
/// ```
/// use mv_audio::onset::onset_strength;
/// let env = onset_strength(&vec![0.0f32; 22050], 22050, 2048, 512, 64);
/// assert_eq!(env.len(), 1 + 22050 / 512);
/// assert!(env.iter().all(|&v| v == 0.0));
/// ```
#[must_use]
pub fn onset_strength(
    samples: &[f32],
    sample_rate: u32,
    n_fft: usize,
    hop_length: usize,
    n_mels: usize,
) -> Vec<f32> {
    if samples.is_empty() || n_fft == 0 || hop_length == 0 || n_mels == 0 {
        return Vec::new();
    }

    let mut fft = FftPipeline::new(n_fft);
    let bank = MelFilterbank::new(sample_rate, n_fft, n_mels);

    let n_frames = 1 + samples.len() / hop_length;
    let half = n_fft / 2;

    let mut frame = vec![0.0f32; n_fft];
    let mut power = vec![0.0f32; fft.n_bins()];
    let mut mel_db = vec![0.0f32; n_frames * n_mels];
    let mut peak_db = f32::MIN;

    for (t, row) in mel_db.chunks_exact_mut(n_mels).enumerate() {
        fill_centered(samples, t * hop_length, half, &mut frame);
        fft.power_into(&frame, &mut power);
        bank.apply(&power, row);
        for cell in row.iter_mut() {
            *cell = 10.0 * cell.max(AMIN).log10();
            peak_db = peak_db.max(*cell);
        }
    }

    let floor_db = peak_db - TOP_DB;
    for cell in &mut mel_db {
        *cell = cell.max(floor_db);
    }

    let mut envelope = Vec::with_capacity(n_frames);
    envelope.push(0.0);
    for pair in mel_db.chunks_exact(n_mels).collect::<Vec<_>>().windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let flux: f32 = cur
            .iter()
            .zip(prev)
            .map(|(&c, &p)| (c - p).max(0.0))
            .sum();
        envelope.push(flux / n_mels as f32);
    }
    envelope
}

/// Number of frames at each end whose window reaches into the zero padding.
#[must_use]
pub fn padded_frames(n_fft: usize, hop_length: usize) -> usize {
    if hop_length == 0 {
        return 0;
    }
    n_fft / (2 * hop_length) + 1
}

/// The envelope without its padded edge frames.
///
/// Frames half-filled with padding see the signal switch on or off inside
/// the window, which reads as a broadband onset even for a steady input.
///
/// # Example
/// ```
/// use mv_audio::onset::interior;
/// let env = vec![5.0, 5.0, 5.0, 0.1, 0.2, 0.3, 5.0, 5.0, 5.0];
/// assert_eq!(interior(&env, 2048, 512), &[0.1, 0.2, 0.3]);
/// ```
#[must_use]
pub fn interior(envelope: &[f32], n_fft: usize, hop_length: usize) -> &[f32] {
    let edge = padded_frames(n_fft, hop_length);
    if envelope.len() <= 2 * edge {
        return &[];
    }
    &envelope[edge..envelope.len() - edge]
}

/// Copy the frame centered on `centre` into `out`, zero outside the signal.
fn fill_centered(samples: &[f32], centre: usize, half: usize, out: &mut [f32]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (centre + i)
            .checked_sub(half)
            .and_then(|idx| samples.get(idx))
            .copied()
            .unwrap_or(0.0);
    }
}
