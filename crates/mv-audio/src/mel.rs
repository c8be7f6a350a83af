//! Slaney-style mel filterbank.
//!
//! Triangular filters spaced evenly on the Slaney mel scale (linear below
//! 1 kHz, logarithmic above), area-normalized so that each band measures
//! energy per Hz.

const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

fn log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Hz → mel on the Slaney scale.
///
/// # Example
/// ```
/// use mv_audio::mel::{hz_to_mel, mel_to_hz};
/// assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-4);
/// assert!((mel_to_hz(hz_to_mel(4000.0)) - 4000.0).abs() < 0.5);
/// ```
#[must_use]
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel → Hz on the Slaney scale.
#[must_use]
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// One triangular filter, stored sparsely from its first non-zero bin.
struct Band {
    start: usize,
    weights: Vec<f32>,
}

/// Projects power spectra onto mel bands.
///
/// # Example
/// ```
/// use mv_audio::mel::MelFilterbank;
/// let bank = MelFilterbank::new(22050, 2048, 128);
/// assert_eq!(bank.n_mels(), 128);
/// ```
pub struct MelFilterbank {
    bands: Vec<Band>,
    n_bins: usize,
}

impl MelFilterbank {
    /// Build `n_mels` filters covering 0 Hz to Nyquist for an `n_fft`-point FFT.
    #[must_use]
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;

        let mel_max = hz_to_mel(nyquist);
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let bin_hz = sample_rate as f32 / n_fft as f32;

        let bands = edges
            .windows(3)
            .map(|w| {
                let (lo, centre, hi) = (w[0], w[1], w[2]);
                let enorm = 2.0 / (hi - lo).max(f32::EPSILON);
                let weights: Vec<(usize, f32)> = (0..n_bins)
                    .filter_map(|k| {
                        let f = k as f32 * bin_hz;
                        let rise = (f - lo) / (centre - lo).max(f32::EPSILON);
                        let fall = (hi - f) / (hi - centre).max(f32::EPSILON);
                        let w = rise.min(fall);
                        (w > 0.0).then_some((k, w * enorm))
                    })
                    .collect();
                Band {
                    start: weights.first().map_or(0, |&(k, _)| k),
                    weights: weights.into_iter().map(|(_, w)| w).collect(),
                }
            })
            .collect();

        Self { bands, n_bins }
    }

    /// Number of mel bands.
    #[must_use]
    pub fn n_mels(&self) -> usize {
        self.bands.len()
    }

    /// Spectrum length this bank expects.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Write the mel power of `power` (length [`n_bins`](Self::n_bins)) into `out`.
    pub fn apply(&self, power: &[f32], out: &mut [f32]) {
        for (slot, band) in out.iter_mut().zip(&self.bands) {
            *slot = power
                .iter()
                .skip(band.start)
                .zip(&band.weights)
                .map(|(p, w)| p * w)
                .sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_linear_below_one_khz() {
        assert!((hz_to_mel(200.0) - 3.0).abs() < 1e-4);
        assert!((mel_to_hz(3.0) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn every_band_has_weight_at_default_resolution() {
        let bank = MelFilterbank::new(22050, 2048, 128);
        assert!(bank.bands.iter().all(|b| !b.weights.is_empty()));
    }

    #[test]
    fn band_energy_follows_frequency() {
        let bank = MelFilterbank::new(22050, 2048, 40);
        let mut power = vec![0.0f32; bank.n_bins()];
        // 4 kHz tone
        power[(4000.0f32 / (22050.0 / 2048.0)).round() as usize] = 1.0;
        let mut mel = vec![0.0f32; bank.n_mels()];
        bank.apply(&power, &mut mel);

        let hot: Vec<usize> = mel
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert!(!hot.is_empty() && hot.len() <= 2);
        let centre_hz = mel_to_hz(hz_to_mel(11025.0) * (hot[0] + 1) as f32 / 41.0);
        assert!((centre_hz - 4000.0).abs() < 600.0);
    }
}
