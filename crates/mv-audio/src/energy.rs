/// Per-frame RMS energy over centered, zero-padded frames.
///
/// Frame `t` is centered on sample `t * hop_length`, so a signal of `n`
/// samples yields `1 + n / hop_length` frames. Samples outside the signal
/// count as silence.
///
/// # Example
/// ```
/// use mv_audio::energy::rms_profile;
/// let profile = rms_profile(&vec![0.5f32; 4096], 2048, 512);
/// assert_eq!(profile.len(), 9);
/// assert!((profile[4] - 0.5).abs() < 1e-4);
/// ```
#[must_use]
pub fn rms_profile(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f32> {
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    // Prefix sums of squares in f64 keep each frame O(1) without drift.
    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &s in samples {
        acc += f64::from(s) * f64::from(s);
        prefix.push(acc);
    }

    let half = frame_length / 2;
    let n_frames = 1 + samples.len() / hop_length;

    (0..n_frames)
        .map(|t| {
            let centre = t * hop_length;
            let start = centre.saturating_sub(half).min(samples.len());
            let end = (centre + frame_length - half).min(samples.len());
            let sum_sq = (prefix[end] - prefix[start]).max(0.0);
            (sum_sq / frame_length as f64).sqrt() as f32
        })
        .collect()
}

/// Statistical median; the mean of the two middle values for even lengths.
///
/// Returns 0 for an empty slice.
///
/// # Example
/// ```
/// use mv_audio::energy::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
/// ```
#[must_use]
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Pause statistics of an energy profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PauseStats {
    /// Median frame energy after flooring.
    pub median_energy: f32,
    /// Energy under which a frame counts as a pause.
    pub threshold: f32,
    /// Number of pause frames.
    pub pause_frames: usize,
    /// `pause_frames / frame count`, 0 for an empty profile.
    pub pause_ratio: f32,
}

impl PauseStats {
    /// Classify frames against `threshold_ratio * median`, with the median
    /// floored at `floor` when it is not positive.
    ///
    /// # Example
    /// ```
    /// use mv_audio::energy::PauseStats;
    /// let stats = PauseStats::compute(&[1.0, 1.0, 0.1, 1.0], 0.2, 1e-6);
    /// assert_eq!(stats.pause_frames, 1);
    /// assert!((stats.pause_ratio - 0.25).abs() < f32::EPSILON);
    /// ```
    #[must_use]
    pub fn compute(profile: &[f32], threshold_ratio: f32, floor: f32) -> Self {
        let raw = median(profile);
        let median_energy = if raw > 0.0 { raw } else { floor };
        let threshold = threshold_ratio * median_energy;
        let pause_frames = profile.iter().filter(|&&e| e < threshold).count();
        let pause_ratio = if profile.is_empty() {
            0.0
        } else {
            pause_frames as f32 / profile.len() as f32
        };
        Self {
            median_energy,
            threshold,
            pause_frames,
            pause_ratio,
        }
    }
}
