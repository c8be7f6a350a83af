use mv_core::config::{ScorerConfig, ScreeningConfig, TempoConfig};
use mv_core::{ScoreReport, Waveform};

use crate::energy::{PauseStats, rms_profile};
use crate::onset::{interior, onset_strength};
use crate::tempo::estimate_tempo;

/// Heuristic voice scorer: pause ratio and speaking tempo mapped to [0, 100].
///
/// Stateless: the same input always yields the same report.
///
/// # Example
/// ```
/// use mv_audio::scorer::VoiceScorer;
/// let scorer = VoiceScorer::default();
/// let report = scorer.analyze(&[], 22050);
/// assert_eq!(report.score, 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct VoiceScorer {
    scorer: ScorerConfig,
    tempo: TempoConfig,
}

impl VoiceScorer {
    /// Build a scorer from explicit parameters.
    #[must_use]
    pub fn new(scorer: ScorerConfig, tempo: TempoConfig) -> Self {
        Self { scorer, tempo }
    }

    /// Build a scorer from the `[scorer]` and `[tempo]` sections.
    #[must_use]
    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self::new(config.scorer.clone(), config.tempo.clone())
    }

    /// Scoring parameters in use.
    #[must_use]
    pub fn config(&self) -> &ScorerConfig {
        &self.scorer
    }

    /// Turn a mono waveform into a score report.
    ///
    /// Empty input, a zero sample rate, and clips shorter than
    /// `min_duration_secs` give a zero score with an empty energy profile.
    /// Input without any measurable onset (silence, a steady tone) has an
    /// undefined tempo and also scores 0, but keeps its energy diagnostics.
    /// Frames whose window reaches into the edge padding are left out of the
    /// tempo estimate.
    #[must_use]
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> ScoreReport {
        if samples.is_empty() || sample_rate == 0 {
            return ScoreReport::empty();
        }

        let duration_secs = samples.len() as f32 / sample_rate as f32;
        if duration_secs < self.scorer.min_duration_secs {
            log::debug!("clip too short to analyze: {duration_secs:.2}s");
            return ScoreReport::too_short(duration_secs);
        }

        let cfg = &self.scorer;
        let energy_profile = rms_profile(samples, cfg.frame_length, cfg.hop_length);
        let pauses = PauseStats::compute(&energy_profile, cfg.pause_threshold_ratio, cfg.energy_floor);

        let envelope = onset_strength(
            samples,
            sample_rate,
            cfg.frame_length,
            cfg.hop_length,
            self.tempo.n_mels,
        );
        let tempo = estimate_tempo(
            interior(&envelope, cfg.frame_length, cfg.hop_length),
            sample_rate,
            cfg.hop_length,
            &self.tempo,
        );

        let score = tempo.map_or(0, |bpm| self.score(pauses.pause_ratio, bpm));

        log::debug!(
            "frames={} median={:.3e} pauses={} ratio={:.3} tempo={:?} score={}",
            energy_profile.len(),
            pauses.median_energy,
            pauses.pause_frames,
            pauses.pause_ratio,
            tempo,
            score
        );

        ScoreReport {
            score,
            duration_secs,
            tempo_bpm: tempo.unwrap_or(0.0),
            pause_ratio: pauses.pause_ratio,
            pause_threshold: pauses.threshold,
            energy_profile,
        }
    }

    /// [`analyze`](Self::analyze) on a decoded waveform.
    #[must_use]
    pub fn analyze_waveform(&self, waveform: &Waveform) -> ScoreReport {
        self.analyze(waveform.samples(), waveform.sample_rate())
    }

    /// Unclamped score: `100 − pause_ratio·w_p − |tempo − baseline|·w_t`.
    #[must_use]
    pub fn raw_score(&self, pause_ratio: f32, tempo_bpm: f32) -> f64 {
        let cfg = &self.scorer;
        100.0
            - f64::from(pause_ratio) * f64::from(cfg.pause_weight)
            - (f64::from(tempo_bpm) - f64::from(cfg.tempo_baseline_bpm)).abs()
                * f64::from(cfg.tempo_weight)
    }

    /// Score clamped to [0, 100] and truncated.
    ///
    /// # Example
    /// ```
    /// use mv_audio::scorer::VoiceScorer;
    /// let scorer = VoiceScorer::default();
    /// assert_eq!(scorer.score(0.0, 100.0), 100);
    /// assert_eq!(scorer.score(0.5, 105.0), 78);
    /// assert_eq!(scorer.score(1.0, 400.0), 0);
    /// ```
    #[must_use]
    pub fn score(&self, pause_ratio: f32, tempo_bpm: f32) -> u8 {
        let raw = self.raw_score(pause_ratio, tempo_bpm);
        if !raw.is_finite() {
            return 0;
        }
        raw.clamp(0.0, 100.0) as u8
    }
}

/// Score `samples` with the default parameters.
///
/// # Example
/// ```
/// let report = mv_audio::analyze(&vec![0.0f32; 1000], 22050);
/// assert_eq!(report.score, 0);
/// assert_eq!(report.tempo_bpm, 0.0);
/// assert!(report.energy_profile.is_empty());
/// ```
#[must_use]
pub fn analyze(samples: &[f32], sample_rate: u32) -> ScoreReport {
    VoiceScorer::default().analyze(samples, sample_rate)
}
