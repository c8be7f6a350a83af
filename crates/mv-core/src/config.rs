use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Complete configuration for one screening run.
///
/// Serializable to TOML. Every field has a sane default, so an empty file is
/// a valid configuration.
///
/// # Example
/// ```
/// use mv_core::config::ScreeningConfig;
/// let config = ScreeningConfig::default();
/// assert_eq!(config.scorer.frame_length, 2048);
/// assert_eq!(config.loader.target_rate(), Some(22050));
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ScreeningConfig {
    /// Energy framing and score weights.
    pub scorer: ScorerConfig,
    /// Onset envelope and tempo estimation.
    pub tempo: TempoConfig,
    /// Decoding options.
    pub loader: LoaderConfig,
    /// Presentation options.
    pub report: ReportConfig,
}

/// Parameters of the voice feature scorer.
///
/// # Example
/// ```
/// use mv_core::config::ScorerConfig;
/// let scorer = ScorerConfig::default();
/// assert!((scorer.overlap() - 0.75).abs() < f32::EPSILON);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ScorerConfig {
    /// Analysis window in samples.
    pub frame_length: usize,
    /// Hop between consecutive windows in samples.
    pub hop_length: usize,
    /// Pause threshold as a fraction of the median frame energy.
    pub pause_threshold_ratio: f32,
    /// Substitute for a non-positive median energy.
    pub energy_floor: f32,
    /// Score penalty per unit of pause ratio.
    pub pause_weight: f32,
    /// Reference speaking tempo in BPM.
    pub tempo_baseline_bpm: f32,
    /// Score penalty per BPM away from the baseline.
    pub tempo_weight: f32,
    /// Clips shorter than this are reported as too short to analyze.
    pub min_duration_secs: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            pause_threshold_ratio: 0.2,
            energy_floor: 1e-6,
            pause_weight: 40.0,
            tempo_baseline_bpm: 100.0,
            tempo_weight: 0.3,
            min_duration_secs: 1.0,
        }
    }
}

impl ScorerConfig {
    /// Fraction of each window shared with the next one.
    #[must_use]
    pub fn overlap(&self) -> f32 {
        if self.frame_length == 0 {
            return 0.0;
        }
        1.0 - self.hop_length as f32 / self.frame_length as f32
    }

    /// Hop length giving the requested `overlap` for the current window.
    #[must_use]
    pub fn hop_for_overlap(&self, overlap: f32) -> usize {
        let overlap = overlap.clamp(0.0, 0.95);
        ((self.frame_length as f32 * (1.0 - overlap)).round() as usize).max(1)
    }
}

/// Parameters of the onset-strength tempo estimator.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TempoConfig {
    /// Number of mel bands in the onset spectrogram.
    pub n_mels: usize,
    /// Centre of the log-normal tempo prior.
    pub start_bpm: f32,
    /// Width of the prior, in octaves.
    pub std_bpm: f32,
    /// Tempi at or above this are never reported.
    pub max_tempo: f32,
    /// Longest autocorrelation lag, in seconds.
    pub ac_size_secs: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            n_mels: 128,
            start_bpm: 120.0,
            std_bpm: 1.0,
            max_tempo: 320.0,
            ac_size_secs: 8.0,
        }
    }
}

/// Decoding options.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LoaderConfig {
    /// Rate every upload is resampled to. 0 keeps the native rate.
    pub target_sample_rate: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 22050,
        }
    }
}

impl LoaderConfig {
    /// Target rate, or `None` to keep whatever the file carries.
    #[must_use]
    pub fn target_rate(&self) -> Option<u32> {
        (self.target_sample_rate > 0).then_some(self.target_sample_rate)
    }
}

/// Presentation options.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReportConfig {
    /// Lowest score shown as healthy.
    pub healthy_min: u8,
    /// Lowest score shown as mild slowing.
    pub mild_min: u8,
    /// Draw the energy profile chart.
    pub show_plot: bool,
    /// Chart height in terminal rows.
    pub plot_height: u16,
    /// Print the screening disclaimer under the report.
    pub show_disclaimer: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            healthy_min: 75,
            mild_min: 50,
            show_plot: true,
            plot_height: 12,
            show_disclaimer: true,
        }
    }
}

impl ScreeningConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        let s = &mut self.scorer;
        s.frame_length = s.frame_length.clamp(64, 16384);
        s.hop_length = s.hop_length.clamp(1, s.frame_length);
        s.pause_threshold_ratio = s.pause_threshold_ratio.clamp(0.0, 1.0);
        s.energy_floor = s.energy_floor.clamp(1e-12, 1e-2);
        s.pause_weight = s.pause_weight.clamp(0.0, 100.0);
        s.tempo_baseline_bpm = s.tempo_baseline_bpm.clamp(30.0, 300.0);
        s.tempo_weight = s.tempo_weight.clamp(0.0, 10.0);
        s.min_duration_secs = s.min_duration_secs.clamp(0.0, 60.0);

        let t = &mut self.tempo;
        t.n_mels = t.n_mels.clamp(8, 256);
        t.start_bpm = t.start_bpm.clamp(30.0, 300.0);
        t.std_bpm = t.std_bpm.clamp(0.1, 4.0);
        t.max_tempo = t.max_tempo.clamp(60.0, 640.0);
        t.ac_size_secs = t.ac_size_secs.clamp(1.0, 30.0);

        if self.loader.target_sample_rate != 0 {
            self.loader.target_sample_rate = self.loader.target_sample_rate.clamp(4000, 192_000);
        }

        self.report.healthy_min = self.report.healthy_min.min(100);
        self.report.plot_height = self.report.plot_height.clamp(4, 40);
    }

    /// Check cross-field constraints that clamping cannot repair.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the band thresholds are inverted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.report.mild_min > self.report.healthy_min {
            return Err(CoreError::Config(format!(
                "mild_min ({}) doit être ≤ healthy_min ({})",
                self.report.mild_min, self.report.healthy_min
            )));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    scorer: Option<ScorerSection>,
    tempo: Option<TempoSection>,
    loader: Option<LoaderSection>,
    report: Option<ReportSection>,
}

/// Scorer section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct ScorerSection {
    frame_length: Option<usize>,
    hop_length: Option<usize>,
    overlap: Option<f32>,
    pause_threshold_ratio: Option<f32>,
    energy_floor: Option<f32>,
    pause_weight: Option<f32>,
    tempo_baseline_bpm: Option<f32>,
    tempo_weight: Option<f32>,
    min_duration_secs: Option<f32>,
}

#[derive(Deserialize)]
struct TempoSection {
    n_mels: Option<usize>,
    start_bpm: Option<f32>,
    std_bpm: Option<f32>,
    max_tempo: Option<f32>,
    ac_size_secs: Option<f32>,
}

#[derive(Deserialize)]
struct LoaderSection {
    target_sample_rate: Option<u32>,
}

#[derive(Deserialize)]
struct ReportSection {
    healthy_min: Option<u8>,
    mild_min: Option<u8>,
    show_plot: Option<bool>,
    plot_height: Option<u16>,
    show_disclaimer: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file is missing, cannot be parsed, or carries
/// inconsistent band thresholds.
///
/// # Example
/// ```no_run
/// use mv_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ScreeningConfig> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    log::info!("Config chargée : {}", path.display());
    parse_config(&content).with_context(|| format!("Config invalide dans {}", path.display()))
}

/// Parse TOML text into a clamped, validated configuration.
///
/// # Errors
/// Returns an error on malformed TOML or inverted band thresholds.
///
/// # Example
/// ```
/// use mv_core::config::parse_config;
/// let config = parse_config("[scorer]\noverlap = 0.5\n").unwrap();
/// assert_eq!(config.scorer.hop_length, 1024);
/// ```
pub fn parse_config(content: &str) -> Result<ScreeningConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = ScreeningConfig::default();

    if let Some(s) = file.scorer {
        let c = &mut config.scorer;
        if let Some(v) = s.frame_length {
            c.frame_length = v;
        }
        if let Some(v) = s.hop_length {
            c.hop_length = v;
            if s.overlap.is_some() {
                log::warn!("hop_length et overlap tous deux fournis, overlap ignoré.");
            }
        } else if let Some(v) = s.overlap {
            c.hop_length = c.hop_for_overlap(v);
        }
        if let Some(v) = s.pause_threshold_ratio {
            c.pause_threshold_ratio = v;
        }
        if let Some(v) = s.energy_floor {
            c.energy_floor = v;
        }
        if let Some(v) = s.pause_weight {
            c.pause_weight = v;
        }
        if let Some(v) = s.tempo_baseline_bpm {
            c.tempo_baseline_bpm = v;
        }
        if let Some(v) = s.tempo_weight {
            c.tempo_weight = v;
        }
        if let Some(v) = s.min_duration_secs {
            c.min_duration_secs = v;
        }
    }

    if let Some(t) = file.tempo {
        let c = &mut config.tempo;
        if let Some(v) = t.n_mels {
            c.n_mels = v;
        }
        if let Some(v) = t.start_bpm {
            c.start_bpm = v;
        }
        if let Some(v) = t.std_bpm {
            c.std_bpm = v;
        }
        if let Some(v) = t.max_tempo {
            c.max_tempo = v;
        }
        if let Some(v) = t.ac_size_secs {
            c.ac_size_secs = v;
        }
    }

    if let Some(v) = file.loader.and_then(|l| l.target_sample_rate) {
        config.loader.target_sample_rate = v;
    }

    if let Some(r) = file.report {
        let c = &mut config.report;
        if let Some(v) = r.healthy_min {
            c.healthy_min = v;
        }
        if let Some(v) = r.mild_min {
            c.mild_min = v;
        }
        if let Some(v) = r.show_plot {
            c.show_plot = v;
        }
        if let Some(v) = r.plot_height {
            c.plot_height = v;
        }
        if let Some(v) = r.show_disclaimer {
            c.show_disclaimer = v;
        }
    }

    config.clamp_all();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, ScreeningConfig::default());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ScreeningConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = parse_config(
            "[scorer]\npause_weight = 25.0\n\n[report]\nshow_plot = false\n",
        )
        .unwrap();
        assert!((config.scorer.pause_weight - 25.0).abs() < f32::EPSILON);
        assert_eq!(config.scorer.frame_length, 2048);
        assert!(!config.report.show_plot);
        assert_eq!(config.report.healthy_min, 75);
    }

    #[test]
    fn hop_length_wins_over_overlap() {
        let config = parse_config("[scorer]\nhop_length = 256\noverlap = 0.5\n").unwrap();
        assert_eq!(config.scorer.hop_length, 256);
    }

    #[test]
    fn overlap_uses_configured_frame_length() {
        let config = parse_config("[scorer]\nframe_length = 1024\noverlap = 0.75\n").unwrap();
        assert_eq!(config.scorer.hop_length, 256);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse_config(
            "[scorer]\nframe_length = 1\nhop_length = 99999\npause_threshold_ratio = 3.0\n\n[loader]\ntarget_sample_rate = 10\n",
        )
        .unwrap();
        assert_eq!(config.scorer.frame_length, 64);
        assert_eq!(config.scorer.hop_length, 64);
        assert!((config.scorer.pause_threshold_ratio - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.loader.target_rate(), Some(4000));
    }

    #[test]
    fn zero_target_rate_keeps_native() {
        let config = parse_config("[loader]\ntarget_sample_rate = 0\n").unwrap();
        assert_eq!(config.loader.target_rate(), None);
    }

    #[test]
    fn inverted_bands_are_rejected() {
        let err = parse_config("[report]\nhealthy_min = 40\nmild_min = 60\n").unwrap_err();
        assert!(err.to_string().contains("mild_min") || format!("{err:#}").contains("mild_min"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config("[scorer\nframe_length = ").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }
}
