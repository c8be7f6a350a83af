use serde::Serialize;

use crate::config::ReportConfig;

/// Result of one scoring call. Never mutated after creation.
///
/// # Example
/// ```
/// use mv_core::report::ScoreReport;
/// let report = ScoreReport::empty();
/// assert_eq!(report.score, 0);
/// assert!(report.energy_profile.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Heuristic score in [0, 100].
    pub score: u8,
    /// Clip length in seconds.
    pub duration_secs: f32,
    /// Estimated speaking tempo. 0 when undefined.
    pub tempo_bpm: f32,
    /// Fraction of frames below the pause threshold.
    pub pause_ratio: f32,
    /// Energy level under which a frame counts as a pause.
    pub pause_threshold: f32,
    /// Per-frame RMS energy.
    pub energy_profile: Vec<f32>,
}

impl ScoreReport {
    /// Zeroed report for empty input or a failed decode.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zeroed report that keeps the measured duration.
    ///
    /// # Example
    /// ```
    /// use mv_core::report::ScoreReport;
    /// let report = ScoreReport::too_short(0.4);
    /// assert_eq!(report.score, 0);
    /// assert!((report.duration_secs - 0.4).abs() < f32::EPSILON);
    /// ```
    #[must_use]
    pub fn too_short(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            ..Self::default()
        }
    }

    /// `true` if there is an energy profile worth plotting.
    #[must_use]
    pub fn has_energy(&self) -> bool {
        !self.energy_profile.is_empty()
    }
}

/// Qualitative reading of a score.
///
/// # Example
/// ```
/// use mv_core::report::Band;
/// assert_eq!(Band::from_score(80), Band::Healthy);
/// assert_eq!(Band::from_score(60), Band::Mild);
/// assert_eq!(Band::from_score(10), Band::Decline);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// No signs of decline.
    Healthy,
    /// Mild slowing, re-test or seek screening.
    Mild,
    /// Signs of decline, seek a specialist.
    Decline,
}

impl Band {
    /// Band with the default thresholds (75 / 50).
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        let defaults = ReportConfig::default();
        Self::with_thresholds(score, defaults.healthy_min, defaults.mild_min)
    }

    /// Band with explicit thresholds.
    #[must_use]
    pub fn with_thresholds(score: u8, healthy_min: u8, mild_min: u8) -> Self {
        if score >= healthy_min {
            Self::Healthy
        } else if score >= mild_min {
            Self::Mild
        } else {
            Self::Decline
        }
    }

    /// User-facing message for this band.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Healthy => "🟢 Your voice shows no signs of cognitive decline.",
            Self::Mild => {
                "🟠 Mild signs of slowing. Try again after a week or seek professional screening."
            }
            Self::Decline => "🔴 Signs of early decline detected. Consider visiting a specialist.",
        }
    }
}

/// Everything a presentation sink needs to show one result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderModel {
    /// The score report.
    pub report: ScoreReport,
    /// Band derived from the score.
    pub band: Band,
    /// Non-fatal problem to surface next to the report.
    pub warning: Option<String>,
    /// Upload name, if known.
    pub source_name: Option<String>,
}

impl RenderModel {
    /// Wrap a report, deriving its band from the configured thresholds.
    #[must_use]
    pub fn new(report: ScoreReport, config: &ReportConfig) -> Self {
        let band = Band::with_thresholds(report.score, config.healthy_min, config.mild_min);
        Self {
            report,
            band,
            warning: None,
            source_name: None,
        }
    }

    /// Zero-score model carrying a visible warning.
    ///
    /// # Example
    /// ```
    /// use mv_core::config::ReportConfig;
    /// use mv_core::report::{Band, RenderModel};
    /// let model = RenderModel::degraded("decode failed", &ReportConfig::default());
    /// assert_eq!(model.band, Band::Decline);
    /// assert_eq!(model.warning.as_deref(), Some("decode failed"));
    /// ```
    #[must_use]
    pub fn degraded(warning: impl Into<String>, config: &ReportConfig) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::new(ScoreReport::empty(), config)
        }
    }

    /// Attach the upload name.
    #[must_use]
    pub fn with_source(mut self, name: Option<String>) -> Self {
        self.source_name = name;
        self
    }
}

/// Shown under every report.
pub const DISCLAIMER: &str = "⚠ This tool is intended for early screening only. It is not a replacement for medical evaluation. Please consult a neurologist for a diagnosis.";

/// Shown instead of the chart when the energy profile is empty.
pub const NO_ENERGY_NOTICE: &str = "No usable energy data found in the uploaded audio.";
