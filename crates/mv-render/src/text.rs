use mv_core::config::ReportConfig;
use mv_core::report::{DISCLAIMER, NO_ENERGY_NOTICE, RenderModel};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
/// Sparkline width in characters.
pub const SPARKLINE_WIDTH: usize = 72;

/// Render a report as plain text (pipes, logs, non-tty stdout).
///
/// # Example
/// ```
/// use mv_core::config::ReportConfig;
/// use mv_core::report::{RenderModel, ScoreReport};
/// use mv_render::text::format_text;
///
/// let report = ScoreReport { score: 81, ..ScoreReport::default() };
/// let text = format_text(&RenderModel::new(report, &ReportConfig::default()), &ReportConfig::default());
/// assert!(text.contains("Cognitive Health Score: 81/100"));
/// ```
#[must_use]
pub fn format_text(model: &RenderModel, config: &ReportConfig) -> String {
    let report = &model.report;
    let mut lines: Vec<String> = vec!["🧠 ManoVeda: Alzheimer’s Voice Screening".into()];
    lines.extend(model.source_name.iter().map(|name| format!("🎙 {name}")));
    lines.extend(model.warning.iter().cloned());
    lines.extend([
        String::new(),
        format!("Cognitive Health Score: {}/100", report.score),
        format!(" • Audio Duration: {:.2} sec", report.duration_secs),
        format!(" • Speaking Tempo: {:.2} BPM", report.tempo_bpm),
        format!(" • Pause Ratio: {:.1}%", report.pause_ratio * 100.0),
        String::new(),
        model.band.message().to_string(),
    ]);

    if !report.has_energy() {
        lines.extend([String::new(), format!("ℹ {NO_ENERGY_NOTICE}")]);
    } else if config.show_plot {
        lines.extend([
            String::new(),
            format!(
                "📈 Voice Energy Pattern ({} frames, pause threshold {:.4})",
                report.energy_profile.len(),
                report.pause_threshold
            ),
            sparkline(&report.energy_profile, SPARKLINE_WIDTH),
        ]);
    }

    if config.show_disclaimer {
        lines.extend([String::new(), DISCLAIMER.to_string()]);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Compress `values` into at most `width` block characters, each showing the
/// peak of its bucket relative to the global peak.
///
/// # Example
/// ```
/// use mv_render::text::sparkline;
/// assert_eq!(sparkline(&[0.0, 1.0], 8), "▁█");
/// assert_eq!(sparkline(&[], 8), "");
/// ```
#[must_use]
pub fn sparkline(values: &[f32], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let peak = values.iter().copied().fold(0.0f32, f32::max);
    let bucket = values.len().div_ceil(width);

    values
        .chunks(bucket)
        .map(|chunk| {
            let top = chunk.iter().copied().fold(0.0f32, f32::max);
            if peak <= 0.0 {
                return BARS[0];
            }
            let level = ((top / peak) * (BARS.len() - 1) as f32).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_core::report::ScoreReport;

    fn model(profile: Vec<f32>) -> RenderModel {
        let report = ScoreReport {
            score: 55,
            duration_secs: 9.876,
            tempo_bpm: 97.5,
            pause_ratio: 0.25,
            pause_threshold: 0.01,
            energy_profile: profile,
        };
        RenderModel::new(report, &ReportConfig::default()).with_source(Some("memo.wav".into()))
    }

    #[test]
    fn lists_every_measurement() {
        let text = format_text(&model(vec![0.1; 50]), &ReportConfig::default());
        assert!(text.contains("memo.wav"));
        assert!(text.contains("Audio Duration: 9.88 sec"));
        assert!(text.contains("Speaking Tempo: 97.50 BPM"));
        assert!(text.contains("Pause Ratio: 25.0%"));
        assert!(text.contains("Mild signs of slowing"));
        assert!(text.contains("50 frames"));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn empty_profile_prints_notice() {
        let text = format_text(&model(Vec::new()), &ReportConfig::default());
        assert!(text.contains(NO_ENERGY_NOTICE));
        assert!(!text.contains("Voice Energy Pattern"));
    }

    #[test]
    fn sections_can_be_disabled() {
        let config = ReportConfig {
            show_plot: false,
            show_disclaimer: false,
            ..ReportConfig::default()
        };
        let text = format_text(&model(vec![0.1; 50]), &config);
        assert!(!text.contains("Voice Energy Pattern"));
        assert!(!text.contains(DISCLAIMER));
    }

    #[test]
    fn lines_follow_report_order() {
        let text = format_text(&model(vec![0.1; 50]), &ReportConfig::default());
        assert!(text.ends_with(&format!("{DISCLAIMER}\n")));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "🧠 ManoVeda: Alzheimer’s Voice Screening");
        assert_eq!(lines[1], "🎙 memo.wav");
        let pos = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert!(pos("Cognitive Health Score") < pos("Audio Duration"));
        assert!(pos("Pause Ratio") < pos("Voice Energy Pattern"));
        assert!(pos("Voice Energy Pattern") < pos(DISCLAIMER));
    }

    #[test]
    fn sparkline_is_bounded_by_width() {
        let values: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let line = sparkline(&values, 40);
        assert!(line.chars().count() <= 40);
        assert_eq!(line.chars().last(), Some('█'));
        assert_eq!(sparkline(&[0.0; 10], 5), "▁▁▁▁▁");
    }
}
