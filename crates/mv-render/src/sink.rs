use std::io::Write;

use anyhow::{Context, Result};
use mv_core::config::ReportConfig;
use mv_core::report::RenderModel;
use mv_core::traits::ReportSink;
use ratatui::{TerminalOptions, Viewport};

use crate::text::format_text;
use crate::ui::{draw_report, report_height};

/// Draws the report inline in the current terminal, below the prompt.
pub struct TerminalSink {
    config: ReportConfig,
}

impl TerminalSink {
    #[must_use]
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

impl ReportSink for TerminalSink {
    fn present(&mut self, model: &RenderModel) -> Result<()> {
        let height = report_height(model, &self.config);
        let mut terminal = ratatui::try_init_with_options(TerminalOptions {
            viewport: Viewport::Inline(height),
        })
        .context("Impossible d'initialiser le terminal")?;

        let drawn = terminal.draw(|frame| draw_report(frame, model, &self.config));
        // Toujours restaurer, même si le rendu a échoué.
        ratatui::restore();
        drawn.context("Échec du rendu du rapport")?;
        println!();
        Ok(())
    }
}

/// Writes the plain text report to any writer.
pub struct TextSink<W: Write> {
    out: W,
    config: ReportConfig,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, config: ReportConfig) -> Self {
        Self { out, config }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn present(&mut self, model: &RenderModel) -> Result<()> {
        self.out.write_all(format_text(model, &self.config).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the render model as pretty JSON.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn present(&mut self, model: &RenderModel) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, model).context("Échec de la sérialisation JSON")?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_core::report::ScoreReport;

    fn model() -> RenderModel {
        let report = ScoreReport {
            score: 91,
            duration_secs: 3.0,
            tempo_bpm: 101.0,
            pause_ratio: 0.05,
            pause_threshold: 0.004,
            energy_profile: vec![0.02, 0.03, 0.0],
        };
        RenderModel::new(report, &ReportConfig::default())
    }

    #[test]
    fn text_sink_writes_report() {
        let mut sink = TextSink::new(Vec::new(), ReportConfig::default());
        sink.present(&model()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("91/100"));
        assert!(text.contains("no signs of cognitive decline"));
    }

    #[test]
    fn json_sink_emits_structured_report() {
        let mut sink = JsonSink::new(Vec::new());
        sink.present(&model()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(value["report"]["score"], 91);
        assert_eq!(value["band"], "healthy");
        assert_eq!(value["report"]["energy_profile"].as_array().unwrap().len(), 3);
        assert!(value["warning"].is_null());
    }
}
