use mv_core::config::ReportConfig;
use mv_core::report::{Band, DISCLAIMER, NO_ENERGY_NOTICE, RenderModel};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};

/// Report title.
pub const TITLE: &str = " 🧠 ManoVeda: Alzheimer’s Voice Screening ";

const ENERGY_COLOR: Color = Color::Rgb(0x6a, 0x5a, 0xcd);
const SCORE_COLOR: Color = Color::Rgb(0x29, 0x80, 0xb9);
const DISCLAIMER_ROWS: u16 = 2;

/// Band → display color.
#[must_use]
pub fn band_color(band: Band) -> Color {
    match band {
        Band::Healthy => Color::Green,
        Band::Mild => Color::Yellow,
        Band::Decline => Color::Red,
    }
}

/// Rows needed to draw `model` with [`draw_report`].
///
/// # Example
/// ```
/// use mv_core::config::ReportConfig;
/// use mv_core::report::RenderModel;
/// use mv_render::ui::report_height;
///
/// let config = ReportConfig { show_disclaimer: false, ..ReportConfig::default() };
/// let model = RenderModel::degraded("bad upload", &config);
/// // warning + 7 summary lines + borders, then the no-energy notice
/// assert_eq!(report_height(&model, &config), 11);
/// ```
#[must_use]
pub fn report_height(model: &RenderModel, config: &ReportConfig) -> u16 {
    let [summary, energy, disclaimer] = section_heights(model, config);
    summary + energy + disclaimer
}

fn section_heights(model: &RenderModel, config: &ReportConfig) -> [u16; 3] {
    let summary = summary_lines(model).len() as u16 + 2;
    let energy = if !model.report.has_energy() {
        1
    } else if config.show_plot {
        config.plot_height
    } else {
        0
    };
    let disclaimer = if config.show_disclaimer {
        DISCLAIMER_ROWS
    } else {
        0
    };
    [summary, energy, disclaimer]
}

/// Draw the full report: summary card, energy chart, disclaimer.
pub fn draw_report(frame: &mut Frame, model: &RenderModel, config: &ReportConfig) {
    let [summary_h, energy_h, disclaimer_h] = section_heights(model, config);
    let chunks = Layout::vertical([
        Constraint::Length(summary_h),
        Constraint::Length(energy_h),
        Constraint::Length(disclaimer_h),
    ])
    .split(frame.area());

    draw_summary(frame, chunks[0], model);

    if !model.report.has_energy() {
        let notice = Paragraph::new(Line::from(Span::styled(
            format!("ℹ {NO_ENERGY_NOTICE}"),
            Style::default().fg(Color::Cyan),
        )));
        frame.render_widget(notice, chunks[1]);
    } else if config.show_plot {
        draw_energy_chart(frame, chunks[1], model);
    }

    if config.show_disclaimer {
        let disclaimer = Paragraph::new(DISCLAIMER)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .wrap(Wrap { trim: true });
        frame.render_widget(disclaimer, chunks[2]);
    }
}

fn summary_lines(model: &RenderModel) -> Vec<Line<'static>> {
    let report = &model.report;
    let mut lines = Vec::with_capacity(10);

    if let Some(name) = &model.source_name {
        lines.push(Line::from(Span::styled(
            format!("🎙 {name}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(warning) = &model.warning {
        lines.push(Line::from(Span::styled(
            warning.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled(
            "Cognitive Health Score: ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}/100", report.score),
            Style::default().fg(SCORE_COLOR).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        " • Audio Duration: {:.2} sec",
        report.duration_secs
    )));
    lines.push(Line::from(format!(
        " • Speaking Tempo: {:.2} BPM",
        report.tempo_bpm
    )));
    lines.push(Line::from(format!(
        " • Pause Ratio: {:.1}%",
        report.pause_ratio * 100.0
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        model.band.message(),
        Style::default().fg(band_color(model.band)),
    )));
    lines
}

fn draw_summary(frame: &mut Frame, area: Rect, model: &RenderModel) {
    let summary = Paragraph::new(summary_lines(model)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(TITLE)
            .title_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(summary, area);
}

/// RMS energy per frame, with the pause threshold as a horizontal line.
fn draw_energy_chart(frame: &mut Frame, area: Rect, model: &RenderModel) {
    let profile = &model.report.energy_profile;
    let points: Vec<(f64, f64)> = profile
        .iter()
        .enumerate()
        .map(|(i, &e)| (i as f64, f64::from(e)))
        .collect();

    let x_max = (profile.len().saturating_sub(1)).max(1) as f64;
    let threshold = f64::from(model.report.pause_threshold);
    let threshold_line = [(0.0, threshold), (x_max, threshold)];

    let y_max = profile
        .iter()
        .copied()
        .fold(0.0f32, f32::max)
        .max(model.report.pause_threshold);
    let y_max = if y_max > 0.0 { f64::from(y_max) * 1.05 } else { 1.0 };

    let datasets = vec![
        Dataset::default()
            .name("RMS Energy")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(ENERGY_COLOR))
            .data(&points),
        Dataset::default()
            .name("Pause Threshold")
            .marker(Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&threshold_line),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 📈 Voice Energy Pattern "),
        )
        .x_axis(
            Axis::default()
                .title("Frame Index")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(vec!["0".to_string(), format!("{}", profile.len() - 1)]),
        )
        .y_axis(
            Axis::default()
                .title("Energy Level")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max])
                .labels(vec!["0".to_string(), format!("{y_max:.3}")]),
        );

    frame.render_widget(chart, area);
}
