use std::io::{IsTerminal, Read};

use anyhow::{Context, Result};
use clap::Parser;
use mv_audio::{SymphoniaLoader, VoiceScorer};
use mv_core::config::ScreeningConfig;
use mv_core::traits::ReportSink;
use mv_render::{JsonSink, TerminalSink, TextSink};

pub mod cli;
pub mod handler;

use cli::OutputFormat;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    if let Some(rate) = cli.sample_rate {
        config.loader.target_sample_rate = rate;
        config.clamp_all();
    }

    // 4. Lire l'upload
    let bytes = read_input(&cli)?;
    let source_name = cli.source_name();

    // 5. Décoder, analyser
    let loader = SymphoniaLoader::from_config(&config.loader);
    let scorer = VoiceScorer::from_config(&config);
    let model = handler::handle_upload(
        &bytes,
        source_name.as_deref(),
        &loader,
        &scorer,
        &config.report,
    );

    // 6. Présenter
    let mut sink = select_sink(cli.format, &config);
    sink.present(&model)
}

/// Resolve config: a missing file falls back to defaults.
fn resolve_config(cli: &cli::Cli) -> Result<ScreeningConfig> {
    if cli.config.exists() {
        mv_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(ScreeningConfig::default())
    }
}

fn read_input(cli: &cli::Cli) -> Result<Vec<u8>> {
    if cli.reads_stdin() {
        let mut bytes = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Lecture de stdin impossible")?;
        Ok(bytes)
    } else {
        std::fs::read(&cli.input).with_context(|| format!("Lecture impossible : {}", cli.input))
    }
}

/// The TUI needs a terminal; redirected stdout falls back to text.
fn select_sink(format: OutputFormat, config: &ScreeningConfig) -> Box<dyn ReportSink> {
    let report = config.report.clone();
    match format {
        OutputFormat::Json => Box::new(JsonSink::new(std::io::stdout())),
        OutputFormat::Text => Box::new(TextSink::new(std::io::stdout(), report)),
        OutputFormat::Tui if std::io::stdout().is_terminal() => Box::new(TerminalSink::new(report)),
        OutputFormat::Tui => {
            log::info!("stdout n'est pas un terminal, sortie texte.");
            Box::new(TextSink::new(std::io::stdout(), report))
        }
    }
}
