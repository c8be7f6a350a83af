use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// ManoVeda — heuristic voice screening from a speech recording.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enregistrement à analyser (WAV, FLAC, MP3, OGG…), ou "-" pour lire stdin.
    pub input: String,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Format de sortie du rapport.
    #[arg(long, value_enum, default_value_t = OutputFormat::Tui)]
    pub format: OutputFormat,

    /// Fréquence cible du chargeur en Hz (0 = fréquence native).
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rapport inline dans le terminal, avec graphe d'énergie.
    Tui,
    /// Texte brut.
    Text,
    /// JSON structuré.
    Json,
}

impl Cli {
    /// `true` if the upload comes from stdin.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.input == "-"
    }

    /// Display name of the upload: the file name, or `None` for stdin.
    #[must_use]
    pub fn source_name(&self) -> Option<String> {
        if self.reads_stdin() {
            return None;
        }
        std::path::Path::new(&self.input)
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["manoveda", "memo.wav"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Tui);
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert_eq!(cli.sample_rate, None);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn flags_override() {
        let cli = Cli::try_parse_from([
            "manoveda",
            "-c",
            "custom.toml",
            "--format",
            "json",
            "--sample-rate",
            "0",
            "recordings/day1.wav",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.sample_rate, Some(0));
        assert_eq!(cli.source_name().as_deref(), Some("day1.wav"));
    }

    #[test]
    fn stdin_has_no_source_name() {
        let cli = Cli::try_parse_from(["manoveda", "-"]).unwrap();
        assert!(cli.reads_stdin());
        assert_eq!(cli.source_name(), None);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["manoveda"]).is_err());
    }
}
