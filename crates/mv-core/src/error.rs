use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// A waveform was built with a zero sample rate.
    #[error("Taux d'échantillonnage invalide : {rate} Hz")]
    InvalidSampleRate {
        /// The rejected rate.
        rate: u32,
    },
}
