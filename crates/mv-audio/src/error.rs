use mv_core::CoreError;
use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The file could not be opened.
    #[error("Impossible d'ouvrir {path} : {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Unsupported audio format.
    #[error("Format audio non supporté : {0}")]
    UnsupportedFormat(String),

    /// The container has no decodable audio track.
    #[error("Aucune piste audio trouvée")]
    NoTrack,

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// Sample rate conversion failed.
    #[error("Erreur de rééchantillonnage : {0}")]
    Resample(String),

    /// Decoded data did not form a valid waveform.
    #[error(transparent)]
    Waveform(#[from] CoreError),
}
