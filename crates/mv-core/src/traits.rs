use std::path::Path;

use crate::report::RenderModel;
use crate::waveform::Waveform;

/// Décode un fichier audio en un `Waveform` mono.
///
/// Implémenté par : `SymphoniaLoader`.
///
/// # Example
/// ```
/// use mv_core::traits::AudioLoader;
/// use mv_core::waveform::Waveform;
/// use std::path::Path;
///
/// struct SilenceLoader;
/// impl AudioLoader for SilenceLoader {
///     fn load(&self, _path: &Path) -> anyhow::Result<Waveform> {
///         Ok(Waveform::new(vec![0.0; 22050], 22050)?)
///     }
/// }
/// ```
pub trait AudioLoader {
    /// Decode `path` into mono samples.
    ///
    /// # Errors
    /// Any failure (missing file, unsupported container, corrupt data) is
    /// returned as a single opaque error; callers only need to know that
    /// extraction failed.
    fn load(&self, path: &Path) -> anyhow::Result<Waveform>;
}

/// Affiche un `RenderModel` à l'utilisateur.
///
/// Implémenté par : `TerminalSink`, `TextSink`, `JsonSink`.
///
/// # Example
/// ```
/// use mv_core::traits::ReportSink;
/// use mv_core::report::RenderModel;
///
/// struct NullSink;
/// impl ReportSink for NullSink {
///     fn present(&mut self, _model: &RenderModel) -> anyhow::Result<()> { Ok(()) }
/// }
/// ```
pub trait ReportSink {
    /// Render one result.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn present(&mut self, model: &RenderModel) -> anyhow::Result<()>;
}
