use std::io::Write;
use std::path::Path;

use mv_audio::VoiceScorer;
use mv_core::config::ReportConfig;
use mv_core::report::RenderModel;
use mv_core::traits::AudioLoader;

/// Extension used for the temp file when the upload name has none.
const DEFAULT_SUFFIX: &str = ".wav";

/// Turn one upload into a render model: bytes → temp file → decode → score.
///
/// Never fails: an empty upload, an I/O error or an undecodable file all
/// give a zero-score model carrying a warning. The temp file is removed
/// before returning, whatever the outcome.
pub fn handle_upload<L: AudioLoader>(
    bytes: &[u8],
    source_name: Option<&str>,
    loader: &L,
    scorer: &VoiceScorer,
    report_config: &ReportConfig,
) -> RenderModel {
    let source = source_name.map(String::from);
    if bytes.is_empty() {
        log::warn!("Upload vide, aucune analyse.");
        return RenderModel::degraded("⚠ Error: empty upload", report_config).with_source(source);
    }

    let suffix = source_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map_or_else(|| DEFAULT_SUFFIX.to_string(), |e| format!(".{e}"));

    // Le fichier temporaire est supprimé au drop, sur tous les chemins.
    let mut tmp = match tempfile::Builder::new()
        .prefix("manoveda-")
        .suffix(&suffix)
        .tempfile()
    {
        Ok(tmp) => tmp,
        Err(e) => {
            log::warn!("Fichier temporaire indisponible : {e}");
            return RenderModel::degraded(format!("⚠ Error: {e}"), report_config)
                .with_source(source);
        }
    };
    if let Err(e) = tmp.write_all(bytes).and_then(|()| tmp.flush()) {
        log::warn!("Écriture du fichier temporaire impossible : {e}");
        return RenderModel::degraded(format!("⚠ Error: {e}"), report_config).with_source(source);
    }
    log::debug!("Upload ({} octets) écrit dans {}", bytes.len(), tmp.path().display());

    match loader.load(tmp.path()) {
        Ok(waveform) => {
            let report = scorer.analyze_waveform(&waveform);
            log::info!(
                "Score {} ({:.2}s, {:.1} BPM, pauses {:.1}%)",
                report.score,
                report.duration_secs,
                report.tempo_bpm,
                report.pause_ratio * 100.0
            );
            RenderModel::new(report, report_config).with_source(source)
        }
        Err(e) => {
            log::warn!("Décodage impossible : {e:#}");
            RenderModel::degraded(format!("⚠ Error: {e:#}"), report_config).with_source(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_audio::SymphoniaLoader;
    use mv_core::Waveform;
    use mv_core::report::Band;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::PathBuf;

    /// Records the path it was handed, then delegates.
    struct SpyLoader {
        seen: RefCell<Option<PathBuf>>,
        inner: SymphoniaLoader,
    }

    impl SpyLoader {
        fn new() -> Self {
            Self {
                seen: RefCell::new(None),
                inner: SymphoniaLoader::default(),
            }
        }
    }

    impl AudioLoader for SpyLoader {
        fn load(&self, path: &Path) -> anyhow::Result<Waveform> {
            assert!(path.exists());
            *self.seen.borrow_mut() = Some(path.to_path_buf());
            self.inner.load(path)
        }
    }

    fn wav_bytes(sample_rate: u32, secs: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let len = (f64::from(sample_rate) * f64::from(secs)) as usize;
        for i in 0..len {
            // Syllabe toutes les 0.6 s : attaque franche, décroissance exponentielle.
            let t = i as f64 / f64::from(sample_rate);
            let amp = 0.25 + 0.75 * (-(t % 0.6) / 0.12).exp();
            let s = 0.8 * amp * (2.0 * std::f64::consts::PI * 220.0 * t).sin();
            writer.write_sample((s * f64::from(i16::MAX)) as i16).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn non_audio_upload_degrades_with_warning() {
        let loader = SpyLoader::new();
        let model = handle_upload(
            b"definitely not audio",
            Some("notes.txt"),
            &loader,
            &VoiceScorer::default(),
            &ReportConfig::default(),
        );
        assert_eq!(model.report.score, 0);
        assert_eq!(model.band, Band::Decline);
        assert!(model.report.energy_profile.is_empty());
        assert!(model.warning.as_deref().unwrap().starts_with("⚠ Error:"));
        assert_eq!(model.source_name.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn temp_file_is_removed_after_handling() {
        let loader = SpyLoader::new();
        let _ = handle_upload(
            b"garbage",
            None,
            &loader,
            &VoiceScorer::default(),
            &ReportConfig::default(),
        );
        let path = loader.seen.borrow().clone().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert!(!path.exists());
    }

    #[test]
    fn valid_recording_is_scored() {
        let loader = SpyLoader::new();
        let model = handle_upload(
            &wav_bytes(16000, 6.0),
            Some("memo.wav"),
            &loader,
            &VoiceScorer::default(),
            &ReportConfig::default(),
        );
        assert!(model.warning.is_none());
        assert!((model.report.duration_secs - 6.0).abs() < 0.01);
        assert!(model.report.has_energy());
        assert!((model.report.tempo_bpm - 100.0).abs() < 10.0, "{}", model.report.tempo_bpm);
        assert!(!loader.seen.borrow().as_ref().unwrap().exists());
    }

    #[test]
    fn empty_upload_skips_the_loader() {
        let loader = SpyLoader::new();
        let model = handle_upload(
            &[],
            None,
            &loader,
            &VoiceScorer::default(),
            &ReportConfig::default(),
        );
        assert_eq!(model.report.score, 0);
        assert!(model.warning.as_deref().unwrap().contains("empty upload"));
        assert!(loader.seen.borrow().is_none());
    }
}
