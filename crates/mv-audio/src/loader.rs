use std::path::Path;

use anyhow::Context;
use mv_core::config::LoaderConfig;
use mv_core::traits::AudioLoader;
use mv_core::Waveform;

use crate::decode::decode_file;
use crate::resample::resample;

/// Symphonia-backed [`AudioLoader`]: decode, downmix to mono, resample.
///
/// # Example
/// ```
/// use mv_audio::loader::SymphoniaLoader;
/// let loader = SymphoniaLoader::new(Some(22050));
/// assert_eq!(loader.target_rate(), Some(22050));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SymphoniaLoader {
    target_rate: Option<u32>,
}

impl SymphoniaLoader {
    /// Loader resampling to `target_rate`, or keeping the native rate for `None`.
    #[must_use]
    pub fn new(target_rate: Option<u32>) -> Self {
        Self { target_rate }
    }

    /// Loader configured from the `[loader]` section.
    #[must_use]
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.target_rate())
    }

    /// Rate decoded audio is converted to.
    #[must_use]
    pub fn target_rate(&self) -> Option<u32> {
        self.target_rate
    }

    /// Bring a decoded waveform to the target rate.
    ///
    /// # Errors
    /// Returns an error if the resampler cannot be built for this rate pair.
    pub fn conform(&self, waveform: Waveform) -> anyhow::Result<Waveform> {
        match self.target_rate {
            Some(rate) if rate != waveform.sample_rate() => {
                let (samples, native) = waveform.into_parts();
                Ok(Waveform::new(resample(&samples, native, rate)?, rate)?)
            }
            _ => Ok(waveform),
        }
    }
}

impl Default for SymphoniaLoader {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl AudioLoader for SymphoniaLoader {
    fn load(&self, path: &Path) -> anyhow::Result<Waveform> {
        let waveform = decode_file(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        self.conform(waveform)
    }
}
