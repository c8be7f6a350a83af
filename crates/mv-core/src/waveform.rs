use crate::error::CoreError;

/// Decoded mono audio, immutable once built.
///
/// Samples are `f32` amplitudes, nominally in [-1, 1].
///
/// # Example
/// ```
/// use mv_core::waveform::Waveform;
/// let wave = Waveform::new(vec![0.0; 22050], 22050).unwrap();
/// assert!((wave.duration_secs() - 1.0).abs() < f32::EPSILON);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap decoded samples.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSampleRate`] if `sample_rate` is 0.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, CoreError> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Mono samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Samples per second.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if no sample was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Consume the waveform, returning the raw samples and rate.
    #[must_use]
    pub fn into_parts(self) -> (Vec<f32>, u32) {
        (self.samples, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        assert_eq!(
            Waveform::new(vec![0.1, 0.2], 0),
            Err(CoreError::InvalidSampleRate { rate: 0 })
        );
    }

    #[test]
    fn duration_follows_rate() {
        let wave = Waveform::new(vec![0.0; 11025], 22050).unwrap();
        assert!((wave.duration_secs() - 0.5).abs() < f32::EPSILON);
        assert_eq!(wave.len(), 11025);
        assert!(!wave.is_empty());
    }
}
