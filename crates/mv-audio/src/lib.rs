// Audio decoding, feature extraction, and scoring for manoveda.

pub mod decode;
pub mod energy;
pub mod error;
pub mod fft;
pub mod loader;
pub mod mel;
pub mod onset;
pub mod resample;
pub mod scorer;
pub mod tempo;

pub use error::AudioError;
pub use loader::SymphoniaLoader;
pub use scorer::{VoiceScorer, analyze};
