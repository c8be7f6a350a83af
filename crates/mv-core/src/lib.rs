//! Shared types, traits, and configuration for manoveda.
//!
//! This crate holds everything the scorer, the presentation sinks and the
//! request handler agree on: the decoded waveform, the score report and its
//! band, the render model, and the TOML configuration.

pub mod config;
pub mod error;
pub mod report;
pub mod traits;
pub mod waveform;

pub use config::ScreeningConfig;
pub use error::CoreError;
pub use report::{Band, RenderModel, ScoreReport};
pub use waveform::Waveform;
