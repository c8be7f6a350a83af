// Presentation sinks for manoveda reports: terminal, plain text, JSON.

pub mod sink;
pub mod text;
pub mod ui;

pub use sink::{JsonSink, TerminalSink, TextSink};
