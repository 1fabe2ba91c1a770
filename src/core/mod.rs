//! The Command & Threat Pipeline and the primitives it shares with the
//! plugins.
//!
//! Everything under `core` except `config` is free of I/O: a turn's result
//! can always be computed from its text and the conversation state alone.

pub mod collaborators;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod lexicon;
pub mod output;
pub mod parser;
pub mod persona;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod threat;
pub mod time;
pub mod tui;
