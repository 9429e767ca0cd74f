//! Subtrad - Batch Subtitle Translation
//!
//! Extracts the best subtitle track from Matroska files with mkvtoolnix,
//! translates it block by block through an LLM chat completion endpoint
//! (optionally reconciled with a rule-based MT engine) and writes the
//! translated subtitles, optionally muxed into a new container.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod selector;
pub mod subtitle;
pub mod translate;
pub mod workflow;
