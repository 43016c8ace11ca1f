// File: src/services/playback/mod.rs
//!
//! Playback sessions and the registry that owns them. Each guild gets at most
//! one radio session and one music session; both wrap an exclusively-owned
//! voice connection obtained through [`output::VoiceBackend`].

pub mod music;
pub mod output;
pub mod radio;
pub mod registry;

pub use registry::PlaybackRegistry;
