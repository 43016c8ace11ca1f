// File: src/services/mod.rs

pub mod discord;
pub mod playback;
