// File: src/platforms/discord/mod.rs

pub mod runtime;
pub mod voice;
