// src/lib.rs

pub mod config;
pub mod error;
pub mod platforms;
pub mod services;
pub mod test_utils;

pub use error::Error;
