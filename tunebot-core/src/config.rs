// src/config.rs

use dotenv::dotenv;

use crate::Error;

/// Station streamed by `/play_radio` unless overridden.
pub const DEFAULT_RADIO_URL: &str = "https://online.hitfm.ua/HitFM_HD";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub radio_url: String,
}

impl BotConfig {
    pub fn new(token: String, radio_url: Option<String>) -> Result<Self, Error> {
        if token.trim().is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(Self {
            token,
            radio_url: radio_url.unwrap_or_else(|| DEFAULT_RADIO_URL.to_string()),
        })
    }

    /// Reads `DISCORD_TOKEN` and (optionally) `RADIO_STREAM_URL` from the
    /// environment. A `.env` file next to the binary is honored if present.
    pub fn from_env(radio_url_override: Option<String>) -> Result<Self, Error> {
        dotenv().ok();
        let token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| Error::Auth("DISCORD_TOKEN is not set".into()))?;
        let radio_url = radio_url_override.or_else(|| std::env::var("RADIO_STREAM_URL").ok());
        Self::new(token, radio_url)
    }
}
