// File: src/services/playback/output.rs

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::Error;

/// Sent on a session's end channel when a render finishes, for any reason:
/// natural end of stream, a forced stop, or a driver error. Carries the
/// render's id so sessions can discard notifications for renders they have
/// already replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEnded {
    pub play_id: Uuid,
}

/// Joins voice channels and hands out the audio output bound to the new
/// connection. One connection per guild; a second connect for the same guild
/// fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    async fn connect(&self, guild_id: u64, channel_id: u64)
        -> Result<Arc<dyn AudioOutput>, Error>;
}

/// A single guild's voice connection, as seen by a playback session.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Starts decoding `url` into the connection. The returned control stops
    /// the render early; `on_end` receives the end notification either way.
    async fn begin(
        &self,
        url: &str,
        play_id: Uuid,
        on_end: UnboundedSender<RenderEnded>,
    ) -> Result<Box<dyn RenderControl>, Error>;

    /// Leaves the voice channel, ending any active render.
    async fn disconnect(&self) -> Result<(), Error>;
}

pub trait RenderControl: Send + Sync {
    fn stop(&self);
}
