//! voice.rs
//!
//! Songbird-backed voice output. Owns the per-guild `Call` handles and plays
//! audio streamed from plain HTTP(S) URLs into the voice connection.

use std::sync::Arc;

use async_trait::async_trait;
use songbird::error::JoinError;
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::HttpRequest;
use songbird::tracks::TrackHandle;
use songbird::{Call, Songbird};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::debug;
use twilight_model::id::marker::{ChannelMarker, GuildMarker};
use twilight_model::id::Id;
use uuid::Uuid;

use crate::services::playback::output::{AudioOutput, RenderControl, RenderEnded, VoiceBackend};
use crate::Error;

/// Connects guilds to voice channels through a shared [`Songbird`] manager.
pub struct SongbirdVoice {
    manager: Arc<Songbird>,
    client: reqwest::Client,
}

impl SongbirdVoice {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self {
            manager,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VoiceBackend for SongbirdVoice {
    async fn connect(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Arc<dyn AudioOutput>, Error> {
        let guild = Id::<GuildMarker>::new_checked(guild_id)
            .ok_or_else(|| Error::Voice(format!("invalid guild id {guild_id}")))?;
        let channel = Id::<ChannelMarker>::new_checked(channel_id)
            .ok_or_else(|| Error::Voice(format!("invalid channel id {channel_id}")))?;

        // One voice connection per guild; a radio session and a music session
        // cannot share it.
        if self.manager.get(guild).is_some() {
            return Err(Error::Voice(format!(
                "guild {guild_id} already has an active voice connection"
            )));
        }

        match self.manager.join(guild, channel).await {
            Ok(call) => {
                debug!("(SongbirdVoice) guild {guild_id} => joined voice channel {channel_id}");
                Ok(Arc::new(SongbirdOutput {
                    guild,
                    manager: Arc::clone(&self.manager),
                    call,
                    client: self.client.clone(),
                }))
            }
            Err(e) => {
                // A failed join can leave a half-registered call behind.
                let _ = self.manager.remove(guild).await;
                Err(Error::Voice(format!(
                    "failed to join voice channel {channel_id} in guild {guild_id}: {e}"
                )))
            }
        }
    }
}

/// One live voice connection. Handed to the playback sessions, which drive it
/// without knowing anything about Songbird.
struct SongbirdOutput {
    guild: Id<GuildMarker>,
    manager: Arc<Songbird>,
    call: Arc<Mutex<Call>>,
    client: reqwest::Client,
}

#[async_trait]
impl AudioOutput for SongbirdOutput {
    async fn begin(
        &self,
        url: &str,
        play_id: Uuid,
        on_end: UnboundedSender<RenderEnded>,
    ) -> Result<Box<dyn RenderControl>, Error> {
        let source = HttpRequest::new(self.client.clone(), url.to_string());
        let handle = self.call.lock().await.play_input(source.into());

        // A track that fails to decode raises Error, then End. The session
        // drops the duplicate by play id.
        let notify = RenderEndNotifier { play_id, on_end };
        handle
            .add_event(Event::Track(TrackEvent::End), notify.clone())
            .map_err(|e| Error::Voice(format!("failed to attach track end handler: {e}")))?;
        handle
            .add_event(Event::Track(TrackEvent::Error), notify)
            .map_err(|e| Error::Voice(format!("failed to attach track error handler: {e}")))?;

        Ok(Box::new(SongbirdRender { handle }))
    }

    async fn disconnect(&self) -> Result<(), Error> {
        match self.manager.remove(self.guild).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(Error::Voice(format!(
                "failed to leave voice in guild {}: {e}",
                self.guild
            ))),
        }
    }
}

#[derive(Clone)]
struct RenderEndNotifier {
    play_id: Uuid,
    on_end: UnboundedSender<RenderEnded>,
}

#[async_trait]
impl EventHandler for RenderEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let _ = self.on_end.send(RenderEnded {
            play_id: self.play_id,
        });
        // One notification per handler is enough.
        Some(Event::Cancel)
    }
}

struct SongbirdRender {
    handle: TrackHandle,
}

impl RenderControl for SongbirdRender {
    fn stop(&self) {
        // Stopping a track that already ended is harmless.
        let _ = self.handle.stop();
    }
}
