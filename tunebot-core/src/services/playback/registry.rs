// File: src/services/playback/registry.rs

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::music::MusicHandle;
use super::output::VoiceBackend;
use super::radio::RadioHandle;
use crate::Error;

/// Per-guild playback sessions, at most one radio and one music session per
/// guild. Absence of an entry means no active session of that kind. Lifecycle
/// operations (create, stop) for one guild are serialized on a per-guild
/// lock; sessions for different guilds never contend.
pub struct PlaybackRegistry {
    voice: Arc<dyn VoiceBackend>,
    radio_url: String,
    radio: DashMap<u64, RadioHandle>,
    music: DashMap<u64, MusicHandle>,
    guild_locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl PlaybackRegistry {
    pub fn new(voice: Arc<dyn VoiceBackend>, radio_url: String) -> Self {
        Self {
            voice,
            radio_url,
            radio: DashMap::new(),
            music: DashMap::new(),
            guild_locks: DashMap::new(),
        }
    }

    fn guild_lock(&self, guild_id: u64) -> Arc<Mutex<()>> {
        self.guild_locks
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns the guild's radio session, connecting to `channel_id` and
    /// spawning a fresh one if none exists. On a failed connect no entry is
    /// inserted.
    pub async fn get_or_create_radio(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<RadioHandle, Error> {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.radio.get(&guild_id) {
            return Ok(existing.clone());
        }
        let output = self.voice.connect(guild_id, channel_id).await?;
        info!("(PlaybackRegistry) guild {guild_id} => new radio session");
        let handle = RadioHandle::spawn(guild_id, self.radio_url.clone(), output);
        self.radio.insert(guild_id, handle.clone());
        Ok(handle)
    }

    /// Returns the guild's music session, connecting to `channel_id` and
    /// spawning a fresh one if none exists. On a failed connect no entry is
    /// inserted.
    pub async fn get_or_create_music(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<MusicHandle, Error> {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.music.get(&guild_id) {
            return Ok(existing.clone());
        }
        let output = self.voice.connect(guild_id, channel_id).await?;
        info!("(PlaybackRegistry) guild {guild_id} => new music session");
        let handle = MusicHandle::spawn(guild_id, output);
        self.music.insert(guild_id, handle.clone());
        Ok(handle)
    }

    pub fn radio(&self, guild_id: u64) -> Option<RadioHandle> {
        self.radio.get(&guild_id).map(|h| h.clone())
    }

    pub fn music(&self, guild_id: u64) -> Option<MusicHandle> {
        self.music.get(&guild_id).map(|h| h.clone())
    }

    /// Stops the guild's radio session and drops its entry. Returns false
    /// when no session existed. The connection is released before the entry
    /// goes away.
    pub async fn stop_radio(&self, guild_id: u64) -> bool {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let Some(handle) = self.radio.get(&guild_id).map(|h| h.clone()) else {
            return false;
        };
        handle.stop().await;
        self.radio.remove(&guild_id);
        debug!("(PlaybackRegistry) guild {guild_id} => radio session removed");
        true
    }

    /// Stops the guild's music session and drops its entry. Returns false
    /// when no session existed.
    pub async fn stop_music(&self, guild_id: u64) -> bool {
        let lock = self.guild_lock(guild_id);
        let _guard = lock.lock().await;

        let Some(handle) = self.music.get(&guild_id).map(|h| h.clone()) else {
            return false;
        };
        handle.stop().await;
        self.music.remove(&guild_id);
        debug!("(PlaybackRegistry) guild {guild_id} => music session removed");
        true
    }

    /// Stops every active session. Used on shutdown so voice connections are
    /// released before the gateway closes.
    pub async fn stop_all(&self) {
        let radio_guilds: Vec<u64> = self.radio.iter().map(|entry| *entry.key()).collect();
        for guild_id in radio_guilds {
            self.stop_radio(guild_id).await;
        }
        let music_guilds: Vec<u64> = self.music.iter().map(|entry| *entry.key()).collect();
        for guild_id in music_guilds {
            self.stop_music(guild_id).await;
        }
    }
}
