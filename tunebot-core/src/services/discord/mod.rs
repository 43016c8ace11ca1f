// File: src/services/discord/mod.rs

pub mod slashcommands;

use std::sync::Arc;

use twilight_cache_inmemory::InMemoryCache;
use twilight_http::Client as HttpClient;
use twilight_model::id::marker::ApplicationMarker;
use twilight_model::id::Id;

use crate::services::playback::PlaybackRegistry;

/// Everything a slash command handler needs: the REST client for replies,
/// the cache for voice-state lookups, and the playback registry.
pub struct CommandContext {
    pub http: Arc<HttpClient>,
    pub application_id: Id<ApplicationMarker>,
    pub cache: Arc<InMemoryCache>,
    pub registry: Arc<PlaybackRegistry>,
}
