use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use songbird::shards::TwilightMap;
use songbird::Songbird;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    Shard,
    MessageSender,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;

use crate::config::BotConfig;
use crate::platforms::discord::voice::SongbirdVoice;
use crate::platforms::{ConnectionStatus, PlatformIntegration};
use crate::services::discord::slashcommands::{
    handle_interaction_create,
    register_global_slash_commands,
};
use crate::services::discord::CommandContext;
use crate::services::playback::PlaybackRegistry;
use crate::Error;

/// The shard runner:
///   - calls `shard.next_event(...)`
///   - feeds every event to the in-memory cache and the Songbird manager
///   - dispatches slash-command interactions.
async fn shard_runner(mut shard: Shard, ctx: Arc<CommandContext>, songbird: Arc<Songbird>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(event) => {
                ctx.cache.update(&event);
                songbird.process(&event).await;

                match &event {
                    Event::Ready(ready) => {
                        let data: &ReadyPayload = ready.as_ref();
                        info!(
                            "Shard {shard_id} => READY as {}#{} (ID={})",
                            data.user.name, data.user.discriminator, data.user.id
                        );
                    }
                    Event::InteractionCreate(inter) => {
                        let interaction = inter.clone();
                        let ctx_for_task = ctx.clone();

                        // Handle off the shard loop so a slow voice join never
                        // stalls event processing.
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_interaction_create(&ctx_for_task, &interaction).await
                            {
                                error!("Error handling interaction => {e:?}");
                            }
                        });
                    }
                    _ => {
                        trace!("Shard {shard_id} => unhandled event: {event:?}");
                    }
                }
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// The main DiscordPlatform struct. Everything created on `connect` lives in
/// an Option so a disconnected platform is just the config and nothing else.
pub struct DiscordPlatform {
    pub config: BotConfig,
    pub connection_status: ConnectionStatus,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    pub http: Option<Arc<HttpClient>>,
    pub cache: Option<Arc<InMemoryCache>>,
    pub songbird: Option<Arc<Songbird>>,
    pub registry: Option<Arc<PlaybackRegistry>>,
}

impl DiscordPlatform {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            connection_status: ConnectionStatus::Disconnected,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
            cache: None,
            songbird: None,
            registry: None,
        }
    }
}

/// Connect, register the slash commands, and spawn one runner per shard.
#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        // Prepare the Twilight client:
        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.config.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        self.http = Some(http_client.clone());

        // The application id addresses interaction responses; the bot user id
        // is what Songbird identifies voice sessions with.
        let application_id = http_client
            .current_user_application()
            .await
            .map_err(|e| Error::Platform(format!("Error fetching current application: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing current application: {e}")))?
            .id;
        let bot_user_id = http_client
            .current_user()
            .await
            .map_err(|e| Error::Platform(format!("Error fetching current user: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing current user: {e}")))?
            .id;

        // Prepare the in-memory cache:
        let cache = InMemoryCache::builder()
            .resource_types(
                ResourceType::GUILD | ResourceType::CHANNEL | ResourceType::VOICE_STATE,
            )
            .build();
        let cache = Arc::new(cache);
        self.cache = Some(cache.clone());

        // Gateway config:
        let config = Config::new(
            self.config.token.clone(),
            Intents::GUILDS | Intents::GUILD_VOICE_STATES,
        );

        // Create recommended shards:
        let shards: Vec<Shard> = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?
            .collect();

        // Songbird needs every shard's sender before the first voice join.
        let mut senders = HashMap::new();
        for shard in &shards {
            senders.insert(shard.id().number(), shard.sender());
        }
        let songbird = Arc::new(Songbird::twilight(
            Arc::new(TwilightMap::new(senders)),
            bot_user_id,
        ));
        self.songbird = Some(songbird.clone());

        let registry = Arc::new(PlaybackRegistry::new(
            Arc::new(SongbirdVoice::new(songbird.clone())),
            self.config.radio_url.clone(),
        ));
        self.registry = Some(registry.clone());

        let ctx = Arc::new(CommandContext {
            http: http_client.clone(),
            application_id,
            cache: cache.clone(),
            registry,
        });

        register_global_slash_commands(&http_client, application_id).await?;
        info!("(DiscordPlatform) Registered global slash commands.");

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let ctx_for_shard = ctx.clone();
            let songbird_for_shard = songbird.clone();

            // Spawn the shard runner:
            let handle = tokio::spawn(async move {
                shard_runner(shard, ctx_for_shard, songbird_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        // Leave every voice channel before the gateway goes away.
        if let Some(registry) = self.registry.take() {
            registry.stop_all().await;
        }

        // Gracefully close shards
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        // Wait for them
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();

        self.songbird = None;
        self.cache = None;
        self.http = None;

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}
