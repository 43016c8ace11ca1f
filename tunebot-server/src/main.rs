use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use tunebot_core::config::BotConfig;
use tunebot_core::platforms::discord::runtime::DiscordPlatform;
use tunebot_core::platforms::PlatformIntegration;
use tunebot_core::Error;

#[derive(Parser, Debug, Clone)]
#[command(name = "tunebot")]
#[command(author, version, about = "TuneBot - radio and music queue bot for Discord voice channels")]
struct Args {
    /// Radio station stream URL; overrides RADIO_STREAM_URL.
    #[arg(long)]
    radio_url: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("tunebot_core=info".parse().unwrap_or_default())
        .add_directive("tunebot_server=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();
    info!("TuneBot starting.");

    if let Err(e) = run_bot(args).await {
        error!("Bot error: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_bot(args: Args) -> Result<(), Error> {
    // 1) Load configuration from the environment plus CLI overrides.
    let config = BotConfig::from_env(args.radio_url)?;
    info!("Using radio station: {}", config.radio_url);

    // 2) Connect to the Discord gateway.
    let mut platform = DiscordPlatform::new(config);
    platform.connect().await?;
    info!("Connected to Discord. Press Ctrl-C to shut down.");

    // 3) Wait for Ctrl-C.
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {:?}", e);
    }

    // 4) Leave every voice channel and close the gateway.
    info!("Ctrl-C detected; shutting down...");
    platform.disconnect().await?;

    Ok(())
}
