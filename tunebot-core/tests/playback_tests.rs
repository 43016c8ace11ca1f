// tests/playback_tests.rs
//
// End-to-end playback scenarios driven through the registry, with a fake
// voice backend standing in for the real gateway.

use std::sync::Arc;

use tunebot_core::services::playback::music::{EnqueueOutcome, SkipOutcome};
use tunebot_core::services::playback::radio::StartOutcome;
use tunebot_core::services::playback::PlaybackRegistry;
use tunebot_core::test_utils::FakeVoice;
use tunebot_core::Error;

const GUILD: u64 = 501;
const CHANNEL: u64 = 901;
const RADIO_URL: &str = "https://radio.example/stream";

fn new_registry() -> (Arc<FakeVoice>, PlaybackRegistry) {
    let voice = Arc::new(FakeVoice::new());
    let registry = PlaybackRegistry::new(voice.clone(), RADIO_URL.to_string());
    (voice, registry)
}

#[tokio::test]
async fn test_play_while_playing_queues_behind_current() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;

    // 1) First track starts right away.
    let first = music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    assert_eq!(
        first,
        Some(EnqueueOutcome::Started("https://tracks.example/a.mp3".to_string()))
    );

    // 2) Second track queues behind it, playback untouched.
    let second = music.enqueue("https://tracks.example/b.mp3".to_string()).await;
    assert_eq!(second, Some(EnqueueOutcome::Queued));

    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/a.mp3"));
    assert_eq!(snapshot.upcoming, vec!["https://tracks.example/b.mp3".to_string()]);

    // 3) Only one voice connection was made for both commands.
    assert_eq!(voice.connect_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_queue_drains_in_fifo_order() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;

    music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    music.enqueue("https://tracks.example/b.mp3".to_string()).await;
    music.enqueue("https://tracks.example/c.mp3".to_string()).await;

    let output = voice.output_for(GUILD).unwrap();

    // Each finished track hands playback to the next in arrival order.
    output.finish_current();
    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/b.mp3"));

    output.finish_current();
    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/c.mp3"));
    assert!(snapshot.upcoming.is_empty());

    // Draining the last track leaves an idle session, not a dead one.
    output.finish_current();
    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current, None);
    assert!(registry.music(GUILD).is_some());

    let next = music.enqueue("https://tracks.example/d.mp3".to_string()).await;
    assert_eq!(
        next,
        Some(EnqueueOutcome::Started("https://tracks.example/d.mp3".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn test_skip_advances_to_next_track() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;

    music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    music.enqueue("https://tracks.example/b.mp3".to_string()).await;

    assert_eq!(music.skip().await, Some(SkipOutcome::Skipped));

    let output = voice.output_for(GUILD).unwrap();
    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/b.mp3"));
    assert_eq!(output.stop_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_music_disconnects_and_forgets_session() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;
    music.enqueue("https://tracks.example/a.mp3".to_string()).await;

    assert!(registry.stop_music(GUILD).await);

    let output = voice.output_for(GUILD).unwrap();
    assert!(output.is_disconnected());
    assert!(registry.music(GUILD).is_none());

    // A second stop has nothing left to act on.
    assert!(!registry.stop_music(GUILD).await);
    Ok(())
}

#[tokio::test]
async fn test_fresh_session_after_stop_reconnects() -> Result<(), Error> {
    let (voice, registry) = new_registry();

    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;
    music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    registry.stop_music(GUILD).await;

    // The next play command builds a clean session over a new connection.
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;
    let outcome = music.enqueue("https://tracks.example/b.mp3".to_string()).await;
    assert_eq!(
        outcome,
        Some(EnqueueOutcome::Started("https://tracks.example/b.mp3".to_string()))
    );
    assert_eq!(voice.connect_count(), 2);

    let snapshot = music.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/b.mp3"));
    assert!(snapshot.upcoming.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_guilds_play_independently() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let other_guild = GUILD + 1;

    let first = registry.get_or_create_music(GUILD, CHANNEL).await?;
    let second = registry.get_or_create_music(other_guild, CHANNEL).await?;

    first.enqueue("https://tracks.example/a.mp3".to_string()).await;
    second.enqueue("https://tracks.example/b.mp3".to_string()).await;

    // Finishing guild one's track leaves guild two untouched.
    voice.output_for(GUILD).unwrap().finish_current();

    let snapshot = first.queue().await.unwrap();
    assert_eq!(snapshot.current, None);
    let snapshot = second.queue().await.unwrap();
    assert_eq!(snapshot.current.as_deref(), Some("https://tracks.example/b.mp3"));

    assert_eq!(voice.connects(), vec![(GUILD, CHANNEL), (other_guild, CHANNEL)]);
    Ok(())
}

#[tokio::test]
async fn test_failed_connect_leaves_no_session() -> Result<(), Error> {
    let (voice, registry) = new_registry();

    voice.fail_next_connect();
    let result = registry.get_or_create_music(GUILD, CHANNEL).await;
    assert!(matches!(result, Err(Error::Voice(_))));
    assert!(registry.music(GUILD).is_none());

    // The guild is not poisoned; the next attempt connects normally.
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;
    let outcome = music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    assert_eq!(
        outcome,
        Some(EnqueueOutcome::Started("https://tracks.example/a.mp3".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn test_radio_plays_station_and_reports_already_playing() -> Result<(), Error> {
    let (voice, registry) = new_registry();

    let radio = registry.get_or_create_radio(GUILD, CHANNEL).await?;
    assert_eq!(radio.start().await, Some(StartOutcome::Started));

    let output = voice.output_for(GUILD).unwrap();
    assert_eq!(output.current_url().as_deref(), Some(RADIO_URL));

    // Asking again keeps the running stream.
    let radio = registry.get_or_create_radio(GUILD, CHANNEL).await?;
    assert_eq!(radio.start().await, Some(StartOutcome::AlreadyStreaming));
    assert_eq!(output.began().len(), 1);
    assert_eq!(voice.connect_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_music_refused_while_radio_holds_the_guild() -> Result<(), Error> {
    let (voice, registry) = new_registry();

    let radio = registry.get_or_create_radio(GUILD, CHANNEL).await?;
    assert_eq!(radio.start().await, Some(StartOutcome::Started));

    // The guild's only voice connection belongs to the radio session.
    let refused = registry.get_or_create_music(GUILD, CHANNEL).await;
    assert!(matches!(refused, Err(Error::Voice(_))));
    assert!(registry.music(GUILD).is_none());
    assert_eq!(voice.connect_count(), 1);

    // The radio was not disturbed by the refused request.
    assert_eq!(radio.start().await, Some(StartOutcome::AlreadyStreaming));

    // Stopping the radio frees the guild for a music session.
    assert!(registry.stop_radio(GUILD).await);
    let music = registry.get_or_create_music(GUILD, CHANNEL).await?;
    let outcome = music.enqueue("https://tracks.example/a.mp3".to_string()).await;
    assert_eq!(
        outcome,
        Some(EnqueueOutcome::Started("https://tracks.example/a.mp3".to_string()))
    );
    assert_eq!(voice.connect_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_stop_radio_disconnects_and_forgets_session() -> Result<(), Error> {
    let (voice, registry) = new_registry();

    let radio = registry.get_or_create_radio(GUILD, CHANNEL).await?;
    radio.start().await;

    assert!(registry.stop_radio(GUILD).await);
    assert!(voice.output_for(GUILD).unwrap().is_disconnected());
    assert!(registry.radio(GUILD).is_none());
    assert!(!registry.stop_radio(GUILD).await);
    Ok(())
}

#[tokio::test]
async fn test_stop_all_releases_every_guild() -> Result<(), Error> {
    let (voice, registry) = new_registry();
    let other_guild = GUILD + 1;

    let radio = registry.get_or_create_radio(GUILD, CHANNEL).await?;
    radio.start().await;
    let music = registry.get_or_create_music(other_guild, CHANNEL).await?;
    music.enqueue("https://tracks.example/a.mp3".to_string()).await;

    registry.stop_all().await;

    assert!(voice.output_for(GUILD).unwrap().is_disconnected());
    assert!(voice.output_for(other_guild).unwrap().is_disconnected());
    assert!(registry.radio(GUILD).is_none());
    assert!(registry.music(other_guild).is_none());
    Ok(())
}
