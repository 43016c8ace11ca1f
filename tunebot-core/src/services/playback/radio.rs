// File: src/services/playback/radio.rs
//!
//! Per-guild radio session: one continuous station stream, no queue. When the
//! stream drops the session goes back to idle and waits for an explicit new
//! start; it never restarts on its own.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::output::{AudioOutput, RenderControl, RenderEnded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyStreaming,
    Failed,
}

enum RadioCommand {
    Start { reply: oneshot::Sender<StartOutcome> },
    Stop { reply: oneshot::Sender<()> },
}

/// Cloneable mailbox for one guild's radio session.
#[derive(Clone)]
pub struct RadioHandle {
    tx: mpsc::UnboundedSender<RadioCommand>,
}

impl RadioHandle {
    pub fn spawn(guild_id: u64, stream_url: String, output: Arc<dyn AudioOutput>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (end_tx, end_rx) = mpsc::unbounded_channel();
        let session = RadioSession {
            guild_id,
            stream_url,
            output,
            streaming: None,
            end_tx,
        };
        tokio::spawn(run_session(session, rx, end_rx));
        Self { tx }
    }

    pub async fn start(&self) -> Option<StartOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RadioCommand::Start { reply }).ok()?;
        rx.await.ok()
    }

    /// Releases the voice connection and ends the session task.
    pub async fn stop(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(RadioCommand::Stop { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

struct RadioSession {
    guild_id: u64,
    stream_url: String,
    output: Arc<dyn AudioOutput>,
    streaming: Option<LiveStream>,
    end_tx: mpsc::UnboundedSender<RenderEnded>,
}

struct LiveStream {
    play_id: Uuid,
    control: Box<dyn RenderControl>,
}

async fn run_session(
    mut session: RadioSession,
    mut commands: mpsc::UnboundedReceiver<RadioCommand>,
    mut ended: mpsc::UnboundedReceiver<RenderEnded>,
) {
    loop {
        // End notifications are drained before commands, same as the music
        // session, so a start never races a stream that just dropped.
        tokio::select! {
            biased;

            Some(end) = ended.recv() => {
                session.on_render_ended(end);
            }
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    RadioCommand::Start { reply } => {
                        let _ = reply.send(session.start().await);
                    }
                    RadioCommand::Stop { reply } => {
                        session.release().await;
                        let _ = reply.send(());
                        break;
                    }
                }
            }
        }
    }
    debug!("(RadioSession) guild {} => session task ended", session.guild_id);
}

impl RadioSession {
    async fn start(&mut self) -> StartOutcome {
        if self.streaming.is_some() {
            return StartOutcome::AlreadyStreaming;
        }
        let play_id = Uuid::new_v4();
        match self
            .output
            .begin(&self.stream_url, play_id, self.end_tx.clone())
            .await
        {
            Ok(control) => {
                info!(
                    "(RadioSession) guild {} => streaming '{}'",
                    self.guild_id, self.stream_url
                );
                self.streaming = Some(LiveStream { play_id, control });
                StartOutcome::Started
            }
            Err(e) => {
                warn!(
                    "(RadioSession) guild {} => could not start stream: {e:?}",
                    self.guild_id
                );
                StartOutcome::Failed
            }
        }
    }

    fn on_render_ended(&mut self, end: RenderEnded) {
        match &self.streaming {
            Some(live) if live.play_id == end.play_id => {
                info!(
                    "(RadioSession) guild {} => stream ended; back to idle",
                    self.guild_id
                );
                self.streaming = None;
            }
            _ => {
                debug!(
                    "(RadioSession) guild {} => ignoring stale end event {}",
                    self.guild_id, end.play_id
                );
            }
        }
    }

    async fn release(&mut self) {
        if let Some(live) = self.streaming.take() {
            live.control.stop();
        }
        if let Err(e) = self.output.disconnect().await {
            warn!(
                "(RadioSession) guild {} => error releasing connection: {e:?}",
                self.guild_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeOutput;
    use std::time::Duration;
    use tokio::time::sleep;

    const STATION: &str = "https://radio.example/live";

    fn spawn_with_fake() -> (RadioHandle, Arc<FakeOutput>) {
        let output = Arc::new(FakeOutput::default());
        let handle = RadioHandle::spawn(1, STATION.to_string(), output.clone());
        (handle, output)
    }

    #[tokio::test]
    async fn test_start_begins_the_station_stream() {
        let (handle, output) = spawn_with_fake();

        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::Started));
        assert_eq!(output.began(), vec![STATION.to_string()]);
    }

    #[tokio::test]
    async fn test_second_start_reports_already_streaming() {
        let (handle, output) = spawn_with_fake();

        handle.start().await;
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::AlreadyStreaming));
        // The live stream was not restarted.
        assert_eq!(output.began().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_end_returns_to_idle_without_restart() {
        let (handle, output) = spawn_with_fake();

        handle.start().await;
        output.finish_current();

        // No restart happens on its own.
        sleep(Duration::from_millis(50)).await;
        assert_eq!(output.began().len(), 1);

        // An explicit start brings the stream back.
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::Started));
        assert_eq!(output.began().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_stream_start_is_reported() {
        let (handle, output) = spawn_with_fake();

        output.fail_url(STATION);
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::Failed));

        // The session stays usable for another attempt.
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::Started));
        assert_eq!(output.began().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_end_event_does_not_stop_the_stream() {
        let (handle, output) = spawn_with_fake();

        handle.start().await;
        output.finish_current();
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::Started));

        // Replay the first stream's end event; the new stream keeps going.
        output.refire_last_end();
        let outcome = handle.start().await;
        assert_eq!(outcome, Some(StartOutcome::AlreadyStreaming));
        assert_eq!(output.began().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_releases_the_connection() {
        let (handle, output) = spawn_with_fake();

        handle.start().await;
        handle.stop().await;

        assert!(output.is_disconnected());
        assert_eq!(handle.start().await, None);
    }
}
