// File: src/services/playback/music.rs
//!
//! Per-guild music session. The session is a spawned task owning the queue
//! and the active render; a cloneable [`MusicHandle`] is the only way in.
//! Track sequencing is driven by [`RenderEnded`] messages arriving on the
//! session's own end channel, so every state change happens on one task.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::output::{AudioOutput, RenderControl, RenderEnded};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The session was idle and this track started rendering now.
    Started(String),
    /// A track was already rendering; this one waits its turn.
    Queued,
    /// Nothing could be started (every queued track was refused).
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    Skipped,
    NothingPlaying,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub current: Option<String>,
    pub upcoming: Vec<String>,
}

enum MusicCommand {
    Enqueue {
        url: String,
        reply: oneshot::Sender<EnqueueOutcome>,
    },
    Skip {
        reply: oneshot::Sender<SkipOutcome>,
    },
    Queue {
        reply: oneshot::Sender<QueueSnapshot>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable mailbox for one guild's music session. All methods return `None`
/// once the session task has ended (i.e. after a stop).
#[derive(Clone)]
pub struct MusicHandle {
    tx: mpsc::UnboundedSender<MusicCommand>,
}

impl MusicHandle {
    pub fn spawn(guild_id: u64, output: Arc<dyn AudioOutput>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (end_tx, end_rx) = mpsc::unbounded_channel();
        let session = MusicSession {
            guild_id,
            output,
            queue: VecDeque::new(),
            current: None,
            end_tx,
        };
        tokio::spawn(run_session(session, rx, end_rx));
        Self { tx }
    }

    /// Appends a track. Playback starts immediately only when nothing is
    /// rendering; otherwise the track is picked up when the current one ends.
    pub async fn enqueue(&self, url: String) -> Option<EnqueueOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(MusicCommand::Enqueue { url, reply }).ok()?;
        rx.await.ok()
    }

    /// Stops the active render. The next track starts once the driver
    /// delivers the end notification.
    pub async fn skip(&self) -> Option<SkipOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(MusicCommand::Skip { reply }).ok()?;
        rx.await.ok()
    }

    pub async fn queue(&self) -> Option<QueueSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(MusicCommand::Queue { reply }).ok()?;
        rx.await.ok()
    }

    /// Releases the voice connection and ends the session task. Returns once
    /// the connection is gone.
    pub async fn stop(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(MusicCommand::Stop { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

struct MusicSession {
    guild_id: u64,
    output: Arc<dyn AudioOutput>,
    queue: VecDeque<String>,
    current: Option<CurrentTrack>,
    end_tx: mpsc::UnboundedSender<RenderEnded>,
}

struct CurrentTrack {
    url: String,
    play_id: Uuid,
    control: Box<dyn RenderControl>,
}

async fn run_session(
    mut session: MusicSession,
    mut commands: mpsc::UnboundedReceiver<MusicCommand>,
    mut ended: mpsc::UnboundedReceiver<RenderEnded>,
) {
    loop {
        // End notifications are drained before commands so a command never
        // observes a render the driver has already finished.
        tokio::select! {
            biased;

            Some(end) = ended.recv() => {
                session.on_render_ended(end).await;
            }
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    MusicCommand::Enqueue { url, reply } => {
                        session.queue.push_back(url);
                        let outcome = if session.current.is_some() {
                            EnqueueOutcome::Queued
                        } else {
                            match session.advance().await {
                                Some(started) => EnqueueOutcome::Started(started),
                                None => EnqueueOutcome::Failed,
                            }
                        };
                        let _ = reply.send(outcome);
                    }
                    MusicCommand::Skip { reply } => {
                        let outcome = match &session.current {
                            Some(track) => {
                                track.control.stop();
                                SkipOutcome::Skipped
                            }
                            None => SkipOutcome::NothingPlaying,
                        };
                        let _ = reply.send(outcome);
                    }
                    MusicCommand::Queue { reply } => {
                        let _ = reply.send(QueueSnapshot {
                            current: session.current.as_ref().map(|t| t.url.clone()),
                            upcoming: session.queue.iter().cloned().collect(),
                        });
                    }
                    MusicCommand::Stop { reply } => {
                        session.release().await;
                        let _ = reply.send(());
                        break;
                    }
                }
            }
        }
    }
    debug!("(MusicSession) guild {} => session task ended", session.guild_id);
}

impl MusicSession {
    /// Dequeues tracks until one starts or the queue runs dry. Returns the
    /// URL now rendering, if any.
    async fn advance(&mut self) -> Option<String> {
        self.current = None;
        while let Some(url) = self.queue.pop_front() {
            let play_id = Uuid::new_v4();
            match self.output.begin(&url, play_id, self.end_tx.clone()).await {
                Ok(control) => {
                    info!("(MusicSession) guild {} => now rendering '{url}'", self.guild_id);
                    self.current = Some(CurrentTrack {
                        url: url.clone(),
                        play_id,
                        control,
                    });
                    return Some(url);
                }
                Err(e) => {
                    warn!(
                        "(MusicSession) guild {} => could not start '{url}': {e:?}; trying next",
                        self.guild_id
                    );
                }
            }
        }
        None
    }

    async fn on_render_ended(&mut self, end: RenderEnded) {
        match &self.current {
            Some(track) if track.play_id == end.play_id => {
                debug!(
                    "(MusicSession) guild {} => render {} ended",
                    self.guild_id, end.play_id
                );
                self.advance().await;
            }
            _ => {
                debug!(
                    "(MusicSession) guild {} => ignoring stale end event {}",
                    self.guild_id, end.play_id
                );
            }
        }
    }

    async fn release(&mut self) {
        if let Some(track) = self.current.take() {
            track.control.stop();
        }
        self.queue.clear();
        if let Err(e) = self.output.disconnect().await {
            warn!(
                "(MusicSession) guild {} => error releasing connection: {e:?}",
                self.guild_id
            );
        }
    }
}
