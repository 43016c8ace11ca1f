// File: src/test_utils/mod.rs
//!
//! Hand-rolled playback fakes shared by unit and integration tests. They
//! record what the sessions ask of them and let tests deliver end-of-render
//! notifications on demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::Error;
use crate::services::playback::output::{AudioOutput, RenderControl, RenderEnded, VoiceBackend};

/// Voice backend that hands out a [`FakeOutput`] per guild instead of joining
/// real channels. A guild holds one live connection at a time; connecting
/// again before the previous output disconnected is refused, as the real
/// backend refuses it.
#[derive(Default)]
pub struct FakeVoice {
    state: Mutex<FakeVoiceState>,
}

#[derive(Default)]
struct FakeVoiceState {
    connects: Vec<(u64, u64)>,
    fail_next: bool,
    outputs: HashMap<u64, Arc<FakeOutput>>,
}

impl FakeVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next connect attempt fail.
    pub fn fail_next_connect(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    /// Every (guild, channel) pair connected so far, in order.
    pub fn connects(&self) -> Vec<(u64, u64)> {
        self.state.lock().unwrap().connects.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connects.len()
    }

    /// The most recent output handed out for `guild_id`.
    pub fn output_for(&self, guild_id: u64) -> Option<Arc<FakeOutput>> {
        self.state.lock().unwrap().outputs.get(&guild_id).cloned()
    }
}

#[async_trait]
impl VoiceBackend for FakeVoice {
    async fn connect(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Arc<dyn AudioOutput>, Error> {
        let mut state = self.state.lock().unwrap();
        // One voice connection per guild, whichever session kind asks.
        if state
            .outputs
            .get(&guild_id)
            .is_some_and(|output| !output.is_disconnected())
        {
            return Err(Error::Voice(format!(
                "fake voice is already connected for guild {guild_id}"
            )));
        }
        if state.fail_next {
            state.fail_next = false;
            return Err(Error::Voice(format!(
                "fake connect refused for guild {guild_id}"
            )));
        }
        state.connects.push((guild_id, channel_id));
        let output = Arc::new(FakeOutput::default());
        state.outputs.insert(guild_id, output.clone());
        Ok(output as Arc<dyn AudioOutput>)
    }
}

/// Records every render begun on a connection and lets tests finish or reject
/// tracks. `begin` replaces the active render, as the real driver does when a
/// session starts the next track.
#[derive(Default)]
pub struct FakeOutput {
    state: Arc<Mutex<FakeOutputState>>,
}

#[derive(Default)]
struct FakeOutputState {
    began: Vec<String>,
    reject: Option<String>,
    active: Option<ActiveRender>,
    last_finished: Option<(Uuid, UnboundedSender<RenderEnded>)>,
    stops: usize,
    disconnected: bool,
}

struct ActiveRender {
    url: String,
    play_id: Uuid,
    on_end: UnboundedSender<RenderEnded>,
}

impl FakeOutput {
    /// URLs handed to `begin` so far, in order, rejected ones included.
    pub fn began(&self) -> Vec<String> {
        self.state.lock().unwrap().began.clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .active
            .as_ref()
            .map(|a| a.url.clone())
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().unwrap().stops
    }

    pub fn is_disconnected(&self) -> bool {
        self.state.lock().unwrap().disconnected
    }

    /// Rejects the next `begin` call for exactly this URL.
    pub fn fail_url(&self, url: &str) {
        self.state.lock().unwrap().reject = Some(url.to_string());
    }

    /// Delivers the end notification for the active render, as if the stream
    /// ran out.
    pub fn finish_current(&self) {
        let taken = {
            let mut state = self.state.lock().unwrap();
            let taken = state.active.take();
            if let Some(active) = &taken {
                state.last_finished = Some((active.play_id, active.on_end.clone()));
            }
            taken
        };
        if let Some(active) = taken {
            let _ = active.on_end.send(RenderEnded {
                play_id: active.play_id,
            });
        }
    }

    /// Fires the most recently delivered end notification a second time,
    /// simulating a duplicate event from the driver.
    pub fn refire_last_end(&self) {
        let last = self.state.lock().unwrap().last_finished.clone();
        if let Some((play_id, on_end)) = last {
            let _ = on_end.send(RenderEnded { play_id });
        }
    }
}

#[async_trait]
impl AudioOutput for FakeOutput {
    async fn begin(
        &self,
        url: &str,
        play_id: Uuid,
        on_end: UnboundedSender<RenderEnded>,
    ) -> Result<Box<dyn RenderControl>, Error> {
        let mut state = self.state.lock().unwrap();
        state.began.push(url.to_string());
        if state.reject.as_deref() == Some(url) {
            state.reject = None;
            return Err(Error::Voice(format!("fake render refused '{url}'")));
        }
        state.active = Some(ActiveRender {
            url: url.to_string(),
            play_id,
            on_end: on_end.clone(),
        });
        Ok(Box::new(FakeRender {
            play_id,
            state: self.state.clone(),
        }))
    }

    async fn disconnect(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.disconnected = true;
        state.active = None;
        Ok(())
    }
}

/// Stopping a render delivers its end notification, matching driver behavior.
struct FakeRender {
    play_id: Uuid,
    state: Arc<Mutex<FakeOutputState>>,
}

impl RenderControl for FakeRender {
    fn stop(&self) {
        let taken = {
            let mut state = self.state.lock().unwrap();
            let is_active = state
                .active
                .as_ref()
                .is_some_and(|a| a.play_id == self.play_id);
            if !is_active {
                return;
            }
            state.stops += 1;
            let active = state.active.take().unwrap();
            state.last_finished = Some((active.play_id, active.on_end.clone()));
            active
        };
        let _ = taken.on_end.send(RenderEnded {
            play_id: taken.play_id,
        });
    }
}

