//! Live result-stream session.
//!
//! One session owns at most one push-event connection, joined to the logical
//! channel of a single file key. Incoming events are reduced into two frame
//! surfaces (raw and annotated) and a structured result slot. Opening a new
//! file key supersedes the previous connection; every reducer call is gated
//! on the session generation captured when the connection was opened, so
//! events still in flight for a superseded key can never mutate state.

pub mod channel;
pub mod events;
pub mod surface;

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::stream::channel::EventChannel;
use crate::core::stream::events::{ClientEvent, ServerEvent};
use crate::core::stream::surface::{DecodedFrame, FrameSurface};

struct SessionState {
    generation: u64,
    cancel: Option<CancellationToken>,
    file_key: Option<String>,
}

/// Cheap-clonable handle; clones share the same session.
#[derive(Clone)]
pub struct ResultStreamSession {
    inner: Arc<StreamInner>,
}

struct StreamInner {
    ws_url: String,
    state: Mutex<SessionState>,
    raw: FrameSurface,
    annotated: FrameSurface,
    results: watch::Sender<Option<Value>>,
}

impl ResultStreamSession {
    pub fn new(ws_url: impl Into<String>) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            inner: Arc::new(StreamInner {
                ws_url: ws_url.into(),
                state: Mutex::new(SessionState {
                    generation: 0,
                    cancel: None,
                    file_key: None,
                }),
                raw: FrameSurface::new(),
                annotated: FrameSurface::new(),
                results,
            }),
        }
    }

    /// Raw source frames, latest value only.
    pub fn raw_frames(&self) -> watch::Receiver<Option<DecodedFrame>> {
        self.inner.raw.subscribe()
    }

    /// Annotated detection frames, latest value only.
    pub fn annotated_frames(&self) -> watch::Receiver<Option<DecodedFrame>> {
        self.inner.annotated.subscribe()
    }

    /// Structured detection payload, replaced wholesale per event.
    pub fn results(&self) -> watch::Receiver<Option<Value>> {
        self.inner.results.subscribe()
    }

    pub fn file_key(&self) -> Option<String> {
        self.inner.state.lock().unwrap().file_key.clone()
    }

    /// Start a new session generation for `file_key`, superseding any
    /// previous one. Returns the generation and its cancellation token.
    fn begin(&self, file_key: &str) -> (u64, CancellationToken) {
        let mut state = self.inner.state.lock().unwrap();
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        state.generation += 1;
        state.file_key = Some(file_key.to_string());
        let token = CancellationToken::new();
        state.cancel = Some(token.clone());
        (state.generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.lock().unwrap().generation == generation
    }

    /// Establish the connection, join the file key's channel, and spawn the
    /// reader. A connect failure logs a warning and leaves the session
    /// disconnected; the caller may invoke `open` again.
    pub async fn open(&self, file_key: &str) {
        let (generation, token) = self.begin(file_key);
        self.inner.raw.clear();
        self.inner.annotated.clear();
        self.inner.results.send_replace(None);

        let mut channel = match EventChannel::connect(&self.inner.ws_url).await {
            Ok(channel) => channel,
            Err(error) => {
                warn!("event channel connect failed: {error}");
                self.inner.state.lock().unwrap().cancel = None;
                return;
            }
        };

        let join = ClientEvent::Join {
            file_key: file_key.to_string(),
        };
        if let Err(error) = channel.send(&join).await {
            warn!("event channel join failed: {error}");
            self.inner.state.lock().unwrap().cancel = None;
            return;
        }

        let session = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = channel.next_event() => match event {
                        Ok(Some(event)) => session.apply_event(generation, event),
                        Ok(None) => {
                            debug!("event channel closed");
                            break;
                        }
                        Err(error) => {
                            warn!("event channel failed: {error}");
                            break;
                        }
                    },
                }
            }
            channel.close().await;
        });
    }

    /// Reduce one pushed event into session state. Events from a superseded
    /// generation are dropped.
    fn apply_event(&self, generation: u64, event: ServerEvent) {
        if !self.is_current(generation) {
            debug!("dropping event for superseded stream session");
            return;
        }

        match event {
            ServerEvent::Frame { data } => self.inner.raw.submit(data),
            ServerEvent::DetectionFrame { data } => self.inner.annotated.submit(data),
            ServerEvent::DetectionResultsJson { data } => {
                self.inner.results.send_replace(Some(data));
            }
            ServerEvent::TrainingResults { training_folder, .. } => {
                debug!("ignoring training results for {training_folder} on a stream session");
            }
            ServerEvent::TrainingResultsError { .. } => {
                debug!("ignoring training results error on a stream session");
            }
        }
    }

    /// Tear the connection down. No events are processed afterwards. Must be
    /// called when the file key changes or the consumer goes away.
    pub fn close(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.generation += 1;
        state.file_key = None;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
    }
}
