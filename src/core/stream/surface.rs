//! Latest-wins frame surface.
//!
//! Frames arrive base64-encoded and are decoded off the event path, so a
//! decode can complete after a newer frame has already been requested for the
//! same channel. Each submission takes a ticket; only the completion holding
//! the most recently issued ticket may publish. Stale completions are
//! discarded, never drawn.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::watch;
use tracing::debug;

/// Decoded image payload, replacing whatever the channel showed before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub bytes: Vec<u8>,
}

/// Cheap-clonable handle; clones share the same surface.
#[derive(Clone)]
pub struct FrameSurface {
    inner: Arc<SurfaceInner>,
}

struct SurfaceInner {
    issued: Mutex<u64>,
    tx: watch::Sender<Option<DecodedFrame>>,
}

impl FrameSurface {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(SurfaceInner {
                issued: Mutex::new(0),
                tx,
            }),
        }
    }

    /// Latest-value view of the channel. Receivers only ever observe the
    /// most recent published frame.
    pub fn subscribe(&self) -> watch::Receiver<Option<DecodedFrame>> {
        self.inner.tx.subscribe()
    }

    /// Reserve the next draw ticket, invalidating all earlier tickets.
    pub(crate) fn begin_draw(&self) -> u64 {
        let mut issued = self.inner.issued.lock().unwrap();
        *issued += 1;
        *issued
    }

    /// Publish a completed decode if its ticket is still current. Returns
    /// whether the frame was drawn.
    pub(crate) fn complete_draw(&self, ticket: u64, frame: DecodedFrame) -> bool {
        let issued = self.inner.issued.lock().unwrap();
        if *issued != ticket {
            debug!("discarding stale decode (ticket {ticket}, current {issued})");
            return false;
        }
        self.inner.tx.send_replace(Some(frame));
        true
    }

    /// Decode and draw a base64 frame. Decoding runs on a blocking thread
    /// and completes asynchronously; submissions racing through here resolve
    /// in favor of the most recent one regardless of decode order.
    pub fn submit(&self, base64_data: String) {
        let ticket = self.begin_draw();
        let surface = self.clone();
        tokio::task::spawn_blocking(move || match BASE64.decode(base64_data.as_bytes()) {
            Ok(bytes) => {
                surface.complete_draw(ticket, DecodedFrame { bytes });
            }
            Err(error) => {
                debug!("discarding undecodable frame: {error}");
            }
        });
    }

    /// Drop the displayed frame, e.g. when a new stream session starts.
    pub fn clear(&self) {
        let mut issued = self.inner.issued.lock().unwrap();
        *issued += 1;
        self.inner.tx.send_replace(None);
    }
}

impl Default for FrameSurface {
    fn default() -> Self {
        Self::new()
    }
}
