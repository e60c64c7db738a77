//! Simulated typing: incremental reveal of an already-received reply.
//!
//! The full reply text is known before the reveal starts; the task appends
//! one character per tick to the transcript message it owns, so the final
//! state is indistinguishable from rendering the text at once. Cancelling
//! mid-reveal freezes the message at the prefix emitted so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::message::{Message, MessageContent};

/// Handle to a running reveal. Dropping the handle does not stop the reveal;
/// call [`RevealHandle::stop`].
pub struct RevealHandle {
    cancel: CancellationToken,
}

impl RevealHandle {
    /// Cancel the reveal, leaving the emitted prefix in place. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

fn set_message_text(transcript: &Mutex<Vec<Message>>, index: usize, text: String) {
    let mut transcript = transcript.lock().unwrap();
    if let Some(message) = transcript.get_mut(index) {
        message.content = MessageContent::text(text);
    }
}

/// Append an empty assistant message and spawn the task that fills it in
/// character by character. `typing` is cleared when the reveal runs to
/// completion; a cancelled reveal leaves it to the canceller.
pub(crate) fn spawn_reveal(
    transcript: Arc<Mutex<Vec<Message>>>,
    typing: Arc<AtomicBool>,
    text: String,
    tick: Duration,
) -> RevealHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let index = {
        let mut transcript = transcript.lock().unwrap();
        transcript.push(Message::assistant(""));
        transcript.len() - 1
    };

    // interval() panics on a zero period
    let tick = tick.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        let mut revealed = String::new();

        for ch in text.chars() {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = interval.tick() => {}
            }
            if token.is_cancelled() {
                return;
            }
            revealed.push(ch);
            set_message_text(&transcript, index, revealed.clone());
        }

        set_message_text(&transcript, index, text);
        typing.store(false, Ordering::SeqCst);
    });

    RevealHandle { cancel }
}
