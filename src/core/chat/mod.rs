//! Chat session with the LLM assistant.
//!
//! A session owns a linear transcript, a typing-in-progress flag, and at
//! most one attached image. Sends are single-flight: while a reply is being
//! revealed, further sends are ignored. Two variants share the machinery:
//! the training chat is seeded with chunked context (project brief, CSV,
//! YAML) and consumes explain-attached artifact images one at a time; the
//! detection chat is seeded with a greeting only and grounds every question
//! in the single annotated frame it was given.

pub mod reveal;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use crate::api::ApiMessage;
use crate::core::chat::reveal::{spawn_reveal, RevealHandle};
use crate::core::chunking::{build_seed_messages, SeedContext};
use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::config::{DEFAULT_CHUNK_LIMIT, DEFAULT_REVEAL_INTERVAL_MS};
use crate::core::message::{ChatRole, Message};
use crate::core::prompt;
use crate::core::training::ExplainUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVariant {
    Training,
    Detection,
}

/// Image payload handed to the session, base64 JPEG plus a short description
/// (typically the artifact or frame name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedImage {
    pub data: String,
    pub description: String,
}

impl AttachedImage {
    fn as_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.data)
    }
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Character count per seeded context chunk
    pub chunk_limit: usize,
    /// Tick period of the simulated-typing reveal
    pub reveal_interval: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            reveal_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
        }
    }
}

pub struct ChatSession {
    client: Arc<dyn CompletionClient>,
    variant: ChatVariant,
    options: ChatOptions,
    transcript: Arc<Mutex<Vec<Message>>>,
    typing: Arc<AtomicBool>,
    reveal: Option<RevealHandle>,
    attached_image: Option<AttachedImage>,
    image_introduced: bool,
}

impl ChatSession {
    /// Training-context chat, seeded from chunked context. `context` is the
    /// immutable seeded configuration; re-seed when it changes identity.
    pub fn training(
        client: Arc<dyn CompletionClient>,
        options: ChatOptions,
        context: &SeedContext,
    ) -> Self {
        let mut session = Self::new(client, ChatVariant::Training, options);
        session.seed_training(context);
        session
    }

    /// Detection-context chat, grounded in one annotated frame.
    pub fn detection(
        client: Arc<dyn CompletionClient>,
        options: ChatOptions,
        image: Option<AttachedImage>,
    ) -> Self {
        let mut session = Self::new(client, ChatVariant::Detection, options);
        session.attached_image = image;
        session.seed_detection();
        session
    }

    fn new(client: Arc<dyn CompletionClient>, variant: ChatVariant, options: ChatOptions) -> Self {
        Self {
            client,
            variant,
            options,
            transcript: Arc::new(Mutex::new(Vec::new())),
            typing: Arc::new(AtomicBool::new(false)),
            reveal: None,
            attached_image: None,
            image_introduced: false,
        }
    }

    /// Rebuild the transcript from fresh context: operating instructions,
    /// context chunks in fixed order, then the greeting. Discards any prior
    /// transcript and in-flight reveal.
    pub fn seed_training(&mut self, context: &SeedContext) {
        self.cancel_reveal();
        let mut messages =
            build_seed_messages(prompt::SYSTEM_INSTRUCTION, context, self.options.chunk_limit);
        messages.push(Message::assistant(prompt::TRAINING_GREETING));
        *self.transcript.lock().unwrap() = messages;
    }

    fn seed_detection(&mut self) {
        self.cancel_reveal();
        *self.transcript.lock().unwrap() = vec![Message::assistant(prompt::DETECTION_GREETING)];
    }

    /// Attach an image for the next send, replacing any current attachment.
    pub fn attach_image(&mut self, image: AttachedImage) {
        self.attached_image = Some(image);
    }

    pub fn detach_image(&mut self) {
        self.attached_image = None;
    }

    /// Apply an explain hand-off from the training-results session.
    pub fn apply_explain(&mut self, update: ExplainUpdate) {
        match update {
            ExplainUpdate::Attached { name, data } => self.attach_image(AttachedImage {
                data,
                description: name,
            }),
            ExplainUpdate::Detached => self.detach_image(),
        }
    }

    pub fn attached_image(&self) -> Option<&AttachedImage> {
        self.attached_image.as_ref()
    }

    pub fn is_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    /// Full transcript snapshot, system messages included.
    pub fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().unwrap().clone()
    }

    /// Transcript as rendered: system messages hidden.
    pub fn visible_transcript(&self) -> Vec<Message> {
        self.transcript
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.is_visible())
            .cloned()
            .collect()
    }

    /// Cancel an in-flight reveal, freezing the revealed prefix, and accept
    /// sends again. Idempotent.
    pub fn stop(&mut self) {
        self.cancel_reveal();
    }

    fn cancel_reveal(&mut self) {
        if let Some(handle) = self.reveal.take() {
            handle.stop();
        }
        self.typing.store(false, Ordering::SeqCst);
    }

    /// Send one user turn. A no-op while a prior reply is still being
    /// revealed. On collaborator failure the transcript keeps everything
    /// appended so far and typing is cleared; the error is logged and
    /// returned.
    pub async fn send(&mut self, input: &str) -> Result<(), CompletionError> {
        if self.is_typing() {
            return Ok(());
        }

        self.transcript.lock().unwrap().push(Message::user(input));
        self.typing.store(true, Ordering::SeqCst);

        let outcome = match self.variant {
            ChatVariant::Training => match self.attached_image.clone() {
                Some(image) => self.training_image_turn(&image).await,
                None => self.text_turn().await,
            },
            ChatVariant::Detection => match self.attached_image.clone() {
                Some(image) if !self.image_introduced => {
                    self.detection_intro_turn(&image).await
                }
                Some(image) => self.detection_follow_up_turn(&image, input).await,
                None => {
                    self.typing.store(false, Ordering::SeqCst);
                    self.transcript
                        .lock()
                        .unwrap()
                        .push(Message::assistant(prompt::NO_IMAGE_AVAILABLE));
                    return Ok(());
                }
            },
        };

        match outcome {
            Ok(reply) => {
                self.begin_reveal(reply);
                Ok(())
            }
            Err(error) => {
                self.typing.store(false, Ordering::SeqCst);
                warn!("error fetching chat response: {error}");
                Err(error)
            }
        }
    }

    /// Text-only turn: the full transcript, minus any user turn whose
    /// content is not text, goes to the text completion path.
    async fn text_turn(&mut self) -> Result<String, CompletionError> {
        let api_messages = self.text_api_messages();
        let reply = self.client.complete_text(api_messages).await?;
        Ok(fallback_if_empty(reply, prompt::NO_RESPONSE))
    }

    /// Attached-image turn of the training chat: the vision reply is piped
    /// through a second text completion for synthesis, and the attachment is
    /// consumed by this single use.
    async fn training_image_turn(
        &mut self,
        image: &AttachedImage,
    ) -> Result<String, CompletionError> {
        let image_url = image.as_data_url();
        self.transcript
            .lock()
            .unwrap()
            .push(Message::user_image(image_url.clone()));

        let vision_reply = self
            .client
            .complete_vision(prompt::training_vision_prompt(&image.description), image_url)
            .await?;
        let vision_reply = fallback_if_empty(vision_reply, prompt::NO_VISION_RESPONSE);

        let synthesized = self
            .client
            .complete_text(vec![ApiMessage::text("user", vision_reply)])
            .await?;

        self.attached_image = None;
        Ok(fallback_if_empty(synthesized, prompt::NO_RESPONSE))
    }

    /// First image-bearing turn of the detection chat.
    async fn detection_intro_turn(
        &mut self,
        image: &AttachedImage,
    ) -> Result<String, CompletionError> {
        let image_url = image.as_data_url();
        self.transcript
            .lock()
            .unwrap()
            .push(Message::user_image(image_url.clone()));

        let reply = self
            .client
            .complete_vision(prompt::detection_vision_prompt(&image.description), image_url)
            .await?;

        self.image_introduced = true;
        Ok(fallback_if_empty(reply, prompt::NO_VISION_RESPONSE))
    }

    /// Later detection turns re-query the vision path against the same
    /// image, quoting the user's latest question.
    async fn detection_follow_up_turn(
        &mut self,
        image: &AttachedImage,
        question: &str,
    ) -> Result<String, CompletionError> {
        let reply = self
            .client
            .complete_vision(
                prompt::detection_follow_up_prompt(question, &image.description),
                image.as_data_url(),
            )
            .await?;
        Ok(fallback_if_empty(reply, prompt::NO_FOLLOW_UP_RESPONSE))
    }

    fn text_api_messages(&self) -> Vec<ApiMessage> {
        self.transcript
            .lock()
            .unwrap()
            .iter()
            .filter_map(|message| match message.content.as_text() {
                Some(text) => Some(ApiMessage::text(message.role.as_str(), text)),
                None => {
                    debug_assert_eq!(message.role, ChatRole::User);
                    None
                }
            })
            .collect()
    }

    fn begin_reveal(&mut self, text: String) {
        if let Some(handle) = self.reveal.take() {
            handle.stop();
        }
        self.reveal = Some(spawn_reveal(
            Arc::clone(&self.transcript),
            Arc::clone(&self.typing),
            text,
            self.options.reveal_interval,
        ));
    }
}

fn fallback_if_empty(reply: String, fallback: &str) -> String {
    if reply.trim().is_empty() {
        fallback.to_string()
    } else {
        reply
    }
}

#[cfg(test)]
mod tests;
