//! Training-results session.
//!
//! One-shot fetch of the named-artifact bundle for a training run, plus the
//! per-artifact explain hand-off that feeds an image into the training chat.

pub mod artifacts;

use tracing::{debug, warn};

use crate::api::backend::is_sentinel_folder;
use crate::core::stream::channel::{ChannelError, EventChannel};
use crate::core::stream::events::{ClientEvent, ServerEvent};
use crate::core::training::artifacts::{ArtifactBundle, ArtifactKind};

#[derive(Debug, thiserror::Error)]
pub enum TrainingRequestError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("training results request failed: {0}")]
    Backend(String),
    #[error("event channel closed before training results arrived")]
    Closed,
}

/// Explain hand-off signal for the chat layer. `Detached` carries no payload;
/// it tells the consumer to drop whatever image it was holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainUpdate {
    Attached { name: String, data: String },
    Detached,
}

pub struct TrainingResultsSession {
    ws_url: String,
    folder: Option<String>,
    bundle: Option<ArtifactBundle>,
    attached: Option<String>,
}

impl TrainingResultsSession {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            folder: None,
            bundle: None,
            attached: None,
        }
    }

    /// Fetch the artifact bundle for `training_folder`. The sentinel folders
    /// ("None", empty) resolve to `Ok(None)` without touching the network.
    ///
    /// Exactly one matching response completes the request; responses keyed
    /// to a different folder are logged and discarded without requeueing.
    pub async fn request(
        &mut self,
        training_folder: &str,
    ) -> Result<Option<&ArtifactBundle>, TrainingRequestError> {
        if is_sentinel_folder(training_folder) {
            return Ok(None);
        }

        self.folder = Some(training_folder.to_string());
        self.bundle = None;
        self.attached = None;

        let mut channel = EventChannel::connect(&self.ws_url).await?;
        channel
            .send(&ClientEvent::RequestTrainingResults {
                training_folder: training_folder.to_string(),
            })
            .await?;

        let bundle = loop {
            match channel.next_event().await? {
                None => return Err(TrainingRequestError::Closed),
                Some(ServerEvent::TrainingResults {
                    training_folder: folder,
                    results,
                }) => {
                    if folder == training_folder {
                        break results;
                    }
                    warn!("received training results for a different folder: {folder}");
                }
                Some(ServerEvent::TrainingResultsError { message }) => {
                    return Err(TrainingRequestError::Backend(
                        message.unwrap_or_else(|| "no detail provided".to_string()),
                    ));
                }
                Some(other) => {
                    debug!("ignoring stream event during training request: {other:?}");
                }
            }
        };
        channel.close().await;

        self.bundle = Some(bundle);
        Ok(self.bundle.as_ref())
    }

    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn bundle(&self) -> Option<&ArtifactBundle> {
        self.bundle.as_ref()
    }

    /// Name of the currently attached artifact, if any.
    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    /// Toggle the explain attachment for `name`.
    ///
    /// Attaching the already-attached artifact detaches it; a different
    /// artifact replaces the attachment (never two at once). Unknown or
    /// non-image artifacts are skipped with a diagnostic and leave the
    /// attachment unchanged.
    pub fn explain(&mut self, name: &str) -> Option<ExplainUpdate> {
        if self.attached.as_deref() == Some(name) {
            self.attached = None;
            return Some(ExplainUpdate::Detached);
        }

        let Some(artifact) = self.bundle.as_ref().and_then(|bundle| bundle.get(name)) else {
            warn!("artifact not found in results: {name}");
            return None;
        };
        if artifact.kind != ArtifactKind::Image {
            warn!("artifact {name} is not an image; nothing to explain");
            return None;
        }

        self.attached = Some(name.to_string());
        Some(ExplainUpdate::Attached {
            name: name.to_string(),
            data: artifact.data.clone(),
        })
    }

    #[cfg(test)]
    fn set_bundle_for_test(&mut self, bundle: ArtifactBundle) {
        self.bundle = Some(bundle);
    }
}
