//! Push-event channel payloads.
//!
//! Both directions use JSON envelopes carrying the event name in an `event`
//! field, with the remaining payload fields alongside it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::training::artifacts::ArtifactBundle;

/// Events emitted by the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join the logical channel for an uploaded file.
    Join { file_key: String },
    /// Ask for the one-shot artifact bundle of a training run.
    RequestTrainingResults { training_folder: String },
}

/// Events pushed by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Raw source frame, base64 JPEG.
    Frame { data: String },
    /// Annotated frame with detections drawn in, base64 JPEG.
    DetectionFrame { data: String },
    /// Structured detection payload; replaces the previous value wholesale.
    DetectionResultsJson { data: Value },
    TrainingResults {
        training_folder: String,
        results: ArtifactBundle,
    },
    TrainingResultsError {
        #[serde(default)]
        message: Option<String>,
    },
}
