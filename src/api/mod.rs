use serde::{Deserialize, Serialize};

/// One turn of an LLM completion request. Text turns carry a plain string;
/// vision turns carry a list of typed parts, matching the OpenAI-compatible
/// wire shape.
#[derive(Serialize, Clone, Debug)]
pub struct ApiMessage {
    pub role: String,
    pub content: ApiContent,
}

#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum ApiContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Clone, Debug)]
pub struct ImageUrl {
    pub url: String,
}

impl ApiMessage {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: ApiContent::Text(content.into()),
        }
    }

    /// A single user turn mixing an instruction with an image, the shape the
    /// vision completion path expects.
    pub fn vision_user(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: ApiContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

/// Detection-backend payloads.
#[derive(Deserialize, Debug)]
pub struct ListModelsResponse {
    pub detection_models: Vec<String>,
}

#[derive(Serialize)]
pub struct SetModelRequest {
    pub yolo: String,
}

#[derive(Deserialize)]
pub struct UploadResponse {
    pub file_key: String,
}

#[derive(Serialize)]
pub struct StartProcessRequest {
    pub file_key: String,
    pub is_image: bool,
}

pub mod backend;
