use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == ChatRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == ChatRole::Assistant
    }

    pub fn is_system(self) -> bool {
        self == ChatRole::System
    }
}

impl AsRef<str> for ChatRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for ChatRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(format!("invalid chat role: {value}")),
        }
    }
}

impl TryFrom<String> for ChatRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<ChatRole> for String {
    fn from(value: ChatRole) -> Self {
        value.as_str().to_string()
    }
}

/// Transcript message content. Image turns carry a data URL reference so the
/// transcript can show what the user attached; they are never sent down the
/// text-only completion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    ImageRef { url: String },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn image_ref(url: impl Into<String>) -> Self {
        MessageContent::ImageRef { url: url.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text } => Some(text),
            MessageContent::ImageRef { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, MessageContent::Text { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: ChatRole, content: MessageContent) -> Self {
        Self { role, content }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(ChatRole::System, MessageContent::text(text))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, MessageContent::text(text))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, MessageContent::text(text))
    }

    pub fn user_image(url: impl Into<String>) -> Self {
        Self::new(ChatRole::User, MessageContent::image_ref(url))
    }

    /// System messages seed the request payload but are hidden from the
    /// rendered transcript.
    pub fn is_visible(&self) -> bool {
        !self.role.is_system()
    }
}
