//! WebSocket transport for the push-event channel.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::core::stream::events::{ClientEvent, ServerEvent};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket transport failed: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("event encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One logical push-event connection. The channel is an owned resource:
/// whoever opens it is responsible for dropping or closing it when the file
/// key changes or the consumer goes away.
pub struct EventChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventChannel {
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|error| ChannelError::Connect(Box::new(error)))?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, event: &ClientEvent) -> Result<(), ChannelError> {
        let payload = serde_json::to_string(event)?;
        self.stream
            .send(Message::Text(payload.into()))
            .await
            .map_err(|error| ChannelError::Transport(Box::new(error)))
    }

    /// Next decodable server event. Undecodable or non-text messages are
    /// skipped with a diagnostic. `Ok(None)` means the peer closed.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>, ChannelError> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(text.as_str()) {
                    Ok(event) => return Ok(Some(event)),
                    Err(error) => {
                        debug!("skipping undecodable event: {error}");
                    }
                },
                Ok(Message::Close(_)) => return Ok(None),
                Ok(_) => {
                    // Ping/pong and binary frames are transport noise here.
                }
                Err(error) => return Err(ChannelError::Transport(Box::new(error))),
            }
        }
        Ok(None)
    }

    /// Graceful close. Errors are ignored; the peer may already be gone.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
