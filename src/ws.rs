// Live analysis channel. Frames are `{type, data}` JSON messages; malformed
// frames are dropped and logged, never fatal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tungstenite::protocol::Message;

use crate::config::Settings;
use crate::error::ClientError;
use crate::models::AnalysisResult;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Messages exchanged over `WS /ws`, routed by the backend-supplied kind
/// discriminator. Payload fields stay loosely typed where the backend owns
/// the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LiveMessage {
    /// Client-to-server analyze request.
    Analyze {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
    Progress(Value),
    Result(Box<AnalysisResult>),
    Error(Value),
}

pub struct LiveChannel {
    sink: Arc<Mutex<WsSink>>,
    stop: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

/// Connects the live channel and spawns a reader that dispatches each
/// incoming frame to `on_message`. Transport errors reach `on_error`.
pub async fn open_live_channel<M, E>(
    settings: &Settings,
    on_message: M,
    on_error: E,
) -> Result<LiveChannel, ClientError>
where
    M: Fn(LiveMessage) + Send + 'static,
    E: Fn(String) + Send + 'static,
{
    let url = settings.ws_url()?;
    info!("🔗 Connecting live channel: {}", url);

    let (socket, response) = connect_async(url.as_str())
        .await
        .map_err(|err| ClientError::WebSocket(err.to_string()))?;
    info!("✅ Live channel connected: {}", response.status());

    let (sink, mut read) = socket.split();
    let stop = Arc::new(AtomicBool::new(false));
    let connected = Arc::new(AtomicBool::new(true));

    let reader = {
        let stop = stop.clone();
        let connected = connected.clone();
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                if stop.load(Ordering::Relaxed) {
                    info!("🛑 Live channel reader stopping");
                    break;
                }
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<LiveMessage>(&text) {
                        Ok(message) => on_message(message),
                        Err(err) => warn!("⚠️ Dropping malformed live frame: {}", err),
                    },
                    Ok(Message::Close(close)) => {
                        if let Some(reason) = close {
                            info!("Live channel closed by server: {}", reason);
                        }
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        error!("❌ Live channel error: {}", err);
                        on_error(err.to_string());
                        break;
                    }
                }
            }
            connected.store(false, Ordering::Relaxed);
        })
    };

    Ok(LiveChannel {
        sink: Arc::new(Mutex::new(sink)),
        stop,
        connected,
        reader,
    })
}

impl LiveChannel {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub async fn send_analyze(&self, text: &str, topic: Option<&str>) -> Result<(), ClientError> {
        let message = LiveMessage::Analyze {
            text: text.to_string(),
            topic: topic.map(str::to_string),
        };
        let payload = serde_json::to_string(&message)?;
        self.sink
            .lock()
            .await
            .send(Message::Text(payload))
            .await
            .map_err(|err| ClientError::WebSocket(err.to_string()))
    }

    pub async fn close(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.sink.lock().await.send(Message::Close(None)).await;
        self.connected.store(false, Ordering::Relaxed);
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_progress_frame() {
        let frame = r#"{"type": "progress", "data": {"stage": "grammar", "percent": 25}}"#;
        let message: LiveMessage = serde_json::from_str(frame).unwrap();
        match message {
            LiveMessage::Progress(data) => assert_eq!(data["stage"], "grammar"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_result_frame() {
        let frame = format!(
            r#"{{"type": "result", "data": {}}}"#,
            crate::models::SAMPLE_RESULT_JSON
        );
        let message: LiveMessage = serde_json::from_str(&frame).unwrap();
        match message {
            LiveMessage::Result(result) => assert_eq!(result.overall_score, 92.0),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_error_frame() {
        let frame = r#"{"type": "error", "data": {"message": "analysis failed"}}"#;
        let message: LiveMessage = serde_json::from_str(frame).unwrap();
        match message {
            LiveMessage::Error(data) => assert_eq!(data["message"], "analysis failed"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_and_unknown_frames() {
        assert!(serde_json::from_str::<LiveMessage>("not json").is_err());
        assert!(
            serde_json::from_str::<LiveMessage>(r#"{"type": "mystery", "data": {}}"#).is_err()
        );
    }

    #[test]
    fn analyze_message_serializes_with_kind_tag() {
        let message = LiveMessage::Analyze {
            text: "The quick brown fox.".to_string(),
            topic: Some("nature".to_string()),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "analyze");
        assert_eq!(json["data"]["text"], "The quick brown fox.");
        assert_eq!(json["data"]["topic"], "nature");
    }
}
