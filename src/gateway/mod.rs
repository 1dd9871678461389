//! Realtime websocket gateway.
//!
//! Event protocol: the client sends `{"event":"sendMessage","message":
//! "...","userId":N}` and receives `{"event":"newMessage",...}` with the
//! bot reply on the same connection. Messages land in the configured
//! default chat. Malformed frames and pipeline failures produce an error
//! event instead of closing the socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::pipeline::SubmitMessage;
use crate::shared::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(websocket_handler))
}

#[derive(Debug, Deserialize)]
struct InboundEvent {
    event: String,
    message: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMessageEvent<'a> {
    event: &'a str,
    user: &'a str,
    text: &'a str,
    sentiment: &'a str,
    timestamp: String,
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("gateway: client connected");
    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(frame)) = receiver.next().await {
        match frame {
            WsMessage::Text(text) => {
                let reply = dispatch(&state, &text).await;
                if sender.send(WsMessage::Text(reply)).await.is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!("gateway: client disconnected");
}

/// Handle one inbound frame and produce the outbound frame for it.
async fn dispatch(state: &Arc<AppState>, text: &str) -> String {
    let event: InboundEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!("gateway: unparseable frame: {e}");
            return error_frame("malformed event");
        }
    };

    if event.event != "sendMessage" {
        return error_frame("unsupported event");
    }
    let (Some(message), Some(user_id)) = (event.message, event.user_id) else {
        return error_frame("sendMessage requires 'message' and 'userId'");
    };

    let outcome = state
        .pipeline
        .process(SubmitMessage {
            user_id,
            chat_id: state.config.gateway.default_chat_id,
            content: message,
        })
        .await;

    match outcome {
        Ok(outcome) => {
            let frame = NewMessageEvent {
                event: "newMessage",
                user: "IA",
                text: &outcome.bot_message.content,
                sentiment: &outcome.user_message.sentiment,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            serde_json::to_string(&frame).unwrap_or_else(|_| error_frame("serialization failed"))
        }
        Err(e) => {
            warn!("gateway: pipeline rejected message: {e}");
            error_frame(&e.to_string())
        }
    }
}

fn error_frame(detail: &str) -> String {
    serde_json::json!({"event": "error", "error": detail}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_event_parses_the_wire_shape() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"event":"sendMessage","message":"hola","userId":1}"#).unwrap();
        assert_eq!(event.event, "sendMessage");
        assert_eq!(event.message.as_deref(), Some("hola"));
        assert_eq!(event.user_id, Some(1));
    }

    #[test]
    fn outbound_event_serializes_the_wire_shape() {
        let frame = NewMessageEvent {
            event: "newMessage",
            user: "IA",
            text: "Entiendo, cuéntame más",
            sentiment: "NEGATIVE",
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
        assert_eq!(json["event"], "newMessage");
        assert_eq!(json["user"], "IA");
        assert_eq!(json["sentiment"], "NEGATIVE");
    }

    #[test]
    fn error_frame_is_json() {
        let json: serde_json::Value = serde_json::from_str(&error_frame("boom")).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["error"], "boom");
    }
}
