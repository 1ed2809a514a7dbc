use serde::{Deserialize, Serialize};

use crate::db::{DisplayRecord, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SendMessage {
    pub sender: Identity,
    pub receiver: Identity,
    pub text: String,
}

/// Frames a client may send, as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Join(Identity),
    SendMessage(SendMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ReceiveMessage(DisplayRecord),
    LoginError(String),
    MessageError(String),
}
