//! Wire protocol between the host document and the bridge.
//!
//! Messages are JSON objects discriminated by a `type` field. Inbound text
//! that does not parse as a `HostMessage` is ignored by the bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message from host document → bridge.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    /// Ask for the stored conversation; answered with `CONVERSATION_DATA`.
    #[serde(rename = "GET_CONVERSATION")]
    GetConversation,

    /// Persist the given conversation, replacing the stored record. A save
    /// without a `conversation` field is malformed and dropped.
    #[serde(rename = "SAVE_CONVERSATION")]
    SaveConversation { conversation: Vec<Value> },

    /// Remove the stored conversation record.
    #[serde(rename = "CLEAR_CONVERSATION")]
    ClearConversation,
}

/// Message from bridge → host document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum FrameMessage {
    /// Sent once when a host connects, carrying the conversation as stored
    /// at that moment.
    #[serde(rename = "INIT_CONVERSATION")]
    InitConversation { conversation: Vec<Value> },

    /// Reply to `GET_CONVERSATION`.
    #[serde(rename = "CONVERSATION_DATA")]
    ConversationData { conversation: Vec<Value> },
}
