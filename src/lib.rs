//! Convo Bridge — durable persistence bridge for a hosted chat UI.
//!
//! A host document connects over a WebSocket, is greeted with the stored
//! conversation, and can get/save/clear it with typed messages. The
//! conversation record lives in a durable key-value store owned by the
//! bridge side; in-memory copies on either end are transient.

pub mod bridge;
pub mod config;
pub mod error;
pub mod store;
