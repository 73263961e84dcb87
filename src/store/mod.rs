//! Persistence layer — durable key-value storage for the conversation record.

pub mod backend;
pub mod conversation;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use conversation::ConversationStore;
