//! Message bridge between the host document and the conversation store.

pub mod protocol;
pub mod ws;

pub use protocol::{FrameMessage, HostMessage};
pub use ws::bridge_routes;
