//! Core wire types shared between the chat client and diagnostic tooling.
//!
//! The chat backend exchanges JSON text frames over a WebSocket transport;
//! this crate pins the field-level contract for both directions.

pub mod codec;
pub mod message;

pub use codec::{CodecError, CodecLimits, FrameCodec};
pub use message::{ChatMessage, MessageType, OutboundFrame};

/// Returns the protocol crate version string.
pub fn protocol_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_pkg() {
        assert_eq!(protocol_version(), env!("CARGO_PKG_VERSION"));
    }
}
