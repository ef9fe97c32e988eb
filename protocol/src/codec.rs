//! JSON codec for chat frames carried as WebSocket text.

use crate::message::{ChatMessage, OutboundFrame};

/// Limits used by the frame codec to protect against malformed payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecLimits {
    pub max_frame_size: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            // Generous ceiling for chat text frames.
            max_frame_size: 64 * 1024,
        }
    }
}

/// Errors produced while encoding/decoding chat frames.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("frame is empty")]
    EmptyFrame,

    #[error("frame exceeds limit: limit={limit} actual={actual}")]
    FrameTooLarge { limit: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Codec that serializes chat frames as JSON text.
#[derive(Clone, Debug)]
pub struct FrameCodec {
    limits: CodecLimits,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self {
            limits: CodecLimits::default(),
        }
    }
}

impl FrameCodec {
    #[must_use]
    pub const fn new(limits: CodecLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> CodecLimits {
        self.limits
    }

    /// Encodes a client frame for transmission.
    pub fn encode_outbound(&self, frame: &OutboundFrame) -> Result<String, CodecError> {
        let raw = serde_json::to_string(frame)?;
        if raw.len() > self.limits.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                limit: self.limits.max_frame_size,
                actual: raw.len(),
            });
        }
        Ok(raw)
    }

    /// Decodes a frame received from the backend.
    pub fn decode_incoming(&self, raw: &str) -> Result<ChatMessage, CodecError> {
        if raw.is_empty() {
            return Err(CodecError::EmptyFrame);
        }
        if raw.len() > self.limits.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                limit: self.limits.max_frame_size,
                actual: raw.len(),
            });
        }
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    fn sample_message_json() -> String {
        r#"{
            "messageId": "m-42",
            "fromIp": "192.168.1.20",
            "fromSessionId": "s-7",
            "targetIp": "192.168.1.30",
            "messageType": "TEXT",
            "content": "ping",
            "timestamp": 1700000000123
        }"#
        .to_string()
    }

    #[test]
    fn decode_round_trips_wire_fields() {
        let codec = FrameCodec::default();
        let message = codec.decode_incoming(&sample_message_json()).unwrap();

        assert_eq!(message.message_id, "m-42");
        assert_eq!(message.target_ip.as_deref(), Some("192.168.1.30"));
        assert_eq!(message.message_type, MessageType::Text);
        assert_eq!(message.timestamp, 1_700_000_000_123);
    }

    #[test]
    fn decode_rejects_empty_frame() {
        let codec = FrameCodec::default();
        assert!(matches!(
            codec.decode_incoming(""),
            Err(CodecError::EmptyFrame)
        ));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let codec = FrameCodec::default();
        assert!(matches!(
            codec.decode_incoming("not json"),
            Err(CodecError::Serialization(_))
        ));
    }

    #[test]
    fn decode_rejects_oversized_frame() {
        let codec = FrameCodec::new(CodecLimits { max_frame_size: 16 });
        let result = codec.decode_incoming(&sample_message_json());
        assert!(matches!(
            result,
            Err(CodecError::FrameTooLarge { limit: 16, .. })
        ));
    }

    #[test]
    fn encode_rejects_oversized_frame() {
        let codec = FrameCodec::new(CodecLimits { max_frame_size: 32 });
        let frame = OutboundFrame::text("x".repeat(64), None);
        assert!(matches!(
            codec.encode_outbound(&frame),
            Err(CodecError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn encode_produces_wire_shape() {
        let codec = FrameCodec::default();
        let raw = codec
            .encode_outbound(&OutboundFrame::text("hello", None))
            .unwrap();
        assert_eq!(raw, r#"{"messageType":"TEXT","content":"hello"}"#);
    }
}
