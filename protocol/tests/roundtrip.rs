use protocol::codec::{CodecError, CodecLimits, FrameCodec};
use protocol::message::{ChatMessage, MessageType, OutboundFrame};

fn sample_broadcast() -> ChatMessage {
    ChatMessage {
        message_id: "m-100".to_string(),
        from_ip: "10.1.0.4".to_string(),
        from_session_id: "s-12".to_string(),
        target_ip: None,
        message_type: MessageType::Text,
        content: "room-wide hello".to_string(),
        timestamp: 1_700_000_100_000,
    }
}

#[test]
fn incoming_text_frame_decodes() {
    let codec = FrameCodec::default();
    let raw = r#"{
        "messageId": "m-100",
        "fromIp": "10.1.0.4",
        "fromSessionId": "s-12",
        "messageType": "TEXT",
        "content": "room-wide hello",
        "timestamp": 1700000100000
    }"#;

    let message = codec.decode_incoming(raw).unwrap();
    assert_eq!(message, sample_broadcast());
}

#[test]
fn incoming_heartbeat_frame_decodes() {
    let codec = FrameCodec::default();
    let raw = r#"{
        "messageId": "hb-1",
        "fromIp": "10.1.0.1",
        "fromSessionId": "s-0",
        "messageType": "HEARTBEAT",
        "content": "",
        "timestamp": 1700000000000
    }"#;

    let message = codec.decode_incoming(raw).unwrap();
    assert_eq!(message.message_type, MessageType::Heartbeat);
    assert!(!message.is_direct());
}

#[test]
fn direct_message_target_survives_the_wire() {
    let codec = FrameCodec::default();
    let mut message = sample_broadcast();
    message.target_ip = Some("10.1.0.9".to_string());

    let raw = serde_json::to_string(&message).unwrap();
    let decoded = codec.decode_incoming(&raw).unwrap();

    assert!(decoded.is_direct());
    assert_eq!(decoded, message);
}

#[test]
fn unknown_message_type_is_rejected() {
    let codec = FrameCodec::default();
    let raw = r#"{
        "messageId": "m-1",
        "fromIp": "10.1.0.4",
        "fromSessionId": "s-12",
        "messageType": "VOICE",
        "content": "x",
        "timestamp": 1
    }"#;

    assert!(matches!(
        codec.decode_incoming(raw),
        Err(CodecError::Serialization(_))
    ));
}

#[test]
fn missing_required_field_is_rejected() {
    let codec = FrameCodec::default();
    // No messageId.
    let raw = r#"{
        "fromIp": "10.1.0.4",
        "fromSessionId": "s-12",
        "messageType": "TEXT",
        "content": "x",
        "timestamp": 1
    }"#;

    assert!(matches!(
        codec.decode_incoming(raw),
        Err(CodecError::Serialization(_))
    ));
}

#[test]
fn unknown_extra_fields_are_tolerated() {
    let codec = FrameCodec::default();
    let raw = r#"{
        "messageId": "m-1",
        "fromIp": "10.1.0.4",
        "fromSessionId": "s-12",
        "messageType": "SYSTEM",
        "content": "user joined",
        "timestamp": 1,
        "roomId": "lobby"
    }"#;

    let message = codec.decode_incoming(raw).unwrap();
    assert_eq!(message.message_type, MessageType::System);
}

#[test]
fn outbound_frame_matches_backend_contract() {
    let codec = FrameCodec::default();
    let raw = codec
        .encode_outbound(&OutboundFrame::text("hi", Some("10.1.0.9".to_string())))
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["messageType"], "TEXT");
    assert_eq!(value["content"], "hi");
    assert_eq!(value["targetIp"], "10.1.0.9");
}

#[test]
fn rejects_frames_beyond_the_size_limit() {
    let codec = FrameCodec::new(CodecLimits {
        max_frame_size: 128,
    });

    let mut message = sample_broadcast();
    message.content = "x".repeat(256);
    let raw = serde_json::to_string(&message).unwrap();

    assert!(matches!(
        codec.decode_incoming(&raw),
        Err(CodecError::FrameTooLarge { limit: 128, .. })
    ));
}
