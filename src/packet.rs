use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;
use crate::method::InteractiveMethod;

/// An outbound method call.
#[derive(Debug, Clone, Serialize)]
pub struct MethodPacket {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: PacketType,
    pub method: InteractiveMethod,
    pub params: Value,
    pub discard: bool,
    pub seq: u32,
}

/// An inbound or outbound reply to a method call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyPacket {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: PacketType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
    pub seq: u32,
}

/// A server-initiated method call, i.e. a pushed event or a rare peer call.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMethodPacket {
    #[serde(default)]
    pub id: Option<u32>,
    pub method: InteractiveMethod,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub discard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketType {
    Method,
    Reply,
}

/// The `{code, message, path}` error shape carried by a reply packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A decoded frame, classified by the codec. Unrecognized `type` values are
/// dropped with a warning by the caller rather than represented here.
pub enum DecodedFrame {
    Reply(ReplyPacket),
    Inbound(InboundMethodPacket),
}

/// Parses a single wire frame, which is either one packet object or a JSON
/// array of packet objects. Each element is classified by its `type` field;
/// elements whose `type` is neither `method` nor `reply` are dropped.
pub fn decode_frame(text: &str) -> Result<Vec<DecodedFrame>, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let elements: Vec<Value> = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut decoded = Vec::with_capacity(elements.len());
    for element in elements {
        match decode_element(element)? {
            Some(frame) => decoded.push(frame),
            None => tracing::warn!("dropping frame with unrecognized `type`"),
        }
    }
    Ok(decoded)
}

fn decode_element(mut value: Value) -> Result<Option<DecodedFrame>, CodecError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);

    match kind.as_deref() {
        Some("reply") => {
            let reply: ReplyPacket = serde_json::from_value(value)?;
            Ok(Some(DecodedFrame::Reply(reply)))
        }
        Some("method") => {
            if let Some(obj) = value.as_object_mut() {
                obj.remove("type");
            }
            let inbound: InboundMethodPacket = serde_json::from_value(value)?;
            Ok(Some(DecodedFrame::Inbound(inbound)))
        }
        _ => Ok(None),
    }
}

/// Serializes an outbound method packet to its canonical wire form.
pub fn encode_method(packet: &MethodPacket) -> Result<String, CodecError> {
    Ok(serde_json::to_string(packet)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_packet_round_trips_core_fields() {
        let packet = MethodPacket {
            id: 7,
            kind: PacketType::Method,
            method: InteractiveMethod::CreateScenes,
            params: json!({"scenes": []}),
            discard: false,
            seq: 1,
        };
        let encoded = encode_method(&packet).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "method");
        assert_eq!(value["method"], "createScenes");
        assert_eq!(value["discard"], false);
        assert_eq!(value["seq"], 1);
    }

    #[test]
    fn reply_with_result_decodes() {
        let text = r#"{"type":"reply","id":3,"result":{"ok":true},"seq":9}"#;
        let frames = decode_frame(text).unwrap();
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            DecodedFrame::Reply(reply) => {
                assert_eq!(reply.id, 3);
                assert!(reply.error.is_none());
                assert_eq!(reply.result.as_ref().unwrap()["ok"], true);
            }
            DecodedFrame::Inbound(_) => panic!("expected a reply frame"),
        }
    }

    #[test]
    fn reply_with_error_decodes() {
        let text = r#"{"type":"reply","id":3,"error":{"code":4011,"message":"duplicate scene"},"seq":9}"#;
        let frames = decode_frame(text).unwrap();
        match &frames[0] {
            DecodedFrame::Reply(reply) => {
                let err = reply.error.as_ref().unwrap();
                assert_eq!(err.code, 4011);
                assert_eq!(err.path, None);
            }
            DecodedFrame::Inbound(_) => panic!("expected a reply frame"),
        }
    }

    #[test]
    fn batch_frame_decodes_each_element() {
        let text = r#"[
            {"type":"reply","id":1,"result":null,"seq":1},
            {"type":"method","method":"onReady","params":{"isReady":true}}
        ]"#;
        let frames = decode_frame(text).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn unrecognized_type_is_dropped_not_erroring() {
        let text = r#"[{"type":"ping"},{"type":"reply","id":1,"result":1,"seq":1}]"#;
        let frames = decode_frame(text).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn unset_optional_fields_are_omitted_not_null() {
        let packet = ReplyPacket {
            id: 1,
            kind: PacketType::Reply,
            result: Some(json!(1)),
            error: None,
            seq: 1,
        };
        let encoded = serde_json::to_string(&packet).unwrap();
        assert!(!encoded.contains("error"));
    }
}
