// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON message codec.
//!
//! Decoding rules:
//! - An empty or whitespace-only payload is the default instance.
//! - Anything else must be a JSON object. For the Empty type the object's
//!   content is ignored.
//!
//! Encoding goes through `serde_json::Value`, so object keys come out sorted
//! and every field is present at its current (possibly default) value.

use crate::message::{DynMessage, MessageType};
use crate::schema::MethodDescriptor;
use serde_json::Value;
use thiserror::Error;

/// Payload could not be converted to or from a message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload does not parse as the expected message.
    #[error("failed to decode {message}: {source}")]
    Decode {
        /// Message type being decoded.
        message: &'static str,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The payload is valid JSON but not an object.
    #[error("failed to decode {message}: expected a JSON object, found {found}")]
    NotAnObject {
        /// Message type being decoded.
        message: &'static str,
        /// Kind of JSON value found instead.
        found: &'static str,
    },
    /// The message could not be serialized.
    #[error("failed to encode {message}: {source}")]
    Encode {
        /// Message type being encoded.
        message: &'static str,
        /// Serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// Decode `raw` as an instance of `message_type`.
pub fn decode_message(
    message_type: MessageType,
    raw: &str,
) -> Result<Box<dyn DynMessage>, CodecError> {
    if raw.trim().is_empty() {
        return Ok(message_type.new_instance());
    }
    let decode_err = |source| CodecError::Decode {
        message: message_type.full_name(),
        source,
    };
    let value: Value = serde_json::from_str(raw).map_err(decode_err)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject {
            message: message_type.full_name(),
            found: json_kind(&value),
        });
    }
    if message_type.is_empty() {
        return Ok(message_type.new_instance());
    }
    message_type.from_json(value).map_err(decode_err)
}

/// Decode the input message of `method` from `raw`.
pub fn decode_input(
    method: &MethodDescriptor,
    raw: &str,
) -> Result<Box<dyn DynMessage>, CodecError> {
    decode_message(method.input_type(), raw)
}

/// Encode a message as compact JSON.
pub fn encode_output(message: &dyn DynMessage) -> Result<String, CodecError> {
    let value = to_value(message)?;
    serde_json::to_string(&value).map_err(|source| encode_err(message, source))
}

/// Encode a message as indented JSON.
pub fn encode_output_pretty(message: &dyn DynMessage) -> Result<String, CodecError> {
    let value = to_value(message)?;
    serde_json::to_string_pretty(&value).map_err(|source| encode_err(message, source))
}

fn to_value(message: &dyn DynMessage) -> Result<Value, CodecError> {
    message.to_json().map_err(|source| encode_err(message, source))
}

fn encode_err(message: &dyn DynMessage, source: serde_json::Error) -> CodecError {
    CodecError::Encode {
        message: message.full_name(),
        source,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::message::{Empty, Message};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Build {
        target: String,
        jobs: u32,
        flags: Vec<String>,
    }

    impl Message for Build {
        const FULL_NAME: &'static str = "test.Build";
    }

    #[test]
    fn blank_payload_decodes_to_default() {
        let msg = decode_message(MessageType::of::<Build>(), "  \n").unwrap();
        assert_eq!(msg.downcast_ref::<Build>(), Some(&Build::default()));
    }

    #[test]
    fn partial_payload_leaves_other_fields_default() {
        let msg = decode_message(MessageType::of::<Build>(), r#"{"target":"eve"}"#).unwrap();
        let build = msg.downcast_ref::<Build>().unwrap();
        assert_eq!(build.target, "eve");
        assert_eq!(build.jobs, 0);
    }

    #[test]
    fn empty_type_ignores_content_but_not_syntax() {
        let msg = decode_message(MessageType::empty(), r#"{"id":"Input ID"}"#).unwrap();
        assert!(msg.downcast_ref::<Empty>().is_some());

        let err = decode_message(MessageType::empty(), "{not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode { message: "google.protobuf.Empty", .. }));
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        let err = decode_message(MessageType::of::<Build>(), r#"["eve", 4]"#).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { found: "an array", .. }));

        let err = decode_message(MessageType::empty(), "42").unwrap_err();
        assert!(matches!(
            err,
            CodecError::NotAnObject { message: "google.protobuf.Empty", found: "a number" }
        ));
        assert_eq!(
            err.to_string(),
            "failed to decode google.protobuf.Empty: expected a JSON object, found a number"
        );
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let err = decode_message(MessageType::of::<Build>(), r#"{"jobs":"many"}"#).unwrap_err();
        assert!(err.to_string().starts_with("failed to decode test.Build"));
    }

    #[test]
    fn encoding_includes_default_fields_in_key_order() {
        let encoded = encode_output(&Build {
            target: "eve".into(),
            ..Build::default()
        })
        .unwrap();
        assert_eq!(encoded, r#"{"flags":[],"jobs":0,"target":"eve"}"#);
        assert_eq!(encode_output(&Empty {}).unwrap(), "{}");
    }
}
