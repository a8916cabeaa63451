use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChatMessage, ImageAttachment, Sender};

/// ========================================
/// Provider-neutral request protocol
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<Sender> for Role {
    fn from(s: Sender) -> Self {
        match s {
            Sender::User => Role::User,
            Sender::Assistant => Role::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(image: &ImageAttachment) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: BASE64_STANDARD.encode(&image.bytes),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 of the raw bytes.
    pub data: String,
}

/// One role-tagged segment of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![Part::text(text)] }
    }

    pub fn from_message(msg: &ChatMessage) -> Self {
        Self { role: msg.sender.into(), parts: vec![Part::text(msg.text.clone())] }
    }
}

/// Everything one model invocation needs. `response_schema` switches the
/// call to schema-constrained JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub contents: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl ModelRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self { system_instruction: None, contents: vec![Turn::user(text)], response_schema: None }
    }

    pub fn conversation(contents: Vec<Turn>) -> Self {
        Self { system_instruction: None, contents, response_schema: None }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Text of the last user turn; handy for logs and tests.
    pub fn last_user_text(&self) -> Option<&str> {
        self.contents
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .and_then(|t| t.parts.iter().find_map(Part::as_text))
    }
}

/// What `provider::invoke` hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Text(String),
    Structured(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_part_serializes_as_inline_data() {
        let img = ImageAttachment::new(vec![1, 2, 3], "image/png");
        let v = serde_json::to_value(Part::image(&img)).unwrap();
        assert_eq!(v, json!({ "inlineData": { "mimeType": "image/png", "data": "AQID" } }));
    }

    #[test]
    fn assistant_messages_map_to_model_role() {
        let t = Turn::from_message(&ChatMessage::assistant("Hi!"));
        assert_eq!(t.role, Role::Model);
        assert_eq!(serde_json::to_value(t.role).unwrap(), json!("model"));
    }

    #[test]
    fn last_user_text_skips_model_turns() {
        let req = ModelRequest::conversation(vec![
            Turn::user("first"),
            Turn { role: Role::Model, parts: vec![Part::text("reply")] },
            Turn::user("second"),
        ]);
        assert_eq!(req.last_user_text(), Some("second"));
    }
}
