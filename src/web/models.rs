use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatProxyRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatProxyResponse {
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One entry of the conversation sent upstream. Caller-supplied history that
/// is not exactly `{role, content}` with a known role is kept as raw JSON and
/// serialised back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTurn {
    Message(Message),
    Raw(Value),
}

impl ChatTurn {
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<Message>(value.clone()) {
            Ok(message) => ChatTurn::Message(message),
            Err(_) => ChatTurn::Raw(value),
        }
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            ChatTurn::Message(message) => Some(match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            }),
            ChatTurn::Raw(value) => value.get("role").and_then(Value::as_str),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            ChatTurn::Message(message) => Some(&message.content),
            ChatTurn::Raw(value) => value.get("content").and_then(Value::as_str),
        }
    }
}

impl From<Message> for ChatTurn {
    fn from(message: Message) -> Self {
        ChatTurn::Message(message)
    }
}
