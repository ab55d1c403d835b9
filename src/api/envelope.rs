use serde::{Deserialize, Serialize};

/// `{success, message, data}` shape every backend endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: message.into(), data: Some(data) }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None }
    }

    /// Message to show the user, or `fallback` when the backend sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() { fallback.to_string() } else { self.message.clone() }
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenData {
    pub token: String,
}
