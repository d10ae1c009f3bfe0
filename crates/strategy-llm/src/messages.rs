//! Message types for LLM communication
//!
//! The pipeline only ever exchanges plain text with the model, so a message
//! is a role plus a text body. Providers translate these into their own
//! wire formats.

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Instructions; Gemini carries these outside the message list
    System,
}

/// One turn of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Build a message for `role`
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Body of the message
    pub fn text(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Message::user("Hello").role, Role::User);
        assert_eq!(Message::assistant("Hi there").role, Role::Assistant);
        assert_eq!(Message::new(Role::System, "Be brief").text(), "Be brief");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(Message::system("Be brief")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "system", "content": "Be brief" }));
    }
}
