use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One piece of a turn's content.
///
/// Only text parts are produced or consumed here.  `thought` marks reasoning
/// summaries, which never become transcript text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// The text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Whether this part is a thought summary rather than answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }

    /// Returns the answer text carried by this part, if any.
    pub fn answer_text(&self) -> Option<&str> {
        if self.thought.unwrap_or(false) {
            return None;
        }
        self.text.as_deref()
    }
}

/// A turn of conversation as the Gemini API represents it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The author of the turn; absent for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The parts making up the turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part text turn.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a role-less content, as used for the system instruction.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the answer text of every part.
    pub fn answer_text(&self) -> String {
        self.parts.iter().filter_map(Part::answer_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_serialization() {
        let content = Content::new(Role::User, "hi");
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"{"role":"user","parts":[{"text":"hi"}]}"#);
    }

    #[test]
    fn instruction_has_no_role() {
        let content = Content::instruction("be wrong");
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"{"parts":[{"text":"be wrong"}]}"#);
    }

    #[test]
    fn thoughts_are_not_answer_text() {
        let content: Content = serde_json::from_str(
            r#"{"role":"model","parts":[{"text":"hmm","thought":true},{"text":"2+2"},{"text":"=22"}]}"#,
        )
        .unwrap();
        assert_eq!(content.answer_text(), "2+2=22");
    }
}
