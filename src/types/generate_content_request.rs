use serde::{Deserialize, Serialize};

use crate::types::Content;

/// Controls the model's internal reasoning.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for thinking; zero disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<u32>,
}

impl ThinkingConfig {
    /// A configuration that turns thinking off.
    pub fn disabled() -> Self {
        Self {
            thinking_budget: Some(0),
        }
    }

    /// A configuration with the given thinking budget.
    pub fn with_budget(budget: u32) -> Self {
        Self {
            thinking_budget: Some(budget),
        }
    }
}

/// Sampling configuration for a generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Thinking configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Body of a `generateContent` / `streamGenerateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Prior turns followed by the new user turn.
    pub contents: Vec<Content>,

    /// Persona / system instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Sampling configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a request for the given turns.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::instruction(text));
        self
    }

    /// Sets the generation configuration.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn request_uses_camel_case() {
        let request = GenerateContentRequest::new(vec![Content::new(Role::User, "hi")])
            .with_system_instruction("be wrong")
            .with_generation_config(GenerationConfig {
                temperature: Some(1.5),
                thinking_config: Some(ThinkingConfig::disabled()),
            });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be wrong");
        assert_eq!(value["generationConfig"]["temperature"], 1.5);
        assert_eq!(
            value["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );
    }

    #[test]
    fn empty_config_is_omitted() {
        let request = GenerateContentRequest::new(Vec::new());
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"contents":[]}"#);
    }
}
