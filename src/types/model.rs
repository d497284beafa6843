use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model name or a custom string value for models
/// that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model names
    Known(KnownModel),

    /// Custom model identifier (for future or preview models)
    Custom(String),
}

/// Known Gemini model names
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini Flash-Lite (latest alias)
    #[serde(rename = "gemini-flash-lite-latest")]
    GeminiFlashLiteLatest,

    /// Gemini Flash (latest alias)
    #[serde(rename = "gemini-flash-latest")]
    GeminiFlashLatest,

    /// Gemini 2.5 Flash-Lite
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl KnownModel {
    const ALL: [KnownModel; 5] = [
        KnownModel::GeminiFlashLiteLatest,
        KnownModel::GeminiFlashLatest,
        KnownModel::Gemini25FlashLite,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25Pro,
    ];

    /// The wire name of the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::GeminiFlashLiteLatest => "gemini-flash-lite-latest",
            KnownModel::GeminiFlashLatest => "gemini-flash-latest",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string names no known model.
#[derive(Debug)]
pub struct UnknownModelError {
    /// The string that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for UnknownModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {}", self.invalid_value)
    }
}

impl std::error::Error for UnknownModelError {}

impl FromStr for KnownModel {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().strip_prefix("models/").unwrap_or(s.trim());
        KnownModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownModelError {
                invalid_value: s.to_string(),
            })
    }
}

impl FromStr for Model {
    type Err = UnknownModelError;

    /// Parses a known model name; fails for anything else so callers can
    /// decide whether to fall back to [`Model::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<KnownModel>().map(Model::Known)
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::GeminiFlashLiteLatest);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-flash-lite-latest""#);

        let model = Model::Known(KnownModel::Gemini25Pro);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-2.5-pro""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-2.5-flash""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini25Flash));

        let model: Model = serde_json::from_str(r#""gemini-9-ultra""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-9-ultra".to_string()));
    }

    #[test]
    fn parse_known_and_prefixed() {
        assert_eq!(
            "gemini-flash-latest".parse::<Model>().unwrap(),
            Model::Known(KnownModel::GeminiFlashLatest)
        );
        assert_eq!(
            "models/gemini-2.5-flash-lite".parse::<Model>().unwrap(),
            Model::Known(KnownModel::Gemini25FlashLite)
        );
        assert!("gpt-whatever".parse::<Model>().is_err());
    }

    #[test]
    fn display() {
        let model = Model::Known(KnownModel::GeminiFlashLiteLatest);
        assert_eq!(model.to_string(), "gemini-flash-lite-latest");

        let model = Model::Custom("gemini-exp-1206".to_string());
        assert_eq!(model.to_string(), "gemini-exp-1206");
    }
}
