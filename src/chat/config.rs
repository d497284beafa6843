//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration a chat session runs with.  The persona, temperature and
//! thinking budget are fixed for the life of a session.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::persona::{
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_THINKING_BUDGET, SYSTEM_INSTRUCTION,
};
use crate::service::CompletionOptions;
use crate::types::Model;

/// Command-line arguments for the blunder-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-flash-lite-latest)", "MODEL")]
    pub model: Option<String>,

    /// Override the API base URL.
    #[arrrg(optional, "API base URL (default: the public Gemini endpoint)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// The persona sent as the system instruction.
    pub system_prompt: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Thinking budget; `Some(0)` disables thinking.
    pub thinking_budget: Option<u32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// API base URL override.
    pub base_url: Option<String>,

    /// Request timeout override.
    pub timeout: Option<Duration>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-flash-lite-latest
    /// - Persona: the "Worst AI Ever" instruction
    /// - Temperature: 1.2
    /// - Thinking: disabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(DEFAULT_MODEL),
            system_prompt: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
            use_color: true,
            base_url: None,
            timeout: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the persona.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the thinking budget.
    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The options bundle sent with every completion.
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions::default()
            .with_system_persona(self.system_prompt.clone())
            .with_temperature(self.temperature)
            .with_thinking_budget(self.thinking_budget)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or(Model::Known(DEFAULT_MODEL));

        ChatConfig {
            model,
            use_color: !args.no_color,
            base_url: args.base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
            ..ChatConfig::new()
        }
    }
}
