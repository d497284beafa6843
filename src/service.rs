//! The external completion service as seen by the driver.
//!
//! A service takes prior turns, a new user turn and fixed options, and
//! returns a stream of text chunks.  [`crate::Gemini`] is the production
//! implementation; tests script their own.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::accumulator::ChunkConvention;
use crate::error::Result;
use crate::persona::{DEFAULT_TEMPERATURE, DEFAULT_THINKING_BUDGET, SYSTEM_INSTRUCTION};
use crate::types::{Content, Message, Role};

/// A stream of text chunks, ending normally or with one error.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// One turn of prior context: who said what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The author.
    pub role: Role,
    /// The text.
    pub text: String,
}

impl Turn {
    /// Create a turn.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

impl From<&Message> for Turn {
    fn from(message: &Message) -> Self {
        Self::new(message.role(), message.text.clone())
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content::new(turn.role, turn.text.clone())
    }
}

/// Per-call configuration bundle.  Constant for the life of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// The persona / system instruction text.
    pub system_persona: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Thinking budget; `Some(0)` disables thinking, `None` leaves the model default.
    pub thinking_budget: Option<u32>,
}

impl CompletionOptions {
    /// Sets the persona text.
    pub fn with_system_persona(mut self, persona: impl Into<String>) -> Self {
        self.system_persona = persona.into();
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the thinking budget.
    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            system_persona: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
        }
    }
}

/// A hosted model that streams completions.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Opens one streaming completion.
    ///
    /// Errors may occur here (before any chunk) or as an item of the stream.
    async fn start_stream(
        &self,
        prior_history: &[Turn],
        new_turn: &str,
        options: &CompletionOptions,
    ) -> Result<ChunkStream>;

    /// How this service's chunks relate to the text so far.
    fn chunk_convention(&self) -> ChunkConvention {
        ChunkConvention::Delta
    }
}
