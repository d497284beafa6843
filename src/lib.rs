// Public modules
pub mod accumulator;
pub mod chat;
pub mod client;
pub mod driver;
pub mod error;
pub mod observability;
pub mod persona;
pub mod render;
pub mod service;
pub mod transcript;
pub mod types;

mod sse;

// Re-exports
pub use accumulator::{ChunkConvention, TextAccumulator};
pub use client::Gemini;
pub use driver::StreamingSessionDriver;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use service::{ChunkStream, CompletionOptions, CompletionService, Turn};
pub use transcript::{SubscriptionId, TranscriptEvent, TranscriptObserver, TranscriptStore};
pub use types::*;
