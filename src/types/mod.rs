// Public modules
pub mod content;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod message;
pub mod model;
pub mod status;

// Re-exports
pub use content::{Content, Part};
pub use generate_content_request::{GenerateContentRequest, GenerationConfig, ThinkingConfig};
pub use generate_content_response::{
    ApiErrorDetail, Candidate, GenerateContentResponse, PromptFeedback, UsageMetadata,
};
pub use message::{Message, MessageId, Role};
pub use model::{KnownModel, Model, UnknownModelError};
pub use status::SessionStatus;
