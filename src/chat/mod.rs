//! Chat application module for interactive conversations with the Worst AI.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! blunder transcript store and session driver. It supports:
//!
//! - Streaming responses with real-time token display
//! - Slash commands for session control
//! - Configurable model, endpoint, and timeout
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: One transcript plus one in-flight turn at a time
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, SessionStats, TurnOutcome};
