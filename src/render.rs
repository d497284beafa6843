//! Output rendering for the chat application.
//!
//! The renderer is a transcript observer: it turns store events into
//! terminal output, printing only the newly arrived suffix of a streaming
//! reply.  ANSI styling is optional so output can be piped.

use std::io::{self, Stdout, Write};

use crate::persona::THINKING_INDICATOR;
use crate::transcript::{TranscriptEvent, TranscriptObserver};
use crate::types::{Message, MessageId, Role, SessionStatus};

/// ANSI escape code for dim text (used for the thinking indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the thinking indicator).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for speaker labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the user label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Erase the current terminal line and return to its start.
const ANSI_ERASE_LINE: &str = "\r\x1b[2K";

/// Label printed before model messages.
const MODEL_LABEL: &str = "Worst AI";

/// Label printed before user messages.
const USER_LABEL: &str = "You";

/// Trait for rendering chat output that is not a transcript event.
pub trait Renderer: Send {
    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a whole message with its speaker label.
    fn print_message(&mut self, message: &Message);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    indicator_shown: bool,
    streaming: Option<MessageId>,
    label_printed: bool,
    printed: String,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            indicator_shown: false,
            streaming: None,
            label_printed: false,
            printed: String::new(),
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn label(&self, role: Role) -> String {
        let (label, color) = match role {
            Role::User => (USER_LABEL, ANSI_GREEN),
            Role::Model => (MODEL_LABEL, ANSI_CYAN),
        };
        if self.use_color {
            format!("{color}{label}:{ANSI_RESET} ")
        } else {
            format!("{label}: ")
        }
    }

    fn write_error_text(&mut self, text: &str) {
        if self.use_color {
            let _ = write!(self.out, "{ANSI_RED}{text}{ANSI_RESET}");
        } else {
            let _ = write!(self.out, "{text}");
        }
    }

    fn show_indicator(&mut self) {
        if self.use_color {
            let _ = write!(
                self.out,
                "{ANSI_DIM}{ANSI_ITALIC}{THINKING_INDICATOR}{ANSI_RESET}"
            );
        } else {
            let _ = write!(self.out, "{THINKING_INDICATOR}");
        }
        self.indicator_shown = true;
        self.flush();
    }

    fn hide_indicator(&mut self) {
        if self.indicator_shown {
            if self.use_color {
                let _ = write!(self.out, "{ANSI_ERASE_LINE}");
            } else {
                let _ = writeln!(self.out);
            }
            self.indicator_shown = false;
        }
    }

    /// Prints the reply label once, replacing the indicator.
    fn begin_reply(&mut self) {
        if !self.label_printed {
            self.hide_indicator();
            let label = self.label(Role::Model);
            let _ = write!(self.out, "{label}");
            self.label_printed = true;
        }
    }

    fn stream_text(&mut self, text: &str) {
        self.begin_reply();
        match text.strip_prefix(self.printed.as_str()) {
            Some(suffix) => {
                let _ = write!(self.out, "{suffix}");
            }
            None => {
                // The provider rewrote earlier text; start the reply over.
                let label = self.label(Role::Model);
                let _ = write!(self.out, "\n{label}{text}");
            }
        }
        self.printed = text.to_string();
        self.flush();
    }

    fn end_reply(&mut self) {
        self.hide_indicator();
        if self.label_printed {
            let _ = writeln!(self.out);
        }
        self.streaming = None;
        self.label_printed = false;
        self.printed.clear();
        self.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_error(&mut self, error: &str) {
        self.write_error_text(&format!("Error: {error}"));
        let _ = writeln!(self.out);
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        let _ = writeln!(self.out, "{info}");
        self.flush();
    }

    fn print_message(&mut self, message: &Message) {
        let label = self.label(message.role());
        let _ = write!(self.out, "{label}");
        if message.is_error {
            self.write_error_text(&message.text);
        } else {
            let _ = write!(self.out, "{}", message.text);
        }
        let _ = writeln!(self.out);
        self.flush();
    }
}

impl<W: Write + Send> TranscriptObserver for PlainTextRenderer<W> {
    fn on_event(&mut self, event: &TranscriptEvent) {
        match event {
            TranscriptEvent::Appended(message) => {
                if message.role() == Role::Model && message.text.is_empty() {
                    self.streaming = Some(message.id());
                    self.label_printed = false;
                    self.printed.clear();
                }
            }
            TranscriptEvent::TextUpdated { id, text } => {
                if self.streaming == Some(*id) {
                    self.stream_text(text);
                }
            }
            TranscriptEvent::Errored { id, text } => {
                if self.streaming == Some(*id) {
                    if self.label_printed {
                        let _ = writeln!(self.out);
                    }
                    self.label_printed = false;
                    self.begin_reply();
                    self.write_error_text(text);
                    self.flush();
                }
            }
            TranscriptEvent::Cleared { greeting } => {
                self.end_reply();
                self.print_message(greeting);
            }
            TranscriptEvent::StatusChanged { to, .. } => match to {
                SessionStatus::AwaitingFirstToken => self.show_indicator(),
                SessionStatus::Streaming => {}
                SessionStatus::Idle => self.end_reply(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> PlainTextRenderer<Vec<u8>> {
        PlainTextRenderer::with_writer(Vec::new(), false)
    }

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn status(from: SessionStatus, to: SessionStatus) -> TranscriptEvent {
        TranscriptEvent::StatusChanged { from, to }
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn streams_only_new_suffix() {
        let mut renderer = plain();
        let reply = Message::placeholder();
        let id = reply.id();
        renderer.on_event(&status(SessionStatus::Idle, SessionStatus::AwaitingFirstToken));
        renderer.on_event(&TranscriptEvent::Appended(reply));
        renderer.on_event(&status(
            SessionStatus::AwaitingFirstToken,
            SessionStatus::Streaming,
        ));
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id,
            text: "2".to_string(),
        });
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id,
            text: "2+2=22".to_string(),
        });
        renderer.on_event(&status(SessionStatus::Streaming, SessionStatus::Idle));

        assert_eq!(
            output(renderer),
            format!("{THINKING_INDICATOR}\nWorst AI: 2+2=22\n")
        );
    }

    #[test]
    fn rewritten_text_is_reprinted() {
        let mut renderer = plain();
        let reply = Message::placeholder();
        let id = reply.id();
        renderer.on_event(&TranscriptEvent::Appended(reply));
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id,
            text: "Paris".to_string(),
        });
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id,
            text: "Berlin".to_string(),
        });
        renderer.on_event(&status(SessionStatus::Streaming, SessionStatus::Idle));

        assert_eq!(output(renderer), "Worst AI: Paris\nWorst AI: Berlin\n");
    }

    #[test]
    fn error_replaces_partial_reply() {
        let mut renderer = plain();
        let reply = Message::placeholder();
        let id = reply.id();
        renderer.on_event(&TranscriptEvent::Appended(reply));
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id,
            text: "Gravity is".to_string(),
        });
        renderer.on_event(&TranscriptEvent::Errored {
            id,
            text: "Error: overloaded".to_string(),
        });
        renderer.on_event(&status(SessionStatus::Streaming, SessionStatus::Idle));

        assert_eq!(
            output(renderer),
            "Worst AI: Gravity is\nWorst AI: Error: overloaded\n"
        );
    }

    #[test]
    fn updates_for_other_messages_are_ignored() {
        let mut renderer = plain();
        renderer.on_event(&TranscriptEvent::TextUpdated {
            id: MessageId::new(),
            text: "stale".to_string(),
        });
        renderer.on_event(&TranscriptEvent::Appended(Message::user("hi")));
        assert_eq!(output(renderer), "");
    }

    #[test]
    fn cleared_prints_greeting() {
        let mut renderer = plain();
        let greeting = Message::greeting();
        let text = greeting.text.clone();
        renderer.on_event(&TranscriptEvent::Cleared { greeting });
        assert_eq!(output(renderer), format!("Worst AI: {text}\n"));
    }

    #[test]
    fn print_message_styles_errors() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        let mut message = Message::model("broken");
        message.is_error = true;
        renderer.print_message(&message);
        let out = output(renderer);
        assert!(out.contains(ANSI_RED));
        assert!(out.contains("broken"));
    }
}
