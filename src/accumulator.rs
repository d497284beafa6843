//! Turns provider chunks into cumulative text.
//!
//! Providers disagree on whether a streamed chunk carries only the new text or
//! everything generated so far.  This is the one place that knows the
//! difference; everything downstream sees the cumulative value.

use serde::{Deserialize, Serialize};

/// How a provider's chunks relate to the text generated so far.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkConvention {
    /// Each chunk carries only the newly generated text.
    #[default]
    Delta,

    /// Each chunk carries all text generated so far.
    Cumulative,
}

/// Running text of one streamed response.
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    convention: ChunkConvention,
    text: String,
    chunks: usize,
}

impl TextAccumulator {
    /// Creates an empty accumulator for the given convention.
    pub fn new(convention: ChunkConvention) -> Self {
        Self {
            convention,
            text: String::new(),
            chunks: 0,
        }
    }

    /// Applies one chunk and returns the cumulative text after it.
    pub fn apply(&mut self, chunk: &str) -> &str {
        match self.convention {
            ChunkConvention::Delta => self.text.push_str(chunk),
            ChunkConvention::Cumulative => {
                self.text.clear();
                self.text.push_str(chunk);
            }
        }
        self.chunks += 1;
        &self.text
    }

    /// The cumulative text so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How many chunks have been applied.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Consumes the accumulator, returning the final text.
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_chunks_append() {
        let mut acc = TextAccumulator::new(ChunkConvention::Delta);
        assert_eq!(acc.apply("2"), "2");
        assert_eq!(acc.apply("+2=22"), "2+2=22");
        assert_eq!(acc.chunks(), 2);
        assert_eq!(acc.into_text(), "2+2=22");
    }

    #[test]
    fn cumulative_chunks_replace() {
        let mut acc = TextAccumulator::new(ChunkConvention::Cumulative);
        assert_eq!(acc.apply("2"), "2");
        assert_eq!(acc.apply("2+2=22"), "2+2=22");
        assert_eq!(acc.text(), "2+2=22");
        assert_eq!(acc.chunks(), 2);
    }

    #[test]
    fn both_conventions_agree_on_the_same_response() {
        let deltas = ["The sun ", "is a giant ", "bulb."];
        let mut delta = TextAccumulator::new(ChunkConvention::Delta);
        let mut cumulative = TextAccumulator::new(ChunkConvention::Cumulative);
        let mut running = String::new();
        for piece in deltas {
            running.push_str(piece);
            assert_eq!(delta.apply(piece), cumulative.apply(&running));
        }
        assert_eq!(delta.into_text(), "The sun is a giant bulb.");
    }

    #[test]
    fn empty_accumulator() {
        let acc = TextAccumulator::default();
        assert_eq!(acc.text(), "");
        assert_eq!(acc.chunks(), 0);
    }
}
