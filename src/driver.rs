//! The streaming session driver.
//!
//! The driver owns the lifecycle of one outstanding request: it builds the
//! outbound context from a transcript snapshot, opens one stream on the
//! completion service, and feeds the cumulative text to a callback once per
//! chunk.  It holds no transcript state of its own, does not retry, and
//! cannot be cancelled once started.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;

use crate::accumulator::TextAccumulator;
use crate::error::Result;
use crate::observability::{DRIVER_CHUNKS, DRIVER_DURATION, DRIVER_TTFC};
use crate::service::{CompletionOptions, CompletionService, Turn};
use crate::types::Message;

/// Runs single streaming completions against a [`CompletionService`].
#[derive(Clone)]
pub struct StreamingSessionDriver {
    service: Arc<dyn CompletionService>,
    options: CompletionOptions,
}

impl StreamingSessionDriver {
    /// Creates a driver that calls `service` with the fixed `options`.
    pub fn new(service: Arc<dyn CompletionService>, options: CompletionOptions) -> Self {
        Self { service, options }
    }

    /// The options sent with every call.
    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Builds the prior context for a snapshot whose last element is the
    /// just-appended user message.
    ///
    /// The last message is sent separately as the new turn, and error
    /// messages describe local failures, so neither is replayed.
    pub fn build_prior_context(snapshot: &[Message]) -> Vec<Turn> {
        let Some((_, prior)) = snapshot.split_last() else {
            return Vec::new();
        };
        prior
            .iter()
            .filter(|message| !message.is_error)
            .map(Turn::from)
            .collect()
    }

    /// Streams one response.
    ///
    /// `on_chunk` is invoked synchronously with the cumulative text, once per
    /// chunk and in arrival order.  On normal completion the returned text
    /// equals the last value passed to `on_chunk` (empty if no chunk came).
    /// The first error, before or during the stream, ends the call.
    pub async fn send<F>(
        &self,
        snapshot: &[Message],
        user_text: &str,
        mut on_chunk: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        let prior = Self::build_prior_context(snapshot);
        let start = Instant::now();
        tracing::debug!(prior_turns = prior.len(), "starting completion");

        let mut chunks = self
            .service
            .start_stream(&prior, user_text, &self.options)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "completion failed to start"))?;

        let mut accumulator = TextAccumulator::new(self.service.chunk_convention());
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.inspect_err(|err| {
                tracing::warn!(
                    error = %err,
                    chunks = accumulator.chunks(),
                    "completion failed mid-stream"
                )
            })?;
            if accumulator.chunks() == 0 {
                DRIVER_TTFC.add(start.elapsed().as_secs_f64());
            }
            DRIVER_CHUNKS.click();
            on_chunk(accumulator.apply(&chunk));
        }

        DRIVER_DURATION.add(start.elapsed().as_secs_f64());
        tracing::debug!(
            chunks = accumulator.chunks(),
            chars = accumulator.text().chars().count(),
            "completion finished"
        );
        Ok(accumulator.into_text())
    }
}
