//! Integration tests for the blunder library against the live Gemini API.
//! These tests require an API key in the environment to run.

#[cfg(test)]
mod tests {
    use blunder::chat::{ChatConfig, ChatSession, TurnOutcome};
    use blunder::{CompletionOptions, CompletionService, Gemini, SessionStatus};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_streaming_response() {
        // This test requires GEMINI_API_KEY to be set
        let api_key = std::env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("Skipping test: GEMINI_API_KEY not set");
            return;
        }

        let client = Gemini::new(api_key).expect("Failed to create client");
        let mut chunks = client
            .start_stream(&[], "What is 2+2?", &CompletionOptions::default())
            .await
            .expect("Stream request should succeed");

        let mut received = String::new();
        while let Some(chunk) = chunks.next().await {
            received.push_str(&chunk.expect("chunk should arrive"));
        }
        assert!(!received.is_empty(), "Expected some streamed text");
    }

    #[tokio::test]
    async fn test_session_turn() {
        let api_key = std::env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("Skipping test: GEMINI_API_KEY not set");
            return;
        }

        let client = Gemini::new(api_key).expect("Failed to create client");
        let mut session = ChatSession::new(client, ChatConfig::default());
        let outcome = session
            .submit("What is the capital of France?")
            .await
            .expect("submit should be accepted");

        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.messages().len(), 3);
        match outcome {
            TurnOutcome::Completed { text, .. } => {
                assert_eq!(session.messages()[2].text, text);
            }
            TurnOutcome::Failed { error, .. } => {
                // Quota and overload errors still leave a usable transcript.
                assert!(session.messages()[2].is_error, "{error}");
            }
        }
    }
}
