//! Text-generation seam used by every AI command.
//!
//! [`TextGenerator`] is the request/response contract, [`ChatSession`] is the
//! multi-turn variant, and [`GeneratorFactory`] builds a generator from a
//! credential so the dispatcher can rebuild its client after setup.

use crate::error::{GenieError, GenieResult};
use async_trait::async_trait;
use tracing::info;

/// Prompt sent when checking that a credential works.
pub const VALIDATION_PROMPT: &str = "Hello! This is a test.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    async fn generate(&self, prompt: &str) -> GenieResult<String>;

    /// Opens a conversation seeded with `history`.
    fn start_session(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession>;

    /// Checks the credential with a throwaway request.
    async fn validate(&self) -> GenieResult<()> {
        let text = self
            .generate(VALIDATION_PROMPT)
            .await
            .map_err(|e| GenieError::SetupValidation(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(GenieError::SetupValidation("Invalid API response".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
pub trait ChatSession: Send {
    /// Sends one user message and returns the reply. History is kept only
    /// for turns that succeed.
    async fn send(&mut self, message: &str) -> GenieResult<String>;
}

/// Builds generators from a credential.
pub trait GeneratorFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Box<dyn TextGenerator>;
}

// =============================================================================
// Mock mode (GENIE_USE_MOCK)
// =============================================================================

/// Deterministic offline generator.
///
/// Echoes prompts back so output can be asserted on. Keys containing
/// "invalid" are rejected like a revoked key would be.
pub struct MockGenerator {
    api_key: String,
}

impl MockGenerator {
    pub fn new(api_key: &str) -> Self {
        Self { api_key: api_key.to_string() }
    }

    fn check_key(&self) -> GenieResult<()> {
        if self.api_key.to_lowercase().contains("invalid") {
            return Err(GenieError::Remote(
                "API key not valid. Please pass a valid API key.".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> GenieResult<String> {
        self.check_key()?;
        Ok(format!("[mock] {}", prompt))
    }

    fn start_session(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
        Box::new(MockSession {
            history,
            key_ok: self.check_key().is_ok(),
        })
    }
}

struct MockSession {
    history: Vec<ChatTurn>,
    key_ok: bool,
}

#[async_trait]
impl ChatSession for MockSession {
    async fn send(&mut self, message: &str) -> GenieResult<String> {
        if !self.key_ok {
            return Err(GenieError::Remote("API key not valid.".to_string()));
        }
        let reply = format!("[mock reply {}] {}", self.history.len() / 2 + 1, message);
        self.history.push(ChatTurn::user(message));
        self.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }
}

pub struct MockGeneratorFactory;

impl GeneratorFactory for MockGeneratorFactory {
    fn connect(&self, api_key: &str) -> Box<dyn TextGenerator> {
        info!("Using mock generator (GENIE_USE_MOCK=1)");
        Box::new(MockGenerator::new(api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generate_echoes_prompt() {
        let generator = MockGenerator::new("AIzaGood");
        let text = generator.generate("Summarize this").await.unwrap();
        assert_eq!(text, "[mock] Summarize this");
    }

    #[tokio::test]
    async fn test_validate_succeeds_for_good_key() {
        let generator = MockGeneratorFactory.connect("AIzaGood");
        assert!(generator.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_maps_remote_failure_to_setup_error() {
        let generator = MockGeneratorFactory.connect("AIzaInvalidKey");
        let err = generator.validate().await.unwrap_err();
        assert!(matches!(err, GenieError::SetupValidation(_)));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_text() {
        struct Blank;

        #[async_trait]
        impl TextGenerator for Blank {
            async fn generate(&self, _prompt: &str) -> GenieResult<String> {
                Ok("   ".to_string())
            }

            fn start_session(&self, _history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
                unreachable!("not used")
            }
        }

        let err = Blank.validate().await.unwrap_err();
        assert!(err.to_string().contains("Invalid API response"));
    }

    #[tokio::test]
    async fn test_mock_session_counts_turns() {
        let generator = MockGenerator::new("AIzaGood");
        let mut session = generator.start_session(Vec::new());
        assert_eq!(session.send("hi").await.unwrap(), "[mock reply 1] hi");
        assert_eq!(session.send("again").await.unwrap(), "[mock reply 2] again");
    }
}
