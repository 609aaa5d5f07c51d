//! First-run credential setup.
//!
//! A linear state machine: prompt for a key, validate it against the remote
//! service, persist it, hand back a client built from it. Any failure lands in
//! [`SetupState::Failed`], the only exit besides [`SetupState::Ready`], and
//! nothing is written to the store on that path.

use crate::config::{Config, ConfigStore};
use crate::error::{GenieError, GenieResult};
use crate::prompter::Prompter;
use crate::text_generator::{GeneratorFactory, TextGenerator};
use crate::ui::{self, Spinner};
use tracing::{info, warn};

pub const API_KEY_PREFIX: &str = "AIza";
const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

pub enum SetupState {
    Prompting,
    Validating(String),
    Persisting {
        api_key: String,
        client: Box<dyn TextGenerator>,
    },
    Ready(Box<dyn TextGenerator>),
    Failed(GenieError),
}

/// Checks the shape of a key before any network call is made.
pub fn check_key_format(input: &str) -> GenieResult<&str> {
    let key = input.trim();
    if key.is_empty() {
        return Err(GenieError::UserInput("API key is required!".to_string()));
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(GenieError::UserInput(format!(
            "Invalid API key format. Should start with \"{}\"",
            API_KEY_PREFIX
        )));
    }
    Ok(key)
}

pub struct CredentialSetup<'a> {
    prompter: &'a mut dyn Prompter,
    factory: &'a dyn GeneratorFactory,
    store: &'a ConfigStore,
    config: &'a mut Config,
}

impl<'a> CredentialSetup<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        factory: &'a dyn GeneratorFactory,
        store: &'a ConfigStore,
        config: &'a mut Config,
    ) -> Self {
        Self {
            prompter,
            factory,
            store,
            config,
        }
    }

    /// Drives the machine to a terminal state.
    pub async fn run(mut self) -> GenieResult<Box<dyn TextGenerator>> {
        let mut state = SetupState::Prompting;
        loop {
            state = match state {
                SetupState::Prompting => match self.prompt_for_key() {
                    Ok(api_key) => SetupState::Validating(api_key),
                    Err(e) => SetupState::Failed(e),
                },
                SetupState::Validating(api_key) => self.validate(api_key).await,
                SetupState::Persisting { api_key, client } => self.persist(api_key, client),
                SetupState::Ready(client) => return Ok(client),
                SetupState::Failed(e) => {
                    warn!("Credential setup failed: {}", e);
                    return Err(e);
                }
            };
        }
    }

    fn prompt_for_key(&mut self) -> GenieResult<String> {
        self.prompter
            .say("🚀 To use AI features, you need a Google Gemini API key.")?;
        self.prompter
            .say(&format!("Get yours free at: {}", API_KEY_URL))?;
        self.prompter.say("")?;

        loop {
            let input = self.prompter.secret("🔑 Enter your Gemini API key:")?;
            match check_key_format(&input) {
                Ok(key) => return Ok(key.to_string()),
                Err(e) => self.prompter.say(&e.to_string())?,
            }
        }
    }

    async fn validate(&mut self, api_key: String) -> SetupState {
        let spinner = Spinner::new("🧪 Testing API key...");
        let client = self.factory.connect(&api_key);

        match client.validate().await {
            Ok(()) => {
                spinner.stop();
                match self.prompter.say(&ui::success_line("✅ API key validated!")) {
                    Ok(()) => SetupState::Persisting { api_key, client },
                    Err(e) => SetupState::Failed(e),
                }
            }
            Err(e) => {
                spinner.fail("❌ Invalid API key");
                let message = match e {
                    GenieError::SetupValidation(message) => message,
                    other => other.to_string(),
                };
                SetupState::Failed(GenieError::SetupValidation(message))
            }
        }
    }

    fn persist(&mut self, api_key: String, client: Box<dyn TextGenerator>) -> SetupState {
        let mut updated = self.config.clone();
        updated.set_api_key(api_key);

        match self.store.save(&updated) {
            Ok(()) => {
                *self.config = updated;
                info!("Gemini API key stored at {}", self.store.path().display());
                let done = ui::success_line("🎉 You're all set! AI features are now available.");
                match self.prompter.say(&done) {
                    Ok(()) => SetupState::Ready(client),
                    Err(e) => SetupState::Failed(e),
                }
            }
            Err(e) => SetupState::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompter::LinePrompter;
    use crate::text_generator::MockGeneratorFactory;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: ConfigStore,
        config: Config,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        Fixture {
            _dir: dir,
            store,
            config: Config::default(),
        }
    }

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_check_key_format() {
        assert_eq!(check_key_format("  AIzaSyKey \n").unwrap(), "AIzaSyKey");
        assert!(check_key_format("   ").unwrap_err().to_string().contains("required"));
        assert!(check_key_format("sk-123").unwrap_err().to_string().contains("AIza"));
    }

    #[tokio::test]
    async fn test_valid_key_is_persisted() {
        let mut fx = fixture();
        let mut p = prompter("AIzaGoodKey\n");

        let result =
            CredentialSetup::new(&mut p, &MockGeneratorFactory, &fx.store, &mut fx.config)
                .run()
                .await;

        assert!(result.is_ok());
        assert_eq!(fx.config.gemini_api_key.as_deref(), Some("AIzaGoodKey"));
        let stored = fx.store.load_from_file().unwrap().unwrap();
        assert_eq!(stored.gemini_api_key.as_deref(), Some("AIzaGoodKey"));

        let said = console::strip_ansi_codes(&String::from_utf8(p.into_output()).unwrap()).to_string();
        assert!(said.contains("✓ ✅ API key validated!"));
        assert!(said.contains("✓ 🎉 You're all set!"));
    }

    #[tokio::test]
    async fn test_bad_format_reprompts() {
        let mut fx = fixture();
        let mut p = prompter("\nnot-a-key\nAIzaGoodKey\n");

        CredentialSetup::new(&mut p, &MockGeneratorFactory, &fx.store, &mut fx.config)
            .run()
            .await
            .unwrap();

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("API key is required!"));
        assert!(out.contains("Invalid API key format"));
        assert!(out.contains("aistudio.google.com"));
    }

    #[tokio::test]
    async fn test_rejected_key_leaves_store_untouched() {
        let mut fx = fixture();
        let before = fx.store.load_from_file().unwrap();
        let mut p = prompter("AIzaInvalidKey\n");

        let err = CredentialSetup::new(&mut p, &MockGeneratorFactory, &fx.store, &mut fx.config)
            .run()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, GenieError::SetupValidation(_)));
        assert!(fx.config.gemini_api_key.is_none());
        assert_eq!(fx.store.load_from_file().unwrap(), before);
        assert!(!fx.store.path().exists());
    }

    #[tokio::test]
    async fn test_rejected_key_keeps_previous_file_contents() {
        let mut fx = fixture();
        let mut existing = Config::default();
        existing.set_preference("verboseMode", true).unwrap();
        fx.store.save(&existing).unwrap();
        let before = std::fs::read_to_string(fx.store.path()).unwrap();

        let mut p = prompter("AIzaInvalidKey\n");
        let result =
            CredentialSetup::new(&mut p, &MockGeneratorFactory, &fx.store, &mut fx.config)
                .run()
                .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(fx.store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_closed_input_fails() {
        let mut fx = fixture();
        let mut p = prompter("");

        let err = CredentialSetup::new(&mut p, &MockGeneratorFactory, &fx.store, &mut fx.config)
            .run()
            .await
            .err()
            .unwrap();

        assert!(matches!(err, GenieError::InputClosed));
    }
}
