//! Process bootstrap: logging, config, collaborator wiring.

use crate::args;
use crate::config::{Config, ConfigStore};
use crate::dispatcher::{Dispatched, Dispatcher};
use crate::error::GenieResult;
use crate::gemini::GeminiFactory;
use crate::menu::InteractiveMenu;
use crate::prompter::LinePrompter;
use crate::text_generator::{GeneratorFactory, MockGeneratorFactory};
use crate::ui;
use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over the preference.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init()
        .ok();
}

fn generator_factory(config: &Config) -> Box<dyn GeneratorFactory> {
    if config.is_mock_mode() {
        Box::new(MockGeneratorFactory)
    } else {
        Box::new(GeminiFactory::from_env())
    }
}

pub struct GenieApp {
    dispatcher: Dispatcher,
}

impl GenieApp {
    /// Loads the config from its default location and wires stdio collaborators.
    pub fn initialize() -> anyhow::Result<Self> {
        let store = ConfigStore::default_location().context("Failed to locate config")?;
        let config = store.load();

        init_logging(config.preferences().verbose_mode);
        ui::set_color_output(config.preferences().color_output);
        info!("Using config at {}", store.path().display());

        let factory = generator_factory(&config);
        let dispatcher = Dispatcher::new(store, config, factory, Box::new(LinePrompter::stdio()));
        Ok(Self { dispatcher })
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Runs one invocation: the menu when `tokens` is empty, otherwise a
    /// single dispatch.
    pub async fn run<S: AsRef<str>>(&mut self, tokens: &[S]) -> GenieResult<()> {
        let options = args::parse(tokens);
        if options.is_empty() {
            debug!("No arguments, starting interactive menu");
            let count = InteractiveMenu.run(&mut self.dispatcher).await?;
            info!("Menu finished after {} command(s)", count);
            return Ok(());
        }

        match self.dispatcher.dispatch(&options).await? {
            Dispatched::Executed(handler) => debug!("Executed {:?}", handler),
            other => debug!("Dispatch ended with {:?}", other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::Harness;

    #[tokio::test]
    async fn test_empty_tokens_open_menu() {
        let h = Harness::new();
        let mut app = GenieApp::from_dispatcher(h.dispatcher(Config::default(), "exit\n"));

        app.run::<&str>(&[]).await.unwrap();
        assert!(h.prompts.contents().contains("Choose an action:"));
    }

    #[tokio::test]
    async fn test_tokens_dispatch_once() {
        let h = Harness::new();
        let mut app = GenieApp::from_dispatcher(h.dispatcher(Config::default(), ""));

        app.run(&["--version"]).await.unwrap();
        assert!(h.prompts.contents().is_empty());
        assert!(h.out.contents().contains("Genie CLI v"));
    }

    #[tokio::test]
    async fn test_setup_failure_surfaces() {
        let h = Harness::new();
        let mut app =
            GenieApp::from_dispatcher(h.dispatcher(Config::default(), "AIzaInvalidKey\n"));

        assert!(app.run(&["--chat"]).await.is_err());
    }
}
