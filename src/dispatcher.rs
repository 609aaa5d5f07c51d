//! Routes an [`OptionMap`] to exactly one command.
//!
//! Priority: help, then version, then the first catalog entry set in the
//! map, then the usage fallback. A key whose value is an empty string is
//! treated as absent. Backend commands run credential setup first
//! when no key is available. Handler errors are reported here and never
//! reach the caller; only a failed setup does.

use crate::ai_commands;
use crate::args::OptionMap;
use crate::basic_commands;
use crate::catalog::{self, CommandDescriptor, Handler};
use crate::config::{Config, ConfigStore};
use crate::error::{GenieError, GenieResult};
use crate::process_runner::{ProcessRunner, SystemProcessRunner};
use crate::prompter::Prompter;
use crate::providers::{SystemTimeProvider, TimeProvider};
use crate::setup::CredentialSetup;
use crate::text_generator::{GeneratorFactory, TextGenerator};
use crate::ui::{self, write_line};
use console::style;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a call to [`Dispatcher::dispatch`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Help,
    Version,
    Fallback,
    Executed(Handler),
}

pub struct Dispatcher {
    store: ConfigStore,
    config: Config,
    factory: Box<dyn GeneratorFactory>,
    backend: Option<Box<dyn TextGenerator>>,
    prompter: Box<dyn Prompter>,
    runner: Box<dyn ProcessRunner>,
    clock: Box<dyn TimeProvider>,
    workdir: PathBuf,
    out: Box<dyn Write>,
}

impl Dispatcher {
    /// Connects a backend right away when `config` already holds a key.
    pub fn new(
        store: ConfigStore,
        config: Config,
        factory: Box<dyn GeneratorFactory>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let backend = config.api_key().map(|key| factory.connect(key));
        if backend.is_none() {
            debug!("No API key configured, AI commands will run setup first");
        }

        Self {
            store,
            config,
            factory,
            backend,
            prompter,
            runner: Box::new(SystemProcessRunner),
            clock: Box::new(SystemTimeProvider),
            workdir: PathBuf::from("."),
            out: Box::new(std::io::stdout()),
        }
    }

    pub fn with_runner(mut self, runner: Box<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Directory the local utilities operate on (`.` by default).
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn prompter(&mut self) -> &mut dyn Prompter {
        self.prompter.as_mut()
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs the command selected by `options`.
    ///
    /// # Errors
    ///
    /// Only credential setup failures are returned: a rejected key
    /// ([`GenieError::SetupValidation`]) or input closing mid-setup.
    pub async fn dispatch(&mut self, options: &OptionMap) -> GenieResult<Dispatched> {
        let Some(descriptor) = catalog::find(options) else {
            let keys: Vec<&str> = options.keys().collect();
            info!("No command matched {:?}", keys);
            write_line(self.out.as_mut(), style("❓ Command not recognized").yellow())?;
            write_line(self.out.as_mut(), catalog::usage())?;
            return Ok(Dispatched::Fallback);
        };

        info!("Dispatching --{}", descriptor.name);

        if descriptor.requires_backend && self.backend.is_none() {
            self.run_setup().await?;
        }

        if let Err(e) = self.invoke(descriptor, options).await {
            debug!("--{} failed: {:?}", descriptor.name, e);
            ui::error(&e.to_string());
        }

        Ok(match descriptor.handler {
            Handler::Help => Dispatched::Help,
            Handler::Version => Dispatched::Version,
            handler => Dispatched::Executed(handler),
        })
    }

    async fn run_setup(&mut self) -> GenieResult<()> {
        self.prompter
            .say("🔑 This command requires AI features. Let's set up your API key first!")?;

        let client = CredentialSetup::new(
            self.prompter.as_mut(),
            self.factory.as_ref(),
            &self.store,
            &mut self.config,
        )
        .run()
        .await?;

        self.backend = Some(client);
        Ok(())
    }

    async fn invoke(
        &mut self,
        descriptor: &CommandDescriptor,
        options: &OptionMap,
    ) -> GenieResult<()> {
        let out = self.out.as_mut();
        let dir = self.workdir.as_path();
        let backend = self.backend.as_deref();

        match descriptor.handler {
            Handler::Help => write_line(out, catalog::usage()),
            Handler::Version => write_line(out, catalog::version_line()),
            Handler::ListFiles => basic_commands::list_files(dir, out),
            Handler::ShowTree => basic_commands::show_tree(dir, out),
            Handler::ShowTime => basic_commands::show_time(self.clock.now(), out),
            Handler::WhoAmI => basic_commands::show_user_info(out),
            Handler::FindFiles => {
                basic_commands::find_files(dir, required_text(descriptor, options)?, out)
            }
            Handler::CleanDirectory => basic_commands::clean(dir, out),
            Handler::InitProject => basic_commands::init(dir, out),
            Handler::ShowConfig => basic_commands::show_config(&self.store, &self.config, out),
            Handler::SetPreference => {
                let assignment = required_text(descriptor, options)?;
                basic_commands::set_preference(&self.store, &mut self.config, assignment, out)?;
                ui::set_color_output(self.config.preferences().color_output);
                Ok(())
            }
            Handler::Summarize => {
                let text = required_text(descriptor, options)?;
                ai_commands::summarize(connected(backend)?, text, out).await
            }
            Handler::Explain => {
                let concept = required_text(descriptor, options)?;
                ai_commands::explain(connected(backend)?, concept, out).await
            }
            Handler::Translate => {
                let text = required_text(descriptor, options)?;
                let lang = descriptor.secondary_value(options).unwrap_or("es");
                ai_commands::translate(connected(backend)?, text, lang, out).await
            }
            Handler::Chat => {
                ai_commands::chat(connected(backend)?, self.prompter.as_mut(), out).await
            }
            Handler::Email => {
                let request = required_text(descriptor, options)?;
                ai_commands::email(connected(backend)?, request, out).await
            }
            Handler::CodeGen => {
                let description = required_text(descriptor, options)?;
                ai_commands::codegen(connected(backend)?, description, out).await
            }
            Handler::Debug => {
                let code = required_text(descriptor, options)?;
                ai_commands::debug_code(connected(backend)?, code, out).await
            }
            Handler::CommitMessage => {
                let runner = self.runner.as_ref();
                ai_commands::commit_message(connected(backend)?, runner, dir, out).await
            }
            Handler::Docs => {
                let code = required_text(descriptor, options)?;
                ai_commands::docs(connected(backend)?, code, out).await
            }
            Handler::SummarizeFile => {
                let path = dir.join(required_text(descriptor, options)?);
                ai_commands::summarize_file(connected(backend)?, &path, out).await
            }
            Handler::Idea => {
                let kind = descriptor.secondary_value(options).unwrap_or("general");
                ai_commands::idea(connected(backend)?, kind, out).await
            }
            Handler::Poem => {
                let theme = required_text(descriptor, options)?;
                ai_commands::poem(connected(backend)?, theme, out).await
            }
        }
    }
}

/// The connected backend. Setup always runs before a backend handler is reached.
fn connected(backend: Option<&dyn TextGenerator>) -> GenieResult<&dyn TextGenerator> {
    backend.ok_or_else(|| GenieError::Config("AI backend is not configured".to_string()))
}

/// The command's own value, rejecting a bare flag or blank text.
fn required_text<'a>(
    descriptor: &CommandDescriptor,
    options: &'a OptionMap,
) -> GenieResult<&'a str> {
    match options.text(descriptor.name) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenieError::UserInput(format!(
            "Missing value. Usage: genie --{} {}",
            descriptor.name,
            descriptor.argument.unwrap_or("<value>")
        ))),
    }
}
