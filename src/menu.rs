//! Interactive menu shown when genie runs without arguments.
//!
//! Each pick is turned into the same [`OptionMap`] the argument interpreter
//! would build and handed to [`Dispatcher::dispatch`].

use crate::ai_commands::IDEA_TYPES;
use crate::args::{OptionMap, OptionValue};
use crate::dispatcher::Dispatcher;
use crate::error::{GenieError, GenieResult};
use crate::prompter::{Prompter, SelectEntry};
use tracing::{debug, info};

const EXIT: &str = "exit";

/// A question asked after a menu pick, answered into `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Text { key: &'static str, message: &'static str },
    WithDefault { key: &'static str, message: &'static str, default: &'static str },
    Choice { key: &'static str, message: &'static str, options: &'static [&'static str] },
    Multiline { key: &'static str, message: &'static str },
}

impl FollowUp {
    fn key(&self) -> &'static str {
        match *self {
            Self::Text { key, .. }
            | Self::WithDefault { key, .. }
            | Self::Choice { key, .. }
            | Self::Multiline { key, .. } => key,
        }
    }

    fn ask(&self, prompter: &mut dyn Prompter) -> GenieResult<String> {
        match *self {
            Self::Text { message, .. } => prompter.input(message, None),
            Self::WithDefault { message, default, .. } => prompter.input(message, Some(default)),
            Self::Choice { message, options, .. } => {
                let entries: Vec<SelectEntry<'_>> = options
                    .iter()
                    .map(|&option| SelectEntry::Choice { label: option, value: option })
                    .collect();
                prompter.select(message, &entries)
            }
            Self::Multiline { message, .. } => prompter.multiline(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuChoice {
    pub label: &'static str,
    pub command: &'static str,
    pub inputs: &'static [FollowUp],
}

impl MenuChoice {
    const fn plain(label: &'static str, command: &'static str) -> Self {
        Self { label, command, inputs: &[] }
    }

    const fn asking(label: &'static str, command: &'static str, inputs: &'static [FollowUp]) -> Self {
        Self { label, command, inputs }
    }

    /// Asks the follow-up questions and builds the option map for this pick.
    ///
    /// The command key is a bare flag unless a follow-up answers into it.
    pub fn collect(&self, prompter: &mut dyn Prompter) -> GenieResult<OptionMap> {
        let mut options = OptionMap::new();
        for input in self.inputs {
            let answer = input.ask(prompter)?;
            options.insert(input.key(), OptionValue::Text(answer));
        }
        if !options.contains(self.command) {
            options.insert(self.command, OptionValue::Flag);
        }
        Ok(options)
    }
}

pub static BASIC_CHOICES: &[MenuChoice] = &[
    MenuChoice::plain("📁 List files (ls)", "ls"),
    MenuChoice::plain("🌳 Show directory tree", "tree"),
    MenuChoice::plain("🕐 Show current time", "time"),
    MenuChoice::plain("👤 System information", "whoami"),
    MenuChoice::asking(
        "🔍 Find files",
        "find",
        &[FollowUp::Text { key: "find", message: "🔍 Enter search pattern:" }],
    ),
    MenuChoice::plain("🧹 Clean directory", "clean"),
    MenuChoice::plain("🚀 Initialize project", "init"),
];

pub static AI_CHOICES: &[MenuChoice] = &[
    MenuChoice::plain("💬 Start AI chat", "chat"),
    MenuChoice::asking(
        "✍️ Summarize text",
        "summarize",
        &[FollowUp::Text { key: "summarize", message: "✍️ Enter text to summarize:" }],
    ),
    MenuChoice::asking(
        "💡 Explain concept",
        "explain",
        &[FollowUp::Text { key: "explain", message: "💡 What concept to explain:" }],
    ),
    MenuChoice::asking(
        "🌍 Translate text",
        "translate",
        &[
            FollowUp::Text { key: "translate", message: "🌍 Enter text to translate:" },
            FollowUp::WithDefault {
                key: "lang",
                message: "🌍 Target language (e.g., es, fr, de):",
                default: "es",
            },
        ],
    ),
    MenuChoice::asking(
        "📧 Generate email",
        "email",
        &[FollowUp::Text { key: "email", message: "📧 Describe the email to generate:" }],
    ),
    MenuChoice::asking(
        "💻 Generate code",
        "codegen",
        &[FollowUp::Text { key: "codegen", message: "💻 Describe the code to generate:" }],
    ),
    MenuChoice::asking(
        "🐛 Debug code",
        "debug",
        &[FollowUp::Multiline { key: "debug", message: "🐛 Paste your code to debug:" }],
    ),
    MenuChoice::plain("📝 Generate commit message", "commitmsg"),
    MenuChoice::asking(
        "📚 Generate documentation",
        "docs",
        &[FollowUp::Multiline { key: "docs", message: "📚 Paste the code to document:" }],
    ),
    MenuChoice::asking(
        "📄 Summarize file",
        "summarize-file",
        &[FollowUp::Text { key: "summarize-file", message: "📄 Enter file path to summarize:" }],
    ),
    MenuChoice::asking(
        "💡 Generate ideas",
        "idea",
        &[FollowUp::Choice {
            key: "type",
            message: "💡 What type of ideas?",
            options: IDEA_TYPES,
        }],
    ),
    MenuChoice::asking(
        "🎨 Write poem",
        "poem",
        &[FollowUp::Text { key: "poem", message: "🎨 Enter poem theme or style:" }],
    ),
];

fn select_entries() -> Vec<SelectEntry<'static>> {
    let mut entries: Vec<SelectEntry<'static>> = BASIC_CHOICES
        .iter()
        .map(|c| SelectEntry::Choice { label: c.label, value: c.command })
        .collect();
    entries.push(SelectEntry::Separator("━━━ AI Features ━━━"));
    entries.extend(
        AI_CHOICES
            .iter()
            .map(|c| SelectEntry::Choice { label: c.label, value: c.command }),
    );
    entries.push(SelectEntry::Separator(""));
    entries.push(SelectEntry::Choice { label: "🚪 Exit", value: EXIT });
    entries
}

pub fn lookup(command: &str) -> Option<&'static MenuChoice> {
    BASIC_CHOICES
        .iter()
        .chain(AI_CHOICES.iter())
        .find(|c| c.command == command)
}

/// Treats closed input as a request to leave the menu.
fn or_leave<T>(result: GenieResult<T>) -> GenieResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GenieError::InputClosed) => {
            debug!("Input closed, leaving menu");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub struct InteractiveMenu;

impl InteractiveMenu {
    /// Runs until the user exits, declines to continue, or input closes.
    /// Returns how many commands were dispatched.
    ///
    /// # Errors
    ///
    /// Propagates fatal dispatch errors (a failed credential setup).
    pub async fn run(&self, dispatcher: &mut Dispatcher) -> GenieResult<usize> {
        let entries = select_entries();
        let mut dispatched = 0;

        loop {
            let prompter = dispatcher.prompter();
            prompter.say("🎩 What would you like to do?")?;
            prompter.say("")?;

            let Some(action) = or_leave(prompter.select("Choose an action:", &entries))? else {
                break;
            };
            if action == EXIT {
                break;
            }

            let Some(choice) = lookup(&action) else {
                continue;
            };
            let Some(options) = or_leave(choice.collect(prompter))? else {
                break;
            };

            info!("Menu selected --{}", choice.command);
            dispatcher.dispatch(&options).await?;
            dispatched += 1;

            let prompter = dispatcher.prompter();
            prompter.say("")?;
            match or_leave(prompter.confirm("🎩 Would you like to do something else?", true))? {
                Some(true) => prompter.say("")?,
                _ => break,
            }
        }

        dispatcher.prompter().say("👋 Thanks for using Genie CLI!")?;
        Ok(dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dispatcher::tests::Harness;
    use crate::prompter::LinePrompter;
    use std::io::Cursor;

    fn keyed_config() -> Config {
        let mut config = Config::default();
        config.set_api_key("AIzaStoredKey".to_string());
        config
    }

    // =========================================================================
    // Choices
    // =========================================================================

    #[test]
    fn test_every_choice_is_a_catalog_command() {
        for choice in BASIC_CHOICES.iter().chain(AI_CHOICES.iter()) {
            assert!(crate::catalog::lookup(choice.command).is_some(), "{}", choice.command);
        }
    }

    #[test]
    fn test_entries_layout() {
        let entries = select_entries();
        assert_eq!(entries[BASIC_CHOICES.len()], SelectEntry::Separator("━━━ AI Features ━━━"));
        assert_eq!(
            entries.last(),
            Some(&SelectEntry::Choice { label: "🚪 Exit", value: EXIT })
        );
    }

    #[test]
    fn test_collect_translate_uses_default_language() {
        let mut p = LinePrompter::new(Cursor::new(b"Good morning\n\n".to_vec()), Vec::new());
        let options = lookup("translate").unwrap().collect(&mut p).unwrap();

        assert_eq!(options.text("translate"), Some("Good morning"));
        assert_eq!(options.text("lang"), Some("es"));
    }

    #[test]
    fn test_collect_idea_is_flag_plus_type() {
        let mut p = LinePrompter::new(Cursor::new(b"startup\n".to_vec()), Vec::new());
        let options = lookup("idea").unwrap().collect(&mut p).unwrap();

        assert_eq!(options.get("idea"), Some(&OptionValue::Flag));
        assert_eq!(options.text("type"), Some("startup"));
    }

    #[test]
    fn test_collect_plain_choice_is_flag() {
        let mut p = LinePrompter::new(Cursor::new(Vec::new()), Vec::new());
        let options = lookup("tree").unwrap().collect(&mut p).unwrap();
        assert_eq!(options, OptionMap::new().with_flag("tree"));
    }

    // =========================================================================
    // Loop
    // =========================================================================

    #[tokio::test]
    async fn test_exit_dispatches_nothing() {
        let h = Harness::new();
        let mut d = h.dispatcher(Config::default(), "exit\n");

        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 0);
        assert!(h.prompts.contents().contains("Thanks for using Genie CLI!"));
        assert!(h.out.contents().is_empty());
    }

    #[tokio::test]
    async fn test_time_then_decline_dispatches_once() {
        let h = Harness::new();
        let mut d = h.dispatcher(Config::default(), "time\nn\n");

        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 1);
        assert!(h.out.contents().contains("Unix Timestamp"));
    }

    #[tokio::test]
    async fn test_continue_loops_back_to_menu() {
        let h = Harness::new();
        std::fs::write(h.dir.path().join("report.txt"), "x").unwrap();
        let mut d = h.dispatcher(Config::default(), "1\ny\n5\nreport\nn\n");

        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 2);
        assert_eq!(h.prompts.contents().matches("Choose an action:").count(), 2);
        assert!(h.out.contents().contains("report.txt"));
    }

    #[tokio::test]
    async fn test_closed_input_ends_menu() {
        let h = Harness::new();
        let mut d = h.dispatcher(Config::default(), "");
        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 0);

        let h = Harness::new();
        let mut d = h.dispatcher(Config::default(), "find\n");
        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ai_choice_through_dispatcher() {
        let h = Harness::new();
        let mut d = h.dispatcher(keyed_config(), "idea\n2\nn\n");

        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 1);
        assert!(h.out.contents().contains("practical app ideas"));
    }

    #[tokio::test]
    async fn test_blank_answer_falls_back_without_setup() {
        let h = Harness::new();
        // Only a blank answer; setup would hit closed input
        let mut d = h.dispatcher(Config::default(), "summarize\n\nn\n");

        assert_eq!(InteractiveMenu.run(&mut d).await.unwrap(), 1);
        assert!(h.out.contents().contains("Command not recognized"));
        assert!(!h.prompts.contents().contains("requires AI features"));
        assert!(!d.has_backend());
    }

    #[tokio::test]
    async fn test_failed_setup_propagates() {
        let h = Harness::new();
        let mut d = h.dispatcher(Config::default(), "chat\nAIzaInvalidKey\n");

        let err = InteractiveMenu.run(&mut d).await.unwrap_err();
        assert!(matches!(err, GenieError::SetupValidation(_)));
    }
}
