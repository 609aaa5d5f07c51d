//! The fixed, ordered list of commands genie understands.
//!
//! Declaration order matters: the dispatcher picks the first descriptor whose
//! name (or short form) is set in the option map.

use crate::args::OptionMap;

/// Callable a descriptor is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    Help,
    Version,
    ListFiles,
    ShowTree,
    ShowTime,
    WhoAmI,
    FindFiles,
    CleanDirectory,
    InitProject,
    ShowConfig,
    SetPreference,
    Summarize,
    Explain,
    Translate,
    Chat,
    Email,
    CodeGen,
    Debug,
    CommitMessage,
    Docs,
    SummarizeFile,
    Idea,
    Poem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Basic,
    Ai,
    Options,
}

impl Category {
    fn heading(self) -> &'static str {
        match self {
            Self::Basic => "📚 Basic Utilities:",
            Self::Ai => "🤖 AI Features (requires Gemini API key):",
            Self::Options => "🔧 Options:",
        }
    }

    fn example(self) -> &'static str {
        match self {
            Self::Basic => "genie --find README",
            Self::Ai => "genie --translate \"Hello world\" --lang fr",
            Self::Options => "genie --set-pref colorOutput=false",
        }
    }
}

/// An optional companion flag with a default, such as `--lang` for `--translate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryOption {
    pub key: &'static str,
    pub placeholder: &'static str,
    pub default: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub short: Option<&'static str>,
    pub requires_backend: bool,
    pub handler: Handler,
    /// Placeholder of the value the flag expects, if any.
    pub argument: Option<&'static str>,
    pub secondary: Option<SecondaryOption>,
    pub category: Category,
    pub summary: &'static str,
}

impl CommandDescriptor {
    /// Value of the secondary option in `options`, or its default.
    pub fn secondary_value<'a>(&self, options: &'a OptionMap) -> Option<&'a str> {
        self.secondary
            .map(|secondary| options.text_or(secondary.key, secondary.default))
    }

    fn is_named_by(&self, options: &OptionMap) -> bool {
        options.is_truthy(self.name) || self.short.is_some_and(|short| options.is_truthy(short))
    }

    fn signature(&self) -> String {
        let mut signature = format!("--{}", self.name);
        if let Some(short) = self.short {
            signature.push_str(&format!(", -{}", short));
        }
        if let Some(argument) = self.argument {
            signature.push_str(&format!(" {}", argument));
        }
        if let Some(secondary) = self.secondary {
            signature.push_str(&format!(" --{} {}", secondary.key, secondary.placeholder));
        }
        signature
    }
}

const fn basic(
    name: &'static str,
    handler: Handler,
    argument: Option<&'static str>,
    summary: &'static str,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        short: None,
        requires_backend: false,
        handler,
        argument,
        secondary: None,
        category: Category::Basic,
        summary,
    }
}

const fn ai(
    name: &'static str,
    handler: Handler,
    argument: Option<&'static str>,
    summary: &'static str,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        short: None,
        requires_backend: true,
        handler,
        argument,
        secondary: None,
        category: Category::Ai,
        summary,
    }
}

const fn option(
    name: &'static str,
    short: Option<&'static str>,
    handler: Handler,
    argument: Option<&'static str>,
    summary: &'static str,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        short,
        requires_backend: false,
        handler,
        argument,
        secondary: None,
        category: Category::Options,
        summary,
    }
}

pub const HELP: CommandDescriptor =
    option("help", Some("h"), Handler::Help, None, "Show this help message");
pub const VERSION: CommandDescriptor =
    option("version", Some("v"), Handler::Version, None, "Show version information");

pub static CATALOG: &[CommandDescriptor] = &[
    HELP,
    VERSION,
    basic("ls", Handler::ListFiles, None, "List files in current directory"),
    basic("tree", Handler::ShowTree, None, "Show directory tree structure"),
    basic("time", Handler::ShowTime, None, "Display current date and time"),
    basic("whoami", Handler::WhoAmI, None, "Show system and user information"),
    basic("find", Handler::FindFiles, Some("<filename>"), "Search for files"),
    basic("clean", Handler::CleanDirectory, None, "Remove clutter files (.DS_Store, *.log, etc.)"),
    basic("init", Handler::InitProject, None, "Initialize project with README"),
    option("config", None, Handler::ShowConfig, None, "Show configuration and preferences"),
    option(
        "set-pref",
        None,
        Handler::SetPreference,
        Some("<name>=<true|false>"),
        "Set colorOutput or verboseMode",
    ),
    ai("summarize", Handler::Summarize, Some("<text>"), "Summarize text or content"),
    ai("explain", Handler::Explain, Some("<concept>"), "Explain complex concepts"),
    CommandDescriptor {
        secondary: Some(SecondaryOption { key: "lang", placeholder: "<code>", default: "es" }),
        ..ai("translate", Handler::Translate, Some("<text>"), "Translate text (default: es)")
    },
    ai("chat", Handler::Chat, None, "Interactive chat mode"),
    ai("email", Handler::Email, Some("<prompt>"), "Generate emails"),
    ai("codegen", Handler::CodeGen, Some("<description>"), "Generate code snippets"),
    ai("debug", Handler::Debug, Some("<code>"), "Find and fix bugs"),
    ai("commitmsg", Handler::CommitMessage, None, "Generate Git commit messages"),
    ai("docs", Handler::Docs, Some("<code>"), "Generate documentation"),
    ai("summarize-file", Handler::SummarizeFile, Some("<path>"), "Summarize file contents"),
    CommandDescriptor {
        secondary: Some(SecondaryOption { key: "type", placeholder: "<type>", default: "general" }),
        ..ai("idea", Handler::Idea, None, "Generate creative ideas")
    },
    ai("poem", Handler::Poem, Some("<theme>"), "Write poems or lyrics"),
];

/// First command descriptor, in declaration order, named by `options`.
///
/// Help and version come first in [`CATALOG`], so they win over everything.
/// A key whose value is an empty string does not count.
pub fn find(options: &OptionMap) -> Option<&'static CommandDescriptor> {
    CATALOG.iter().find(|d| d.is_named_by(options))
}

pub fn lookup(name: &str) -> Option<&'static CommandDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

pub fn version_line() -> String {
    format!("🎩 Genie CLI v{}", env!("CARGO_PKG_VERSION"))
}

/// Usage text listing every flag, grouped by category, with one example each.
pub fn usage() -> String {
    let mut out = String::from("\n🎩 Genie CLI Usage:\n");

    for category in [Category::Basic, Category::Ai, Category::Options] {
        out.push('\n');
        out.push_str(category.heading());
        out.push('\n');
        for descriptor in CATALOG.iter().filter(|d| d.category == category) {
            out.push_str(&format!("  {:<36}{}\n", descriptor.signature(), descriptor.summary));
        }
    }

    out.push_str("\nExamples:\n");
    for category in [Category::Basic, Category::Ai, Category::Options] {
        out.push_str(&format!("  {}\n", category.example()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = CATALOG.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_backend_commands_are_tagged() {
        let backend: Vec<_> = CATALOG
            .iter()
            .filter(|d| d.requires_backend)
            .map(|d| d.name)
            .collect();
        assert_eq!(
            backend,
            [
                "summarize", "explain", "translate", "chat", "email", "codegen", "debug",
                "commitmsg", "docs", "summarize-file", "idea", "poem"
            ]
        );
    }

    #[test]
    fn test_find_uses_declaration_order() {
        // Both keys set: "ls" is declared before "summarize"
        let options = parse(&["--summarize", "text", "--ls"]);
        assert_eq!(find(&options).unwrap().handler, Handler::ListFiles);
    }

    #[test]
    fn test_find_distinguishes_summarize_file() {
        let options = parse(&["--summarize-file", "README.md"]);
        assert_eq!(find(&options).unwrap().handler, Handler::SummarizeFile);
    }

    #[test]
    fn test_find_ignores_unknown_flags() {
        assert!(find(&parse(&["--bogus"])).is_none());
        assert!(find(&parse(&["just", "words"])).is_none());
    }

    #[test]
    fn test_help_and_version_short_forms() {
        assert_eq!(find(&parse(&["-h"])).unwrap().handler, Handler::Help);
        assert_eq!(find(&parse(&["--ls", "--help"])).unwrap().handler, Handler::Help);
        assert_eq!(find(&parse(&["--ls", "-v"])).unwrap().handler, Handler::Version);
        assert_eq!(find(&parse(&["-v", "-h"])).unwrap().handler, Handler::Help);
    }

    #[test]
    fn test_find_skips_empty_values() {
        assert!(find(&parse(&["--summarize", ""])).is_none());
        assert_eq!(
            find(&parse(&["--find", "", "--poem", "rain"])).unwrap().handler,
            Handler::Poem
        );
    }

    #[test]
    fn test_secondary_defaults() {
        let translate = lookup("translate").unwrap();
        assert_eq!(translate.secondary_value(&parse(&["--translate", "Hello"])), Some("es"));
        assert_eq!(
            translate.secondary_value(&parse(&["--translate", "Hello", "--lang", "de"])),
            Some("de")
        );

        let idea = lookup("idea").unwrap();
        assert_eq!(idea.secondary_value(&parse(&["--idea"])), Some("general"));
        assert_eq!(lookup("poem").unwrap().secondary_value(&parse(&["--poem", "x"])), None);
    }

    #[test]
    fn test_usage_lists_every_flag_and_examples() {
        let text = usage();
        for descriptor in CATALOG {
            assert!(text.contains(&format!("--{}", descriptor.name)), "missing {}", descriptor.name);
        }
        assert!(text.contains("--translate <text> --lang <code>"));
        assert!(text.contains("--help, -h"));
        assert!(text.contains("genie --find README"));
        assert!(text.contains("genie --translate"));
    }
}
