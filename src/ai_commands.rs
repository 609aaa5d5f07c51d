//! Backend commands: each builds a prompt, asks the generator and prints
//! the answer.
//!
//! Every function here assumes a connected [`TextGenerator`]; the dispatcher
//! runs credential setup before any of them is reached.

use crate::error::{GenieError, GenieResult};
use crate::process_runner::{ProcessRunner, staged_diff};
use crate::prompter::Prompter;
use crate::text_generator::TextGenerator;
use crate::ui::{self, Spinner, write_line};
use console::style;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub const IDEA_TYPES: &[&str] = &["startup", "app", "content", "business", "creative", "general"];

const CHAT_EXIT_WORDS: &[&str] = &["exit", "quit"];

// =============================================================================
// Prompt templates
// =============================================================================

pub fn summarize_prompt(text: &str) -> String {
    format!("Please provide a concise summary of the following text:\n\n{}", text)
}

pub fn explain_prompt(concept: &str) -> String {
    format!("Please explain the following concept with examples:\n\n{}", concept)
}

pub fn translate_prompt(text: &str, lang: &str) -> String {
    format!("Translate the following text to {}:\n\n{}", lang, text)
}

pub fn email_prompt(request: &str) -> String {
    format!(
        "Generate a professional email based on this request: {}\n\n\
         Please include:\n- Subject line\n- Greeting\n- Body\n- Closing",
        request
    )
}

pub fn codegen_prompt(description: &str) -> String {
    format!(
        "Generate clean, well-commented code for: {}\n\
         Include syntax highlighting, comments, best practices, and example usage if applicable.",
        description
    )
}

pub fn debug_prompt(code: &str) -> String {
    format!("Analyze this code for bugs and improvements:\n\n{}", code)
}

pub fn commit_prompt(diff: &str) -> String {
    format!("Generate a conventional commit message based on this diff:\n\n{}", diff)
}

pub fn docs_prompt(code: &str) -> String {
    format!("Generate documentation for the following code:\n\n{}", code)
}

pub fn file_summary_prompt(content: &str) -> String {
    format!("Summarize the contents of this file:\n\n{}", content)
}

pub fn idea_prompt(kind: &str) -> String {
    format!(
        "Generate 5 creative and practical {} ideas.\n\
         For each idea, give a short title and a one or two sentence description.",
        kind
    )
}

pub fn poem_prompt(theme: &str) -> String {
    format!(
        "Write a short, original poem or song lyrics about the following theme or style:\n\n{}",
        theme
    )
}

// =============================================================================
// Shared request flow
// =============================================================================

/// Spinner-wrapped single request. On failure the spinner shows `failed` and
/// the error is returned for the caller to report.
async fn ask(
    generator: &dyn TextGenerator,
    prompt: &str,
    [working, done, failed]: [&str; 3],
    out: &mut dyn Write,
) -> GenieResult<String> {
    let spinner = Spinner::new(working);
    debug!("Sending prompt ({} chars)", prompt.len());
    match generator.generate(prompt).await {
        Ok(text) => {
            spinner.succeed(out, done)?;
            Ok(text)
        }
        Err(e) => {
            spinner.fail(failed);
            Err(e)
        }
    }
}

async fn ask_and_print(
    generator: &dyn TextGenerator,
    prompt: &str,
    labels: [&str; 3],
    out: &mut dyn Write,
) -> GenieResult<()> {
    let text = ask(generator, prompt, labels, out).await?;
    write_line(out, style(text).cyan())
}

// =============================================================================
// Commands
// =============================================================================

pub async fn summarize(
    generator: &dyn TextGenerator,
    text: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &summarize_prompt(text),
        ["✍️ Summarizing...", "✍️ Summary:", "❌ Failed to summarize"],
        out,
    )
    .await
}

pub async fn explain(
    generator: &dyn TextGenerator,
    concept: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &explain_prompt(concept),
        ["💡 Thinking...", "💡 Explanation:", "❌ Failed to explain"],
        out,
    )
    .await
}

pub async fn translate(
    generator: &dyn TextGenerator,
    text: &str,
    lang: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    let translation = ask(
        generator,
        &translate_prompt(text, lang),
        [
            &format!("🌍 Translating to {}...", lang),
            &format!("🌍 Translation ({}):", lang),
            "❌ Failed to translate",
        ],
        out,
    )
    .await?;

    write_line(out, style(format!("Original: {}", text)).green())?;
    write_line(out, style(format!("Translation: {}", translation)).cyan())
}

pub async fn email(
    generator: &dyn TextGenerator,
    request: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &email_prompt(request),
        ["📧 Generating email...", "📧 Generated Email:", "❌ Failed to generate email"],
        out,
    )
    .await
}

pub async fn codegen(
    generator: &dyn TextGenerator,
    description: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &codegen_prompt(description),
        ["💻 Generating code...", "💻 Generated Code:", "❌ Failed to generate code"],
        out,
    )
    .await
}

pub async fn debug_code(
    generator: &dyn TextGenerator,
    code: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &debug_prompt(code),
        ["🐛 Analyzing code...", "🐛 Code Analysis:", "❌ Failed to debug code"],
        out,
    )
    .await
}

pub async fn docs(
    generator: &dyn TextGenerator,
    code: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &docs_prompt(code),
        [
            "📚 Generating documentation...",
            "📚 Generated Documentation:",
            "❌ Failed to generate documentation",
        ],
        out,
    )
    .await
}

/// Suggests a commit message for the changes staged in the repository at `dir`.
pub async fn commit_message(
    generator: &dyn TextGenerator,
    runner: &dyn ProcessRunner,
    dir: &Path,
    out: &mut dyn Write,
) -> GenieResult<()> {
    let spinner = Spinner::new("📝 Analyzing git changes...");
    let diff = match staged_diff(runner, dir) {
        Ok(diff) => diff,
        Err(e) => {
            if e.to_string().contains("Not a git repository") {
                spinner.fail("❌ Not a git repository");
            } else {
                spinner.fail("❌ Failed to generate commit message");
            }
            return Err(e);
        }
    };

    if diff.trim().is_empty() {
        return spinner.warn(out, "No staged changes. Use: git add <file>");
    }
    spinner.stop();
    info!("Staged diff is {} bytes", diff.len());

    let message = ask(
        generator,
        &commit_prompt(&diff),
        [
            "📝 Writing commit message...",
            "📝 Suggested Commit Message:",
            "❌ Failed to generate commit message",
        ],
        out,
    )
    .await?;
    write_line(out, style(message).green())
}

pub async fn summarize_file(
    generator: &dyn TextGenerator,
    path: &Path,
    out: &mut dyn Write,
) -> GenieResult<()> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ui::error("❌ Failed to summarize file");
        GenieError::io(format!("Failed to read {}", path.display()), e)
    })?;

    let shown = path.display();
    ask_and_print(
        generator,
        &file_summary_prompt(&content),
        [
            &format!("📄 Summarizing {}...", shown),
            &format!("📄 Summary of {}:", shown),
            "❌ Failed to summarize file",
        ],
        out,
    )
    .await
}

pub async fn idea(
    generator: &dyn TextGenerator,
    kind: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &idea_prompt(kind),
        [
            &format!("💡 Brainstorming {} ideas...", kind),
            &format!("💡 {} ideas:", capitalize(kind)),
            "❌ Failed to generate ideas",
        ],
        out,
    )
    .await
}

pub async fn poem(
    generator: &dyn TextGenerator,
    theme: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    ask_and_print(
        generator,
        &poem_prompt(theme),
        ["🎨 Composing...", "🎨 Your poem:", "❌ Failed to write poem"],
        out,
    )
    .await
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Interactive conversation until `exit`/`quit` or closed input.
///
/// A failed turn is reported and the loop continues; the session keeps only
/// the turns that succeeded.
pub async fn chat(
    generator: &dyn TextGenerator,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> GenieResult<()> {
    write_line(out, style("💬 Starting AI Chat Mode").cyan())?;
    write_line(out, style("Type \"exit\" or \"quit\" to end the conversation").dim())?;
    write_line(out, style("━".repeat(50)).dim())?;

    let mut session = generator.start_session(Vec::new());
    let mut turns = 0usize;

    loop {
        let message = match prompter.input("You:", None) {
            Ok(message) => message,
            Err(GenieError::InputClosed) => {
                debug!("Input closed, leaving chat");
                break;
            }
            Err(e) => return Err(e),
        };

        let message = message.trim();
        if message.is_empty() {
            continue;
        }
        if CHAT_EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        let spinner = Spinner::new("🤖 Genie is thinking...");
        match session.send(message).await {
            Ok(reply) => {
                spinner.stop();
                turns += 1;
                write_line(out, format!("{} {}", style("🧞 Genie:").magenta(), reply))?;
            }
            Err(e) => {
                spinner.fail("❌ Failed to get response");
                ui::error(&e.to_string());
            }
        }
    }

    info!("Chat ended after {} turn(s)", turns);
    write_line(out, style("👋 Chat ended. Thanks for using Genie!").cyan())
}
