//! Interactive prompts: free text, secrets, yes/no, list selection.
//!
//! [`LinePrompter`] reads from any `BufRead` and writes to any `Write`, so the
//! menu, chat loop and credential setup can all be driven from a `Cursor` in
//! tests. [`LinePrompter::stdio`] is the production instance.

use crate::error::{GenieError, GenieResult};
use console::style;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use tracing::debug;

/// One row of a selection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectEntry<'a> {
    Choice { label: &'a str, value: &'a str },
    /// Non-selectable heading. An empty title draws a plain rule.
    Separator(&'a str),
}

pub trait Prompter {
    /// Reads one line. An empty answer yields `default` when given.
    fn input(&mut self, message: &str, default: Option<&str>) -> GenieResult<String>;

    /// Reads one line without echo when attached to a terminal.
    fn secret(&mut self, message: &str) -> GenieResult<String>;

    fn confirm(&mut self, message: &str, default: bool) -> GenieResult<bool>;

    /// Returns the `value` of the chosen entry. Accepts the entry's number or
    /// its value typed out.
    fn select(&mut self, message: &str, entries: &[SelectEntry<'_>]) -> GenieResult<String>;

    /// Reads lines until an empty line.
    fn multiline(&mut self, message: &str) -> GenieResult<String>;

    /// Writes a line of plain output in the prompt stream.
    fn say(&mut self, text: &str) -> GenieResult<()>;
}

pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    secure_secrets: bool,
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    /// Prompter on the process's stdin/stdout. Secrets are masked only when a
    /// user is attended.
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            secure_secrets: console::user_attended(),
        }
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            secure_secrets: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write_prompt(&mut self, text: &str) -> GenieResult<()> {
        write!(self.output, "{} {}", style("?").green().bold(), text)
            .and_then(|_| self.output.flush())
            .map_err(|e| GenieError::io("Failed to write prompt", e))
    }

    fn writeln(&mut self, text: &str) -> GenieResult<()> {
        writeln!(self.output, "{}", text).map_err(|e| GenieError::io("Failed to write prompt", e))
    }

    fn read_line(&mut self) -> GenieResult<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| GenieError::io("Failed to read input", e))?;
        if read == 0 {
            debug!("Input closed while prompting");
            return Err(GenieError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(&mut self, message: &str, default: Option<&str>) -> GenieResult<String> {
        match default {
            Some(default) => self.write_prompt(&format!("{} ({}) ", message, default))?,
            None => self.write_prompt(&format!("{} ", message))?,
        }
        let answer = self.read_line()?;
        match default {
            Some(default) if answer.trim().is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn secret(&mut self, message: &str) -> GenieResult<String> {
        self.write_prompt(&format!("{} ", message))?;
        if self.secure_secrets {
            return console::Term::stdout()
                .read_secure_line()
                .map_err(|e| GenieError::io("Failed to read input", e));
        }
        self.read_line()
    }

    fn confirm(&mut self, message: &str, default: bool) -> GenieResult<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            self.write_prompt(&format!("{} ({}) ", message, hint))?;
            let answer = self.read_line()?;
            match answer.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.writeln("Please answer y or n.")?,
            }
        }
    }

    fn select(&mut self, message: &str, entries: &[SelectEntry<'_>]) -> GenieResult<String> {
        self.writeln(&format!("{} {}", style("?").green().bold(), message))?;

        let mut choices = Vec::new();
        for entry in entries {
            match entry {
                SelectEntry::Choice { label, value } => {
                    choices.push(*value);
                    self.writeln(&format!("  {:>2}) {}", choices.len(), label))?;
                }
                SelectEntry::Separator("") => self.writeln(&format!("  {}", "─".repeat(30)))?,
                SelectEntry::Separator(title) => {
                    self.writeln(&format!("  {}", style(title).dim()))?
                }
            }
        }

        loop {
            self.write_prompt(&format!("Choose an option (1-{}): ", choices.len()))?;
            let answer = self.read_line()?;
            let answer = answer.trim();

            if let Ok(index) = answer.parse::<usize>() {
                if (1..=choices.len()).contains(&index) {
                    return Ok(choices[index - 1].to_string());
                }
            } else if let Some(value) = choices.iter().find(|v| v.eq_ignore_ascii_case(answer)) {
                return Ok((*value).to_string());
            }

            self.writeln(&format!(
                "Invalid choice. Please enter a number between 1 and {}.",
                choices.len()
            ))?;
        }
    }

    fn multiline(&mut self, message: &str) -> GenieResult<String> {
        self.writeln(&format!(
            "{} {} {}",
            style("?").green().bold(),
            message,
            style("(finish with an empty line)").dim()
        ))?;

        let mut lines = Vec::new();
        loop {
            match self.read_line() {
                Ok(line) if line.trim().is_empty() => break,
                Ok(line) => lines.push(line),
                Err(GenieError::InputClosed) if !lines.is_empty() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(lines.join("\n"))
    }

    fn say(&mut self, text: &str) -> GenieResult<()> {
        self.writeln(text)
    }
}
