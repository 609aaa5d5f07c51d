//! Local utilities: listing, tree, time, system info, search, cleanup,
//! README scaffolding and preference management.
//!
//! Each command has a pure core that works on an explicit directory (so tests
//! can point it at a temp dir) and a thin printing wrapper used by the
//! dispatcher.

use crate::config::{Config, ConfigStore, mask_key};
use crate::error::{GenieError, GenieResult};
use crate::ui::{self, Spinner, write_line};
use chrono::{DateTime, Local, TimeZone};
use console::style;
use glob::Pattern;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use sysinfo::System;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Deepest level `--tree` descends to (the top level is 0).
pub const MAX_TREE_DEPTH: usize = 3;

pub const CLUTTER_PATTERNS: &[&str] = &[".DS_Store", "Thumbs.db", "*.log", "*.tmp", "*~", ".*.swp"];

static CLUTTER_GLOBS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    CLUTTER_PATTERNS
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
});

const README_TEMPLATE: &str = r#"# New Project

Welcome to your new project! 🎉

## Getting Started

This project was initialized by Genie CLI.

## Features

- [ ] Add your features here
- [ ] Update this README
- [ ] Start coding!

## Installation

Describe how to install the project here.

## Usage

Describe how to run the project here.

## Contributing

1. Fork the repository
2. Create your feature branch
3. Commit your changes
4. Push to the branch
5. Create a Pull Request

---

Generated with ❤️ by Genie CLI
"#;

// =============================================================================
// Formatting helpers
// =============================================================================

pub fn file_icon(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "rs" => "🦀",
        "js" => "📜",
        "ts" => "📘",
        "json" | "toml" => "📋",
        "md" => "📝",
        "txt" => "📄",
        "html" => "🌐",
        "css" => "🎨",
        "png" | "jpg" | "jpeg" | "gif" => "🖼️",
        "pdf" => "📕",
        "zip" | "tar" | "gz" => "📦",
        _ => "📄",
    }
}

/// Human-readable size with one decimal, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn read_dir_sorted(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

// =============================================================================
// --ls
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

pub fn read_entries(dir: &Path) -> GenieResult<Vec<FileEntry>> {
    let entries = read_dir_sorted(dir)
        .map_err(|e| GenieError::io(format!("Failed to read {}", dir.display()), e))?;

    entries
        .into_iter()
        .map(|entry| {
            let metadata = entry.metadata().map_err(|e| {
                GenieError::io(format!("Failed to stat {}", entry.path().display()), e)
            })?;
            Ok(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
            })
        })
        .collect()
}

pub fn list_files(dir: &Path, out: &mut dyn Write) -> GenieResult<()> {
    let spinner = Spinner::new("📁 Reading directory...");
    let entries = read_entries(dir).inspect_err(|_| spinner.fail("❌ Failed to read directory"))?;
    spinner.succeed(out, "📁 Directory contents:")?;
    write_line(out, "")?;

    for entry in entries {
        let icon = if entry.is_dir { "📂" } else { file_icon(&entry.name) };
        let size = if entry.is_dir { String::new() } else { format_file_size(entry.size) };
        let date = entry
            .modified
            .map(|m| m.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        write_line(
            out,
            format!(
                "{} {} {} {}",
                icon,
                style(&entry.name).cyan(),
                style(size).dim(),
                style(date).yellow()
            ),
        )?;
    }
    Ok(())
}

// =============================================================================
// --tree
// =============================================================================

/// Tree lines for `dir`. Dot entries are hidden at the top level only.
pub fn tree_lines(dir: &Path, max_depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    walk_tree(dir, 0, max_depth, &mut lines);
    lines
}

fn walk_tree(dir: &Path, level: usize, max_depth: usize, lines: &mut Vec<String>) {
    let entries = match read_dir_sorted(dir) {
        Ok(entries) => entries,
        Err(e) => {
            lines.push(format!("Error reading {}: {}", dir.display(), e));
            return;
        }
    };

    let indent = "  ".repeat(level);
    let connector = if level > 0 { "├── " } else { "" };

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if level == 0 && is_hidden(&name) {
            continue;
        }

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let icon = if is_dir { "📂" } else { file_icon(&name) };
        lines.push(format!("{}{}{} {}", indent, connector, icon, name));

        if is_dir && level < max_depth {
            walk_tree(&entry.path(), level + 1, max_depth, lines);
        }
    }
}

pub fn show_tree(dir: &Path, out: &mut dyn Write) -> GenieResult<()> {
    write_line(out, "🌳 Directory Tree:")?;
    write_line(out, "")?;
    for line in tree_lines(dir, MAX_TREE_DEPTH) {
        write_line(out, line)?;
    }
    Ok(())
}

// =============================================================================
// --time
// =============================================================================

pub fn time_lines<Tz>(now: &DateTime<Tz>, zone_name: Option<&str>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let offset = now.format("%:z").to_string();
    let zone = match zone_name {
        Some(name) => format!("{} (UTC{})", name, offset),
        None => format!("UTC{}", offset),
    };

    vec![
        format!("📅 Date: {}", style(now.format("%A, %B %-d, %Y")).cyan()),
        format!("⏰ Time: {}", style(now.format("%H:%M:%S")).cyan()),
        format!("🌍 Timezone: {}", style(zone).yellow()),
        format!("📊 Unix Timestamp: {}", style(now.timestamp()).dim()),
    ]
}

pub fn show_time(now: DateTime<Local>, out: &mut dyn Write) -> GenieResult<()> {
    ui::success(out, "🕐 Current Time:")?;
    write_line(out, "")?;
    let zone = std::env::var("TZ").ok().filter(|tz| !tz.is_empty());
    for line in time_lines(&now, zone.as_deref()) {
        write_line(out, line)?;
    }
    Ok(())
}

// =============================================================================
// --whoami
// =============================================================================

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub username: String,
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub home: String,
    pub total_memory: u64,
    pub available_memory: u64,
}

fn bytes_to_gb(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0 / 1024.0 / 1024.0).round() as u64
}

impl SystemInfo {
    pub fn gather() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        Self {
            username: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            platform: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            arch: std::env::consts::ARCH.to_string(),
            home: dirs::home_dir()
                .map(|h| h.display().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            total_memory: system.total_memory(),
            available_memory: system.available_memory(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("👤 User: {}", style(&self.username).cyan()),
            format!("💻 Hostname: {}", style(&self.hostname).cyan()),
            format!("🖥️  Platform: {} ({})", style(&self.platform).cyan(), self.arch),
            format!("🏠 Home: {}", style(&self.home).dim()),
            format!("🦀 Genie: {}", style(env!("CARGO_PKG_VERSION")).green()),
            format!(
                "💾 Memory: {} free / {} GB total",
                style(format!("{} GB", bytes_to_gb(self.available_memory))).yellow(),
                bytes_to_gb(self.total_memory)
            ),
        ]
    }
}

pub fn show_user_info(out: &mut dyn Write) -> GenieResult<()> {
    let spinner = Spinner::new("👤 Gathering system info...");
    let info = SystemInfo::gather();
    spinner.succeed(out, "👤 System Information:")?;
    write_line(out, "")?;
    for line in info.lines() {
        write_line(out, line)?;
    }
    Ok(())
}

// =============================================================================
// --find
// =============================================================================

/// Files under `root` whose name contains `pattern`, ignoring case.
///
/// Dot-prefixed entries below the root are skipped along with everything
/// beneath them. Paths are relative to `root`, in walk order sorted by name.
pub fn search_files(root: &Path, pattern: &str) -> GenieResult<Vec<PathBuf>> {
    fs::read_dir(root)
        .map_err(|e| GenieError::io(format!("Failed to read {}", root.display()), e))?;

    let needle = pattern.to_lowercase();
    let visible = |entry: &DirEntry| {
        entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy())
    };

    let mut results = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(visible)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .contains(&needle)
        {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            results.push(relative.to_path_buf());
        }
    }

    info!("Found {} file(s) matching {:?}", results.len(), pattern);
    Ok(results)
}

pub fn find_files(root: &Path, pattern: &str, out: &mut dyn Write) -> GenieResult<()> {
    if pattern.trim().is_empty() {
        return Err(GenieError::UserInput(
            "Please provide a search pattern: genie --find <filename>".to_string(),
        ));
    }

    let spinner = Spinner::new(&format!("🔍 Searching for \"{}\"...", pattern));
    let results = search_files(root, pattern).inspect_err(|_| spinner.fail("❌ Search failed"))?;

    if results.is_empty() {
        return spinner.warn(out, &format!("🔍 No files found matching \"{}\"", pattern));
    }

    spinner.succeed(
        out,
        &format!("🔍 Found {} file(s) matching \"{}\":", results.len(), pattern),
    )?;
    write_line(out, "")?;
    for path in results {
        let display = path.display().to_string();
        write_line(out, format!("{} {}", file_icon(&display), style(&display).cyan()))?;
    }
    Ok(())
}

// =============================================================================
// --clean
// =============================================================================

pub fn is_clutter(name: &str) -> bool {
    CLUTTER_GLOBS.iter().any(|pattern| pattern.matches(name))
}

/// Deletes clutter files directly inside `dir` and returns their names.
///
/// Subdirectories are neither entered nor removed.
pub fn clean_directory(dir: &Path) -> GenieResult<Vec<String>> {
    let entries = read_dir_sorted(dir)
        .map_err(|e| GenieError::io(format!("Failed to read {}", dir.display()), e))?;

    let mut deleted = Vec::new();
    for entry in entries {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_file || !is_clutter(&name) {
            continue;
        }

        fs::remove_file(entry.path())
            .map_err(|e| GenieError::io(format!("Failed to delete {}", name), e))?;
        debug!("Deleted clutter file {}", name);
        deleted.push(name);
    }
    Ok(deleted)
}

pub fn clean(dir: &Path, out: &mut dyn Write) -> GenieResult<()> {
    let spinner = Spinner::new("🧹 Cleaning directory...");
    let deleted =
        clean_directory(dir).inspect_err(|_| spinner.fail("❌ Failed to clean directory"))?;
    spinner.stop();

    for name in &deleted {
        write_line(out, format!("{} Deleted: {}", style("🗑️").red(), name))?;
    }

    if deleted.is_empty() {
        ui::success(out, "✨ Directory is already clean!")
    } else {
        ui::success(out, &format!("🧹 Cleaned {} clutter file(s)!", deleted.len()))
    }
}

// =============================================================================
// --init
// =============================================================================

pub fn init_project(dir: &Path) -> GenieResult<PathBuf> {
    let path = dir.join("README.md");
    fs::write(&path, README_TEMPLATE)
        .map_err(|e| GenieError::io(format!("Failed to write {}", path.display()), e))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

pub fn init(dir: &Path, out: &mut dyn Write) -> GenieResult<()> {
    let spinner = Spinner::new("🚀 Initializing project...");
    init_project(dir).inspect_err(|_| spinner.fail("❌ Failed to initialize project"))?;
    spinner.succeed(out, "🚀 Project initialized with README.md!")?;
    write_line(out, "")?;
    write_line(out, style("✅ Created: README.md").green())?;
    write_line(out, style("💡 Next steps: Edit README.md and start building!").yellow())?;
    Ok(())
}

// =============================================================================
// --config / --set-pref
// =============================================================================

pub fn show_config(store: &ConfigStore, config: &Config, out: &mut dyn Write) -> GenieResult<()> {
    ui::header(out, "⚙️  Genie configuration")?;
    write_line(out, format!("Configuration file: {}", store.path().display()))?;
    let status = if store.path().exists() { "Found" } else { "Not found (using defaults)" };
    write_line(out, format!("Status: {}", status))?;

    let key = match (config.api_key(), config.gemini_api_key.as_deref()) {
        (Some(active), Some(stored)) if active == stored => mask_key(stored),
        (Some(active), _) => format!("{} (from GEMINI_API_KEY)", mask_key(active)),
        (None, _) => "Not set".to_string(),
    };
    write_line(out, format!("API Key: {}", key))?;

    let prefs = config.preferences();
    write_line(out, format!("colorOutput: {}", prefs.color_output))?;
    write_line(out, format!("verboseMode: {}", prefs.verbose_mode))?;
    write_line(out, "")?;
    write_line(out, style("To change a preference:").dim())?;
    write_line(out, style("  genie --set-pref verboseMode=true").dim())?;
    Ok(())
}

/// Parses `name=value` where value is a boolean.
pub fn parse_preference(assignment: &str) -> GenieResult<(&str, bool)> {
    let (name, value) = assignment.split_once('=').ok_or_else(|| {
        GenieError::UserInput("Expected <name>=<true|false>, e.g. colorOutput=false".to_string())
    })?;

    let value = match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        other => {
            return Err(GenieError::UserInput(format!(
                "Invalid value '{}': use true or false",
                other
            )));
        }
    };
    Ok((name.trim(), value))
}

pub fn set_preference(
    store: &ConfigStore,
    config: &mut Config,
    assignment: &str,
    out: &mut dyn Write,
) -> GenieResult<()> {
    let (name, value) = parse_preference(assignment)?;
    let mut updated = config.clone();
    updated.set_preference(name, value)?;
    store.save(&updated)?;
    *config = updated;

    write_line(out, format!("✅ {} set to {}", name, value))?;
    Ok(())
}
