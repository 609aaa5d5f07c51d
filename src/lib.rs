//! Genie - a magical command-line assistant.
//!
//! One binary that answers both local requests and generative-text requests:
//!
//! - **Local utilities**: listing, directory tree, time, system info, file
//!   search, clutter cleanup, README scaffolding
//! - **AI features** via the Google Gemini API: summaries, explanations,
//!   translation, chat, email, code generation, debugging, commit messages,
//!   documentation, ideas and poems
//! - **First-run credential setup** that validates a key before storing it
//! - **Interactive menu** when no arguments are given
//!
//! # Architecture
//!
//! - [`args`] - Turns raw tokens into an option map
//! - [`catalog`] - Ordered command descriptors and usage text
//! - [`dispatcher`] - Picks and runs exactly one command per option map
//! - [`setup`] - Credential setup state machine
//! - [`basic_commands`] / [`ai_commands`] - Command handlers
//! - [`menu`] - Interactive menu loop
//! - [`config`] - Preference store (TOML)
//! - [`text_generator`] / [`gemini`] - Text generation seam and Gemini client
//! - [`http_client`] - HTTP client abstraction
//! - [`process_runner`] - External process seam (`git diff --cached`)
//! - [`prompter`] - Interactive prompts
//! - [`providers`] - Clock injection
//! - [`ui`] - Spinner, status lines, banner
//! - [`app`] - Bootstrap wiring
//!
//! # Example
//!
//! ```ignore
//! use genie::app::GenieApp;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = GenieApp::initialize()?;
//!
//!     // Same as `genie --translate "Good morning" --lang fr`
//!     app.run(&["--translate", "Good morning", "--lang", "fr"]).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Offline mode
//!
//! Set `GENIE_USE_MOCK=1` to swap the Gemini client for a deterministic mock
//! that echoes prompts back:
//!
//! ```bash
//! GENIE_USE_MOCK=1 GEMINI_API_KEY=AIzaLocal genie --explain "borrowing"
//! ```

pub mod ai_commands;
pub mod app;
pub mod args;
pub mod basic_commands;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod http_client;
pub mod menu;
pub mod process_runner;
pub mod prompter;
pub mod providers;
pub mod setup;
pub mod text_generator;
pub mod ui;
