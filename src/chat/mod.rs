//! Chat application module for interactive conversations with Dr. Gemini.
//!
//! This module provides a REPL chat interface built on top of the gemidoc
//! client library. It supports:
//!
//! - General questions and diagnosis requests, charged per message
//! - Slash commands for session, account, and purchase control
//! - Restoring past conversations from history
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core conversation state and the send loop
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, DIAGNOSIS_SCAFFOLD, GREETING, SendOutcome};
