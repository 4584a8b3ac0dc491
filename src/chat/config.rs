//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

/// Command-line arguments for the gemidoc-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend URL (default: http://localhost:4000/api/)", "URL")]
    pub base_url: Option<String>,

    /// Path to the stored bearer token.
    #[arrrg(optional, "Token file (default: ~/.config/gemidoc/token)", "PATH")]
    pub token_path: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Backend base URL override. `None` defers to the client's default.
    pub base_url: Option<String>,

    /// Token file override. `None` defers to the default credential path.
    pub token_path: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            base_url: None,
            token_path: None,
            use_color: true,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the token file path.
    pub fn with_token_path(mut self, token_path: PathBuf) -> Self {
        self.token_path = Some(token_path);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            base_url: args.base_url,
            token_path: args.token_path.map(PathBuf::from),
            use_color: !args.no_color,
        }
    }
}
