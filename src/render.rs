//! Output rendering for the chat transcript.
//!
//! This module provides a renderer trait and a plain-text implementation
//! for transcript, notice, and error output.

use std::io::{self, Stdout, Write};

use crate::types::{Message, MessageRole, Transaction};

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user's own lines).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the assistant's name).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for the credit notice).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for dim text (used for timestamps and hints).
const ANSI_DIM: &str = "\x1b[2m";

/// Shown when an action needs more credits than the account holds.
const CREDIT_NOTICE: &str =
    "You don't have enough credits for this action. Please top up your account to continue.";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - TUI rendering
pub trait Renderer: Send {
    /// Print a single transcript message, attributed to its speaker.
    fn print_message(&mut self, message: &Message);

    /// Print a whole transcript in order.
    fn print_transcript(&mut self, messages: &[Message]) {
        for message in messages {
            self.print_message(message);
        }
    }

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print the out-of-credits notice.
    fn print_credit_notice(&mut self);

    /// Print a credit transaction line.
    fn print_transaction(&mut self, transaction: &Transaction);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        match message.role() {
            MessageRole::User => {
                if self.use_color {
                    println!("{ANSI_CYAN}You:{ANSI_RESET} {}", message.content());
                } else {
                    println!("You: {}", message.content());
                }
            }
            MessageRole::Assistant if message.is_error() => {
                if self.use_color {
                    println!("{ANSI_RED}Dr. Gemini: {}{ANSI_RESET}", message.content());
                } else {
                    println!("Dr. Gemini: {}", message.content());
                }
            }
            MessageRole::Assistant => {
                if self.use_color {
                    println!("{ANSI_GREEN}Dr. Gemini:{ANSI_RESET} {}", message.content());
                } else {
                    println!("Dr. Gemini: {}", message.content());
                }
            }
        }
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_credit_notice(&mut self) {
        if self.use_color {
            println!("{ANSI_YELLOW}{CREDIT_NOTICE}{ANSI_RESET}");
        } else {
            println!("{CREDIT_NOTICE}");
        }
        self.flush();
    }

    fn print_transaction(&mut self, transaction: &Transaction) {
        let when = crate::utils::time::format_rfc3339(&transaction.created_at);
        if self.use_color {
            println!(
                "{} {ANSI_DIM}({}){ANSI_RESET}",
                transaction.amount_display(),
                when
            );
        } else {
            println!("{} ({})", transaction.amount_display(), when);
        }
        self.flush();
    }
}
