//! Interactive chat application for conversing with Dr. Gemini.
//!
//! This binary provides a REPL interface for the GemiDoc health assistant,
//! including account management, credit purchases, and history browsing.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against the default backend
//! gemidoc-chat
//!
//! # Point at a different backend
//! gemidoc-chat --base-url https://gemidoc.example.com/api
//!
//! # Disable colors (useful for piping output)
//! gemidoc-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/new` - Start a fresh conversation
//! - `/mode <general|diagnosis>` - Switch chat mode
//! - `/history` - Browse past sessions and transactions
//! - `/packages`, `/buy <n>` - Purchase credits
//! - `/quit` - Exit the application

use std::io::{self, BufRead, Write};

use arrrg::CommandLine;
use async_trait::async_trait;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use gemidoc::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use gemidoc::{
    AuthContext, Checkout, CredentialStore, GatewayConfig, GatewayOutcome, GemiDoc, HistoryApi,
    HistoryView, PaymentGateway, PurchaseFlow, PurchaseOutcome, credits,
};

/// Stands in for the hosted payment widget: prints the checkout and reads
/// the gateway reference back from the terminal.
struct PromptGateway;

#[async_trait]
impl PaymentGateway for PromptGateway {
    async fn collect(&self, checkout: &Checkout) -> GatewayOutcome {
        println!(
            "Paying ${:.2} {} as {} (reference {})",
            checkout.amount_cents as f64 / 100.0,
            checkout.currency,
            checkout.email,
            checkout.reference
        );
        print!("Enter gateway reference to confirm, or 'cancel': ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => GatewayOutcome::Cancelled,
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() || line.eq_ignore_ascii_case("cancel") {
                    GatewayOutcome::Cancelled
                } else {
                    GatewayOutcome::Success {
                        reference: line.to_string(),
                    }
                }
            }
            Err(err) => GatewayOutcome::Failed(format!("Input error: {err}")),
        }
    }
}

/// Main entry point for the gemidoc-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("gemidoc-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let credentials = match &config.token_path {
        Some(path) => CredentialStore::open(path.clone()),
        None => CredentialStore::open_default()?,
    };
    let client = GemiDoc::with_options(credentials.clone(), config.base_url.clone(), None)?;

    let mut auth = AuthContext::new(client.clone(), credentials);
    auth.bootstrap().await;

    let mut session = ChatSession::new(client.clone());
    let purchases = PurchaseFlow::new(client.clone(), GatewayConfig::from_env());
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;
    let mut history: Option<HistoryView> = None;

    println!("GemiDoc Chat");
    match auth.email() {
        Some(email) => println!("Signed in as {email}"),
        None => println!("Not signed in. Use /login or /signup."),
    }
    println!("Type /help for commands, /quit to exit\n");
    renderer.print_message(&session.transcript()[0]);

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::NewChat => {
                            session.start_new_session();
                            renderer.print_info("Started a fresh conversation.");
                            renderer.print_message(&session.transcript()[0]);
                        }
                        ChatCommand::Mode(mode) => {
                            match session.select_mode(mode, auth.balance()) {
                                Ok(()) => {
                                    renderer.print_info(&format!(
                                        "Mode set to {mode} ({} per message).",
                                        mode.cost_display()
                                    ));
                                    if !session.draft().is_empty() {
                                        renderer.print_info(&format!(
                                            "Draft: {}",
                                            session.draft()
                                        ));
                                    }
                                }
                                Err(err) if err.is_insufficient_credit() => {
                                    renderer.print_credit_notice();
                                    renderer.print_info("See /packages to top up.");
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Balance => match auth.user() {
                            Some(user) => renderer.print_info(&format!(
                                "Balance: {}",
                                user.balance_display()
                            )),
                            None => renderer.print_info("Not signed in."),
                        },
                        ChatCommand::Login => {
                            let email = rl.readline("Email: ")?;
                            let password = rl.readline("Password: ")?;
                            match auth.login(email.trim(), password.trim()).await {
                                Ok(()) => renderer.print_info(&format!(
                                    "Signed in as {}.",
                                    auth.email().unwrap_or_default()
                                )),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Signup => {
                            let email = rl.readline("Email: ")?;
                            let password = rl.readline("Password: ")?;
                            match auth.signup(email.trim(), password.trim()).await {
                                Ok(()) => renderer.print_info(&format!(
                                    "Account created. Signed in as {}.",
                                    auth.email().unwrap_or_default()
                                )),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Logout => {
                            auth.logout();
                            renderer.print_info("Signed out.");
                        }
                        ChatCommand::History => match HistoryView::fetch(&client).await {
                            Ok(view) => {
                                print_history(&mut renderer, &view);
                                history = Some(view);
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Restore(index) => {
                            if history.is_none() {
                                match HistoryView::fetch(&client).await {
                                    Ok(view) => history = Some(view),
                                    Err(err) => {
                                        renderer.print_error(&err.to_string());
                                        continue;
                                    }
                                }
                            }
                            let Some(view) = &history else {
                                continue;
                            };
                            match view.restore(index) {
                                Some(restored) => {
                                    session.restore_session(restored);
                                    renderer.print_info("Restored conversation:");
                                    renderer.print_transcript(session.transcript());
                                }
                                None => renderer.print_error("No such session."),
                            }
                        }
                        ChatCommand::ClearHistory => {
                            let answer = rl
                                .readline("Delete all chat history? This cannot be undone. [y/N]: ")?;
                            let confirmed = answer.trim().eq_ignore_ascii_case("y");
                            match confirm_clear(&client, &mut history, confirmed).await {
                                Ok(true) => renderer.print_info("Chat history deleted."),
                                Ok(false) => renderer.print_info("Left untouched."),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Packages => {
                            print_packages(&purchases);
                        }
                        ChatCommand::Buy(index) => {
                            let Some(package) = purchases.packages().get(index) else {
                                renderer.print_error("No such package.");
                                continue;
                            };
                            match purchases.purchase(&mut auth, package, &PromptGateway).await {
                                Ok(PurchaseOutcome::Verified(response)) => {
                                    renderer.print_info(&credits::success_message(&response));
                                }
                                Ok(PurchaseOutcome::Cancelled) => {
                                    renderer.print_info("Payment cancelled.");
                                }
                                Ok(PurchaseOutcome::Failed(message)) => {
                                    renderer.print_error(&format!("Payment failed: {message}"));
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Subscription => {
                            match purchases.subscription_status().await {
                                Ok(status) if status.active => {
                                    let kind = status
                                        .subscription_type
                                        .unwrap_or_else(|| "active".to_string());
                                    renderer.print_info(&format!("Subscription: {kind}"));
                                }
                                Ok(_) => renderer.print_info("No active subscription."),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session, &auth);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the assistant
                let before = session.message_count();
                match session.send(&mut auth, line).await {
                    Ok(_) => {
                        if let Some(last) = session.transcript().last()
                            && session.message_count() > before
                        {
                            renderer.print_message(last);
                        }
                    }
                    Err(err) => {
                        if session.message_count() > before
                            && let Some(last) = session.transcript().last()
                        {
                            renderer.print_message(last);
                        }
                        if err.is_insufficient_credit() {
                            renderer.print_credit_notice();
                            renderer.print_info("See /packages to top up.");
                        } else if session.message_count() == before {
                            renderer.print_error(&err.to_string());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

async fn confirm_clear<H: HistoryApi>(
    api: &H,
    history: &mut Option<HistoryView>,
    confirmed: bool,
) -> gemidoc::Result<bool> {
    match history {
        Some(view) => view.clear_chat_history(api, confirmed).await,
        None => {
            let mut view = HistoryView::fetch(api).await?;
            let cleared = view.clear_chat_history(api, confirmed).await?;
            *history = Some(view);
            Ok(cleared)
        }
    }
}

fn print_history(renderer: &mut PlainTextRenderer, view: &HistoryView) {
    if view.sessions().is_empty() {
        println!("    No past conversations.");
    } else {
        println!("    Past conversations (restore with /restore <n>):");
        for (i, record) in view.sessions().iter().enumerate() {
            let preview = record
                .0
                .first()
                .map(|m| m.content.as_str())
                .unwrap_or("(empty)");
            println!("      {}. {} ({} messages)", i + 1, preview, record.len());
        }
    }
    if view.transactions().is_empty() {
        println!("    No transactions.");
    } else {
        println!("    Transactions:");
        for transaction in view.transactions() {
            print!("      ");
            renderer.print_transaction(transaction);
        }
    }
}

fn print_packages(purchases: &PurchaseFlow<GemiDoc>) {
    println!("    Credit packages (buy with /buy <n>):");
    for (i, package) in purchases.packages().iter().enumerate() {
        let marker = if package.popular { " *most popular*" } else { "" };
        println!(
            "      {}. {} - {} credits{} - {}",
            i + 1,
            package.price_display(),
            package.credits,
            marker,
            package.description
        );
    }
}

fn print_stats<C: gemidoc::ChatApi, A: gemidoc::AuthApi>(
    session: &ChatSession<C>,
    auth: &AuthContext<A>,
) {
    println!("    Session Statistics:");
    println!("      Messages: {}", session.message_count());
    println!("      Mode: {}", session.mode());
    println!("      Session id: {}", session.session_id());
    match auth.user() {
        Some(user) => {
            println!("      Account: {}", user.email);
            println!("      Balance: {}", user.balance_display());
        }
        None => println!("      Account: (not signed in)"),
    }
}
