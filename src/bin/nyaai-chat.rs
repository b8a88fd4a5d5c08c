//! Interactive chat with the NyaAI legal assistant.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local nyaai-proxy on the default address
//! nyaai-chat
//!
//! # Talk to a provider directly (credential from NYAAI_API_KEY)
//! nyaai-chat --base-url https://api.groq.com/openai/v1/
//!
//! # Send only the last ten messages of history with each request
//! nyaai-chat --context-messages 10
//!
//! # Disable colors (useful for piping output)
//! nyaai-chat --no-color
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/lang` - Switch input hints between English and Hindi
//! - `/attach <file>` - Attach a document
//! - `/history` - Reprint the conversation
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;

use arrrg::CommandLine;

use nyaai::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Input, LineReader, PlainTextRenderer,
    Renderer, SkipSwitch, SubmitOutcome, help_text, parse_command, play,
};
use nyaai::{CompletionClient, LogFacadeLogger, Typewriter};

/// Main entry point for the nyaai-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let (args, _) = ChatArgs::from_command_line_relaxed("nyaai-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;

    let client = CompletionClient::with_options(None, Some(&config.base_url), None)?
        .with_logger(Arc::new(LogFacadeLogger));
    log::info!(
        "sending completions to {} (credential: {})",
        client.base_url(),
        if client.has_api_key() { "yes" } else { "no" }
    );
    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut typewriter = Typewriter::new();
    let input = LineReader::terminal();

    // Raised by Ctrl+C while a reply is being typed out.
    let skip = SkipSwitch::new();
    let skip_clone = skip.clone();
    ctrlc::set_handler(move || skip_clone.raise())?;

    print_banner(&mut renderer);

    loop {
        session.expire_reveal(tokio::time::Instant::now());
        renderer.print_hint(&format!(
            "[{}] {}",
            session.language().code(),
            session.placeholder()
        ));

        let line = match input.read_line("You: ").await {
            Input::Line(line) => line,
            Input::Interrupted => {
                println!();
                continue;
            }
            Input::Eof => {
                println!("\nGoodbye!");
                break;
            }
            Input::Failed(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(cmd) = parse_command(line) {
            match cmd {
                ChatCommand::Quit => {
                    println!("Goodbye!");
                    break;
                }
                ChatCommand::Clear => {
                    typewriter.reset();
                    let notice = session.clear();
                    renderer.print_notification(&notice);
                }
                ChatCommand::Language => {
                    let notice = session.toggle_language();
                    renderer.print_notification(&notice);
                }
                ChatCommand::Attach(path) => {
                    let notice = session.attach(&path);
                    renderer.print_notification(&notice);
                }
                ChatCommand::History => {
                    if session.store().is_empty() {
                        renderer.print_info("No messages yet.");
                    }
                    for message in session.store().messages() {
                        renderer.print_message(message);
                    }
                }
                ChatCommand::Help => {
                    for line in help_text().lines() {
                        println!("    {}", line);
                    }
                }
                ChatCommand::Stats => print_stats(&session),
                ChatCommand::Invalid(message) => renderer.print_error(&message),
            }
            continue;
        }

        renderer.print_thinking();
        let outcome = session.submit(line).await;
        renderer.clear_thinking();
        match outcome {
            SubmitOutcome::Answered(id) => {
                skip.arm();
                play(&mut session, &mut typewriter, &mut renderer, id, &skip).await;
            }
            SubmitOutcome::Failed(notice) => renderer.print_notification(&notice),
            SubmitOutcome::Ignored(reason) => log::debug!("input ignored: {reason:?}"),
            SubmitOutcome::Discarded => {}
        }
    }

    Ok(())
}

fn print_banner(renderer: &mut dyn Renderer) {
    renderer.print_info("NyaAI - Your Friendly Legal Assistant");
    renderer.print_info("I'm here to help, in simple words and in your language.");
    renderer.print_info("Chat with me in English or Hindi. Upload legal documents too!");
    renderer.print_info("Type /help for commands, /quit to exit\n");
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!("      Language: {}", stats.language);
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.failed_requests
    );
    println!(
        "      In flight: {}",
        if stats.in_flight { "yes" } else { "no" }
    );
    println!("      Times cleared: {}", stats.epoch);
    println!("      Context: {}", session.config().context_window);
}
