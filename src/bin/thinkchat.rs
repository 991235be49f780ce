//! Interactive chat with the business-analysis backend.
//!
//! Replies are revealed with a typewriter effect.  Typing a new message while
//! a reply is still revealing shows the rest of it at once.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the default backend
//! thinkchat
//!
//! # Point at another backend and reveal faster
//! thinkchat --api-url http://analysis:3001/api/ --typing-speed-ms 10
//!
//! # Keep a transcript and a log of backend traffic
//! thinkchat --transcript chat.json --log-file traffic.jsonl
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/skip` - Show the current reply in full (Ctrl+C does the same)
//! - `/generate` - Fetch the business analysis
//! - `/tab <name>` - Show a section of the analysis
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::thread;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use thinkchat::chat::{ChatArgs, ChatConfig, ChatSession, PlainTextRenderer, Renderer, UserEvent};
use thinkchat::{Backend, JsonLinesLogger};

/// Main entry point for the thinkchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("thinkchat [OPTIONS]");
    let config = ChatConfig::from(args);

    let mut backend = Backend::with_options(config.api_url.clone(), None)?;
    if let Some(path) = &config.log_path {
        backend = backend.with_logger(Arc::new(JsonLinesLogger::create(path)?));
    }
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let (tx, rx) = unbounded_channel();

    // Ctrl+C skips the reveal; it must not keep the channel open once input ends.
    let interrupt = tx.downgrade();
    ctrlc::set_handler(move || {
        if let Some(tx) = interrupt.upgrade() {
            let _ = tx.send(UserEvent::Skip);
        }
    })?;

    renderer.print_info(&format!("Think Chat (backend: {})", backend.base_url()));
    renderer.print_info("Type /help for commands, /quit to exit\n");

    thread::spawn(move || read_input(tx));

    let mut session = ChatSession::new(backend, config);
    session.run(rx, &mut renderer).await?;
    println!("Goodbye!");
    Ok(())
}

/// Forwards lines from the terminal until quit or end of input.
fn read_input(tx: UnboundedSender<UserEvent>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Input error: {err}");
            let _ = tx.send(UserEvent::Quit);
            return;
        }
    };
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let Some(event) = UserEvent::from_line(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());
                let quit = event == UserEvent::Quit;
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt
                if tx.send(UserEvent::Skip).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Input error: {err}");
                let _ = tx.send(UserEvent::Quit);
                break;
            }
        }
    }
}
