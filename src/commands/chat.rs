//! Interactive chat and one-shot `ask`
//!
//! Both go through [`AppState`]: the exchange is recorded in the local
//! history, a failed send can be replayed with `/retry`, and backend
//! configuration problems are printed with the fix the operator needs.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::history::{print_session, print_session_table, resolve_session_id};
use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{open_state, print_error};
use crate::app::{AppState, Reply};
use crate::config::Config;
use crate::error::Result;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `session` - Optional stored session to continue (id or unique prefix)
pub async fn run_chat(config: Config, session: Option<String>) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let mut state = open_state(&config)?;
    if let Some(prefix) = session {
        open_session(&mut state, &prefix)?;
    }

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(&config);

    loop {
        let prompt = format!("{} ", "nitro>".cyan().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().red());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::NewChat => {
                        state.new_chat();
                        println!("{}\n", "Started a new conversation".green());
                    }
                    SpecialCommand::Retry => {
                        if state.pending_retry().is_none() {
                            println!("{}\n", "Nothing to retry".yellow());
                            continue;
                        }
                        report(state.retry_last().await);
                    }
                    SpecialCommand::ShowHistory => match state.current_session() {
                        Some(id) => {
                            let id = id.to_string();
                            match state.store().load_session(&id) {
                                Ok(session) => print_session(session),
                                Err(e) => print_error(&e),
                            }
                        }
                        None => println!("{}\n", "No messages in this conversation yet".yellow()),
                    },
                    SpecialCommand::ListSessions => {
                        print_session_table(&state.store().list_sessions());
                    }
                    SpecialCommand::OpenSession(prefix) => {
                        if let Err(e) = open_session(&mut state, &prefix) {
                            print_error(&e);
                        }
                    }
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => report(state.send_message(trimmed).await),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Send a single message and print the reply
///
/// # Errors
///
/// Returns the error of the chat call
pub async fn run_ask(config: Config, message: String, session: Option<String>) -> Result<()> {
    let mut state = open_state(&config)?;
    if let Some(prefix) = session {
        let id = resolve_session_id(state.store(), &prefix)?;
        state.select_session(&id)?;
    }

    let reply = state.send_message(&message).await?;
    println!("{}", reply.text);
    tracing::debug!(session_id = %reply.session_id, "Recorded exchange");
    Ok(())
}

fn open_session(state: &mut AppState, prefix: &str) -> Result<()> {
    let id = resolve_session_id(state.store(), prefix)?;
    let session = state.select_session(&id)?;
    println!(
        "{} {}\n",
        "Continuing:".green(),
        session.title.bold()
    );
    Ok(())
}

fn report(result: Result<Reply>) {
    match result {
        Ok(reply) => {
            println!("\n{}", reply.text);
            if let Some(model) = &reply.model {
                let source = reply.source.as_deref().unwrap_or("-");
                println!("{}", format!("[{} via {}]", model, source).dimmed());
            }
            println!();
        }
        Err(e) => {
            print_error(&e);
            println!();
        }
    }
}

fn print_welcome_banner(config: &Config) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Nitro AI Chat - Welcome!                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Backend: {}", config.api.base_url.cyan());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}
