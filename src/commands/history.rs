use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{NitroError, Result};
use crate::storage::{Role, Session, SessionId, SessionStore, SessionSummary};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = super::open_storage(config)?;
    let mut store = SessionStore::load_with_capacity(storage, config.storage.max_sessions);

    match command {
        HistoryCommand::List => {
            print_session_table(&store.list_sessions());
        }
        HistoryCommand::Show { id } => {
            let id = resolve_session_id(&store, &id)?;
            print_session(store.load_session(&id)?);
        }
        HistoryCommand::Clear => {
            let count = store.len();
            store.clear()?;
            println!("{}", format!("Deleted {} conversation(s)", count).green());
        }
    }

    Ok(())
}

/// Find the stored session whose id equals or uniquely starts with `prefix`
///
/// # Errors
///
/// Returns [`NitroError::NotFound`] if nothing matches and
/// [`NitroError::Config`] if the prefix is ambiguous
pub fn resolve_session_id(store: &SessionStore, prefix: &str) -> Result<SessionId> {
    let prefix = prefix.trim();
    if let Some(session) = store.sessions().iter().find(|s| s.id == prefix) {
        return Ok(session.id.clone());
    }

    let matches: Vec<&Session> = store
        .sessions()
        .iter()
        .filter(|s| !prefix.is_empty() && s.id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [session] => Ok(session.id.clone()),
        [] => Err(NitroError::NotFound(prefix.to_string()).into()),
        _ => Err(NitroError::Config(format!(
            "Session id prefix '{}' matches {} sessions",
            prefix,
            matches.len()
        ))
        .into()),
    }
}

/// Print stored sessions as a table, most recent first
pub fn print_session_table(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("{}", "No chat history found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let id_short: String = session.id.chars().take(8).collect();
        let title = if session.title.chars().count() > 40 {
            format!("{}...", session.title.chars().take(37).collect::<String>())
        } else {
            session.title.clone()
        };
        let updated = session
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            id_short.cyan(),
            title,
            session.message_count,
            updated
        ]);
    }

    println!("\nChat History:");
    table.printstd();
    println!();
    println!(
        "Use {} to continue a conversation.",
        "nitro chat --session <ID>".cyan()
    );
    println!();
}

/// Print the messages of a session
pub fn print_session(session: &Session) {
    println!("\n{} {}", "Conversation:".bold(), session.title);
    println!("{}\n", session.id.dimmed());

    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Nitro".green().bold(),
        };
        println!(
            "{} {}",
            speaker,
            message.timestamp.format("%H:%M").to_string().dimmed()
        );
        println!("{}\n", message.content);
    }
}
