//! Backend feature commands
//!
//! Health, backend-side sessions and the image, search, voice and video
//! endpoints. Feature replies are shown as pretty-printed JSON; their shape
//! is owned by the backend.

use colored::Colorize;
use prettytable::{format, Table};
use serde_json::Value;

use super::open_state;
use crate::api::{
    ImageRequest, SearchRequest, SpeechToTextRequest, TextToSpeechRequest, VideoRequest,
};
use crate::cli::RemoteCommand;
use crate::config::Config;
use crate::error::{NitroError, Result};

/// Probe the backend once and report its status
pub async fn run_health(config: &Config) -> Result<()> {
    let state = open_state(config)?;
    println!("Checking {} ...", config.api.base_url.cyan());

    let health = state.api().health().await?;
    if health.is_healthy() {
        println!("{} {}", "●".green(), "Backend is online".green().bold());
    } else {
        println!(
            "{} Backend answered with status {}",
            "●".yellow(),
            health.status.yellow()
        );
    }
    if let Some(version) = &health.version {
        println!("  version:   {}", version);
    }
    if let Some(timestamp) = &health.timestamp {
        println!("  timestamp: {}", timestamp);
    }
    Ok(())
}

/// Handle commands about sessions stored on the backend
pub async fn handle_remote(config: &Config, command: RemoteCommand) -> Result<()> {
    let state = open_state(config)?;
    let api = state.api();

    match command {
        RemoteCommand::Sessions { limit } => {
            let recent = api.recent_sessions(limit).await?;
            if recent.sessions.is_empty() {
                println!("{}", "No sessions stored on the backend.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "Session".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);
            for session in recent.sessions {
                let title = session.title.unwrap_or_else(|| "-".to_string());
                let updated = session.last_updated.unwrap_or_else(|| "-".to_string());
                table.add_row(prettytable::row![
                    session.session_id.cyan(),
                    title,
                    session.message_count,
                    updated
                ]);
            }
            table.printstd();
        }
        RemoteCommand::History { id } => {
            let history = api.history(&id).await?;
            if history.messages.is_empty() {
                println!("{}", "No messages in this session.".yellow());
            }
            for entry in history.messages {
                if let Some(message) = entry.message {
                    let sender = entry.sender.unwrap_or_else(|| "user".to_string());
                    println!("{} {}", format!("{}:", sender).cyan().bold(), message);
                }
                if let Some(response) = entry.response {
                    println!("{} {}", "nitro:".green().bold(), response);
                }
                println!();
            }
        }
        RemoteCommand::Stats => {
            let stats = api.stats().await?;
            println!("Total sessions: {}", stats.statistics.total_sessions);
            println!("Total messages: {}", stats.statistics.total_messages);
        }
    }

    Ok(())
}

/// Generate an image
pub async fn run_image(
    config: &Config,
    prompt: String,
    negative: Option<String>,
    size: String,
) -> Result<()> {
    validate_size(&size)?;
    let mut request = ImageRequest::new(prompt);
    request.negative_prompt = negative;
    request.size = size;

    let state = open_state(config)?;
    print_json(&state.api().generate_image(&request).await?)
}

/// List recently generated images
pub async fn run_gallery(config: &Config, limit: usize) -> Result<()> {
    let state = open_state(config)?;
    print_json(&state.api().image_gallery(limit).await?)
}

/// Web search, summarized unless `no_summary` is set
pub async fn run_search(config: &Config, query: String, no_summary: bool) -> Result<()> {
    let request = SearchRequest {
        query,
        summarize: !no_summary,
    };
    let state = open_state(config)?;
    print_json(&state.api().search(&request).await?)
}

/// Speak text on the backend host
///
/// Without an explicit language the stored preference is used.
pub async fn run_speak(config: &Config, text: String, language: Option<String>) -> Result<()> {
    let state = open_state(config)?;
    let language = language.unwrap_or_else(|| state.preferences().language());
    let request = TextToSpeechRequest {
        text,
        language,
        save_file: None,
    };
    print_json(&state.api().text_to_speech(&request).await?)
}

/// Transcribe a file or the microphone of the backend host
pub async fn run_transcribe(config: &Config, file: Option<String>, microphone: bool) -> Result<()> {
    if file.is_none() && !microphone {
        return Err(
            NitroError::Config("Provide --file <PATH> or --microphone".to_string()).into(),
        );
    }
    let request = SpeechToTextRequest {
        audio_file: file,
        use_microphone: microphone,
    };
    let state = open_state(config)?;
    print_json(&state.api().speech_to_text(&request).await?)
}

/// Request a video
pub async fn run_video(config: &Config, prompt: String, duration: u32) -> Result<()> {
    if duration == 0 {
        return Err(NitroError::Config("Duration must be at least 1 second".to_string()).into());
    }
    let request = VideoRequest {
        prompt,
        duration,
        style: None,
        resolution: None,
    };
    let state = open_state(config)?;
    print_json(&state.api().generate_video(&request).await?)
}

fn print_json(value: &Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).map_err(NitroError::Serialization)?;
    println!("{}", pretty);
    Ok(())
}

/// Check a `WIDTHxHEIGHT` size string
fn validate_size(size: &str) -> Result<()> {
    let valid = size
        .split_once(['x', 'X'])
        .map(|(w, h)| {
            matches!(w.parse::<u32>(), Ok(w) if w > 0) && matches!(h.parse::<u32>(), Ok(h) if h > 0)
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(NitroError::Config(format!(
            "Invalid image size '{}', expected WIDTHxHEIGHT such as 512x512",
            size
        ))
        .into())
    }
}
