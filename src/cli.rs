//! Command-line interface definition for Nitro
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, local history, backend features and
//! preferences.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nitro - terminal client for the Nitro AI backend
///
/// Chat with the backend, keep a bounded local history, and call the
/// image, voice, search and video endpoints.
#[derive(Parser, Debug, Clone)]
#[command(name = "nitro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the local storage database path
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Nitro
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Continue a stored local session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// Message to send
        message: String,

        /// Append to a stored local session
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage local chat history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Inspect sessions stored on the backend
    Remote {
        /// Remote subcommand
        #[command(subcommand)]
        command: RemoteCommand,
    },

    /// Check whether the backend is reachable
    Health,

    /// Generate an image from a prompt
    Image {
        /// Image description
        prompt: String,

        /// What the image should not contain
        #[arg(short, long)]
        negative: Option<String>,

        /// Image size as WIDTHxHEIGHT
        #[arg(short, long, default_value = "512x512")]
        size: String,
    },

    /// List recently generated images
    Gallery {
        /// Maximum number of images
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Search the web
    Search {
        /// Search query
        query: String,

        /// Skip the AI summary of the results
        #[arg(long)]
        no_summary: bool,
    },

    /// Speak text on the backend host
    Speak {
        /// Text to speak
        text: String,

        /// Language code; defaults to the stored preference
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Transcribe audio on the backend host
    Transcribe {
        /// Audio file path on the backend host
        #[arg(short, long)]
        file: Option<String>,

        /// Record from the backend host's microphone
        #[arg(short, long)]
        microphone: bool,
    },

    /// Request a video from a prompt
    Video {
        /// Video description
        prompt: String,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 4)]
        duration: u32,
    },

    /// Show or change preferences
    Prefs {
        /// Preferences subcommand
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

/// Local history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored sessions, most recent first
    List,

    /// Show the messages of a stored session
    Show {
        /// Session id (a unique prefix is enough)
        id: String,
    },

    /// Delete all stored sessions
    Clear,
}

/// Backend session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RemoteCommand {
    /// List recent backend sessions
    Sessions {
        /// Maximum number of sessions
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the history of a backend session
    History {
        /// Backend session id
        id: String,
    },

    /// Show backend usage statistics
    Stats,
}

/// Preference subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PrefsCommand {
    /// Show current preferences
    Show,

    /// Set the color theme (light, dark or toggle)
    Theme {
        /// light, dark or toggle
        value: String,
    },

    /// Set the preferred language code
    Language {
        /// Language code such as en or pt-BR
        code: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            storage_path: None,
            command: Commands::Health,
        }
    }
}
