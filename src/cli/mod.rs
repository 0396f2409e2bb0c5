//! CLI argument parsing and command routing

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

/// lmstudio: talk to a local LM Studio server
#[derive(Debug, Parser)]
#[command(name = "lmstudio")]
#[command(about = "Query a local LM Studio inference server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server base URL (overrides the env file)
    #[arg(long, global = true, env = "LM_STUDIO_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Env file to load settings from and write them to
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List models loaded on the server
    Models,

    /// Send a single chat message
    Chat {
        /// Model identifier
        #[arg(short, long)]
        model: String,

        /// Optional system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// The message to send
        prompt: String,
    },

    /// Complete a text prompt
    Complete {
        /// Model identifier
        #[arg(short, long)]
        model: String,

        /// The prompt to complete
        prompt: String,
    },

    /// Compute an embedding vector
    Embed {
        /// Model identifier
        #[arg(short, long)]
        model: String,

        /// Text to embed
        input: String,
    },

    /// Save the current settings to the env file
    Setup,
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Request timeout, if one was given
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_command() {
        let cli = Cli::try_parse_from([
            "lmstudio",
            "--timeout",
            "5",
            "chat",
            "--model",
            "qwen",
            "-s",
            "be brief",
            "hello",
        ])
        .unwrap();

        assert_eq!(cli.request_timeout(), Some(Duration::from_secs(5)));
        match cli.command {
            Commands::Chat {
                model,
                system,
                prompt,
            } => {
                assert_eq!(model, "qwen");
                assert_eq!(system.as_deref(), Some("be brief"));
                assert_eq!(prompt, "hello");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_embed_requires_model() {
        assert!(Cli::try_parse_from(["lmstudio", "embed", "text"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
