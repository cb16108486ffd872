// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a polling chat client.
//!
//! This is the binary entry point.

mod commands;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use parley_config::ParleyConfig;
use parley_core::types::ConversationId;
use parley_core::{AuthProvider, ParleyError};
use parley_http::{HttpTransport, StaticAuth};
use parley_sync::ChatEngine;
use tracing::error;

/// Parley - a polling chat client.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List your conversations.
    Conversations,
    /// Follow a conversation live; lines typed on stdin are sent.
    Watch { conversation_id: i64 },
    /// Send one message.
    Send {
        conversation_id: i64,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark every message in a conversation as read.
    MarkRead { conversation_id: i64 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.client.log_level);

    if let Err(e) = run(cli.command, &config).await {
        error!(error = %e, "command failed");
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &ParleyConfig) -> Result<(), ParleyError> {
    let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuth::from_config(&config.auth));
    let transport = Arc::new(HttpTransport::new(&config.server, Arc::clone(&auth))?);
    let engine = ChatEngine::new(config, transport, auth);

    match command {
        Commands::Conversations => commands::conversations(&engine).await,
        Commands::Watch { conversation_id } => {
            let shutdown = shutdown::install_signal_handler();
            commands::watch(&engine, ConversationId(conversation_id), shutdown).await
        }
        Commands::Send {
            conversation_id,
            text,
        } => commands::send(&engine, ConversationId(conversation_id), &text.join(" "))
            .await
            .map(|_| ()),
        Commands::MarkRead { conversation_id } => {
            commands::mark_read(&engine, ConversationId(conversation_id)).await
        }
    }
}

/// Initialize the tracing subscriber with an env-filter. Logs go to stderr
/// so they never interleave with chat output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn send_joins_words() {
        let cli = Cli::try_parse_from(["parley", "send", "12", "hello", "there"]).unwrap();
        match cli.command {
            Commands::Send {
                conversation_id,
                text,
            } => {
                assert_eq!(conversation_id, 12);
                assert_eq!(text.join(" "), "hello there");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["parley", "watch", "3", "--config", "/tmp/p.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(matches!(cli.command, Commands::Watch { conversation_id: 3 }));
    }

    #[test]
    fn send_requires_text() {
        assert!(Cli::try_parse_from(["parley", "send", "12"]).is_err());
    }
}
