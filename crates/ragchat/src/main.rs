// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ragchat - retrieval-augmented chat with streamed answers.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ragchat_config::RagchatConfig;

/// Ragchat - retrieval-augmented chat with streamed answers.
#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Answer one question from the terminal.
    Ask {
        /// The question to ask.
        question: String,
    },
    /// Chunk a text file into the knowledge base.
    Ingest {
        /// Path to a UTF-8 text file.
        path: PathBuf,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ragchat_config::load_and_validate_path(path),
        None => ragchat_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            ragchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => ragchat::serve::run_serve(config).await,
        Some(Commands::Ask { question }) => ragchat::ask::run_ask(config, question).await,
        Some(Commands::Ingest { path }) => ragchat::ingest::run_ingest(config, &path).await,
        Some(Commands::Config) => {
            print_config(config);
            Ok(())
        }
        None => {
            println!("ragchat: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: RagchatConfig) {
    match toml::to_string_pretty(&redacted(config)) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("error: failed to render configuration: {e}");
            std::process::exit(1);
        }
    }
}

fn redacted(mut config: RagchatConfig) -> RagchatConfig {
    const MASK: &str = "[redacted]";
    if config.gemini.api_key.is_some() {
        config.gemini.api_key = Some(MASK.to_string());
    }
    if config.weaviate.api_key.is_some() {
        config.weaviate.api_key = Some(MASK.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["ragchat", "ask", "what is RAG?"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Ask { ref question }) if question == "what is RAG?"));

        let cli =
            Cli::try_parse_from(["ragchat", "--config", "/tmp/r.toml", "ingest", "notes.txt"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/r.toml")));
        assert!(matches!(cli.command, Some(Commands::Ingest { .. })));
    }

    #[test]
    fn secrets_are_redacted() {
        let mut config = RagchatConfig::default();
        config.gemini.api_key = Some("g-secret".into());
        let rendered = toml::to_string_pretty(&redacted(config)).unwrap();
        assert!(!rendered.contains("g-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
