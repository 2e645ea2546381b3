use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "readme-ai")]
#[command(about = "AI-powered README generator for your projects")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project and print what was detected
    Analyze {
        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate README.md for a project
    Generate {
        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Gateway URL (defaults to README_AI_SERVER_URL or http://localhost:3001)
        #[arg(short, long)]
        server: Option<String>,

        /// Call the generation backend directly instead of the gateway
        #[arg(long, conflicts_with = "server")]
        direct: bool,

        /// Write the README somewhere other than <path>/README.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the rate-limited generation gateway
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { path, json } => engine.analyze(path, json).await,
            Commands::Generate { path, server, direct, output } => {
                engine.generate(path, server, direct, output).await
            }
            Commands::Serve { port } => engine.serve(port).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["readme-ai", "generate"]).unwrap();
        match cli.command {
            Commands::Generate { path, server, direct, output } => {
                assert_eq!(path, PathBuf::from("."));
                assert!(server.is_none());
                assert!(!direct);
                assert!(output.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn direct_and_server_are_exclusive() {
        let parsed = Cli::try_parse_from([
            "readme-ai", "generate", "--direct", "--server", "http://x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["readme-ai", "serve", "--port", "8080", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));
    }
}
