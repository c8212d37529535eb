//! CLI module for docquery.

pub mod commands;
mod output;
pub mod preflight;
pub mod repl;

pub use output::Output;

use clap::{Parser, Subcommand};

/// docquery - ask questions about CSV, Excel, PDF and YouTube sources
///
/// Run without a subcommand for the interactive console session.
#[derive(Parser, Debug)]
#[command(name = "docquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DOCQUERY_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a session on a known source without the selection prompts
    Query {
        /// Source kind (csv, excel, pdf, youtube)
        #[arg(short, long)]
        kind: String,

        /// File path or YouTube URL
        #[arg(short, long)]
        input: String,

        /// Name of the persisted index (PDF and YouTube only)
        #[arg(long)]
        index_name: Option<String>,
    },

    /// Start the web stub
    Serve {
        /// Host to bind to (defaults to [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration if none exists
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["docquery", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_query_arguments() {
        let cli = Cli::try_parse_from([
            "docquery",
            "query",
            "--kind",
            "pdf",
            "--input",
            "report.pdf",
            "--index-name",
            "reports",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Query {
                kind,
                input,
                index_name,
            }) => {
                assert_eq!(kind, "pdf");
                assert_eq!(input, "report.pdf");
                assert_eq!(index_name.as_deref(), Some("reports"));
            }
            other => panic!("Expected query command, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_defaults_come_from_settings() {
        let cli = Cli::try_parse_from(["docquery", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: None
            })
        ));
    }
}
