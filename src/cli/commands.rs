//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the MCP server on stdio (default)
//! - tools: print the tool catalog
//! - call: run a single tool call and print its envelope

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// here-maps-mcp - HERE mapping tools for language-model agents
#[derive(Parser, Debug)]
#[command(name = "here-maps-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// HERE API key; overrides the configured environment variable
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Serve MCP over stdin/stdout
    Serve,

    /// List the advertised tools
    Tools {
        /// Print the raw JSON definitions
        #[arg(long)]
        json: bool,
    },

    /// Invoke one tool and print the result envelope
    Call {
        /// Tool name (e.g. maps_geocode)
        name: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },
}
