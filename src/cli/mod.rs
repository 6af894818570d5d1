//! CLI module for here-maps-mcp - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for serving MCP on stdio
//! and for inspecting or invoking tools locally.

pub mod commands;

pub use commands::Cli;
