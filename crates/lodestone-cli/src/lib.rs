//! Command-line surface for the vault engine
//!
//! Thin orchestration only: every command resolves the vault root,
//! loads configuration, and delegates to the library crates. Output
//! formatting lives next to each command; `--json` switches every
//! command to serde_json output.

pub mod cli;
pub mod commands;
