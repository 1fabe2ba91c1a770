//! CLI struct definitions for the `aki` command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "aki",
    version = env!("CARGO_PKG_VERSION"),
    about = "h@cky: a terminal that parses >command< /persona (tone) [output] turns, scores them for prompt injection and routes them to a persona."
)]
pub(crate) struct Cli {
    /// Path to the TOML config file.
    #[clap(long, global = true, default_value = crate::core::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Output format for one-shot commands.
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Debug-level logging on stderr.
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Interactive terminal (the default)
    Chat {
        /// Do not write to the journal.
        #[clap(long)]
        no_log: bool,
    },
    /// Run one turn through the pipeline from a fresh conversation state
    Turn {
        text: String,
        /// Do not append the query record to the journal.
        #[clap(long)]
        no_log: bool,
    },
    /// Show how a turn is parsed
    Parse { text: String },
    /// Threat assessment for a text
    Score { text: String },
    /// Replace every injection match with the redaction marker
    Sanitize { text: String },
    /// List the persona catalogue
    Personas,
    /// Print the system prompt for a persona
    Prompt {
        #[clap(long)]
        persona: Option<String>,
        #[clap(long, default_value = crate::core::context::DEFAULT_TONE)]
        tone: String,
        #[clap(long, default_value = crate::core::context::DEFAULT_OUTPUT)]
        output: String,
    },
    /// Core and user dictionary
    Lexicon(LexiconCli),
    /// Conversation journal
    Log(LogCli),
    /// Subprocess sandbox
    Sandbox(SandboxCli),
    /// Check external prerequisites
    Doctor {
        /// Also print the installation guide.
        #[clap(long)]
        guide: bool,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct LexiconCli {
    #[clap(subcommand)]
    pub command: LexiconCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum LexiconCommand {
    /// Definition of one term (user layer wins)
    Lookup { term: String },
    /// Add or overwrite a user definition
    Define { term: String, definition: String },
    /// Remove a user definition
    Remove { term: String },
    /// List terms
    List {
        /// Only user terms.
        #[clap(long, conflicts_with = "core")]
        user: bool,
        /// Only core terms.
        #[clap(long)]
        core: bool,
    },
    /// Terms whose definition contains the query
    Search { query: String },
    /// Dictionary terms referenced in a text
    Refs { text: String },
    /// Write the merged dictionary as JSON
    Export { path: PathBuf },
    /// Load user terms from a JSON file
    Import {
        path: PathBuf,
        /// Replace the user layer instead of merging.
        #[clap(long)]
        replace: bool,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct LogCli {
    #[clap(subcommand)]
    pub command: LogCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum LogCommand {
    /// One-line summaries of the newest entries
    Recent {
        #[clap(long, short = 'n', default_value_t = 10)]
        count: usize,
    },
    /// Decoded entries, oldest first
    Read {
        #[clap(long)]
        last: Option<usize>,
    },
    /// Entries containing a string (case-insensitive)
    Search { query: String },
    /// Counts by type and persona
    Stats,
    /// Write all entries, decoded, as a JSON array
    Export { path: PathBuf },
    /// Truncate the journal
    Clear {
        /// Confirm the truncation.
        #[clap(long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct SandboxCli {
    #[clap(subcommand)]
    pub command: SandboxCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SandboxCommand {
    /// Run code with the configured interpreter
    Run {
        code: String,
        /// Seconds before the child is killed (defaults to the config value).
        #[clap(long)]
        timeout: Option<u64>,
    },
}
