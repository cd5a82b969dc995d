// Tollgate — CLI Module
//
// Command-line administration of the consumer registry using clap derive
// macros. Subcommands: init, add, list, get, remove, approve, trust, check.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Tollgate — consumer key/secret registry for a trust broker.
#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the consumer store (overrides TOLLGATE_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the consumer store if it does not exist.
    Init,

    /// Register a consumer, replacing any consumer with the same key.
    Add {
        /// The consumer key presented by the caller.
        #[arg(long)]
        key: String,

        /// The shared secret.
        /// For production use, prefer a secrets manager to avoid shell history exposure.
        #[arg(long)]
        secret: String,

        /// Display name of the consumer.
        #[arg(long)]
        name: String,

        /// Mark the consumer approved instead of provisional.
        #[arg(long)]
        approved: bool,

        /// Let the consumer bypass manual approval.
        #[arg(long)]
        trusted: bool,
    },

    /// List registered consumers (no secrets).
    List {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one consumer.
    Get {
        /// The consumer key.
        key: String,
    },

    /// Remove a consumer.
    Remove {
        /// The consumer key.
        key: String,
    },

    /// Approve a provisional consumer.
    Approve {
        /// The consumer key.
        key: String,
    },

    /// Mark a consumer trusted, or revoke trust.
    Trust {
        /// The consumer key.
        key: String,

        /// Revoke trust instead of granting it.
        #[arg(long)]
        revoke: bool,
    },

    /// Load the store and report consumer nodes that could not be read.
    Check,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
