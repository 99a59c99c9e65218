//! CLI module - Command-line interface for the referral platform
//!
//! The server is the main entry point. The remaining commands are local
//! administration against the same database.

mod commands;

use clap::{Parser, Subcommand};

/// Referral platform backend
/// Matches job seekers with employees who can refer them
#[derive(Parser)]
#[command(name = "referral-platform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Grant or revoke the admin role
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// List accounts
    #[command(alias = "ls")]
    Users {
        /// Only show accounts with this role (REGULAR or ADMIN)
        #[arg(long)]
        role: Option<String>,

        /// Only show accounts with a company set
        #[arg(long)]
        employees: bool,
    },

    /// List referral requests for a company
    Referrals {
        /// Company name (case-insensitive)
        company: String,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Make an account an administrator
    Grant {
        /// Account email
        email: String,
    },
    /// Return an administrator to the regular role
    Revoke {
        /// Account email
        email: String,
    },
}

pub use commands::*;
