use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "rendimento")]
#[command(
    version,
    about = "Brazilian fixed-income application tracker with IR/IOF tax withholding"
)]
#[command(
    long_about = "Track your fixed-income deposits (CDB, fund quotas) with accrued gross/net \
values under the regressive IR and IOF withholding tables, register partial withdrawals, and \
report aggregate views."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Database file path (defaults to ~/.rendimento/data.db)
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Position management and viewing
    Positions {
        #[command(subcommand)]
        action: PositionCommands,
    },

    /// Withdrawals against positions
    Withdrawals {
        #[command(subcommand)]
        action: WithdrawalCommands,
    },

    /// Aggregate dashboard totals across (filtered) positions
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Evaluation date (YYYY-MM-DD, YYYY-MM, or YYYY; defaults to today)
        #[arg(long)]
        at: Option<String>,
    },

    /// Run the yield/tax engine on hypothetical inputs (no data is touched)
    Simulate {
        /// Deposited value
        value: String,

        /// Instrument type: CDB, a "Fundo..." label, or anything else (no yield)
        instrument_type: String,

        /// Deposit date (YYYY-MM-DD)
        date: String,

        /// CDI percentage (e.g. 110 for 110% of CDI; CDB only)
        #[arg(long)]
        cdi: Option<String>,

        /// Evaluation date (YYYY-MM-DD, YYYY-MM, or YYYY; defaults to today)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct FilterArgs {
    /// Filter by company (case-insensitive substring)
    #[arg(long)]
    pub company: Option<String>,

    /// Filter by bank (case-insensitive substring)
    #[arg(long)]
    pub bank: Option<String>,

    /// Filter by account code (case-insensitive substring)
    #[arg(long)]
    pub account: Option<String>,

    /// Filter by instrument type (exact label)
    #[arg(long = "type")]
    pub instrument_type: Option<String>,

    /// Only positions deposited on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only positions deposited on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum PositionCommands {
    /// Register a new position
    Add {
        /// Company the money belongs to
        company: String,

        /// Bank holding the deposit
        bank: String,

        /// Account code at the bank
        account: String,

        /// Instrument type: CDB, a "Fundo..." label, or anything else
        instrument_type: String,

        /// Deposited value
        value: String,

        /// Deposit date (YYYY-MM-DD)
        date: String,

        /// CDI percentage (e.g. 110 for 110% of CDI; required for CDB)
        #[arg(long)]
        cdi: Option<String>,
    },

    /// List positions with computed gross/net figures
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Evaluation date (YYYY-MM-DD, YYYY-MM, or YYYY; defaults to today)
        #[arg(long)]
        at: Option<String>,
    },

    /// Show one position's full yield statement and its withdrawals
    Show {
        /// Position id
        id: i64,

        /// Evaluation date (YYYY-MM-DD, YYYY-MM, or YYYY; defaults to today)
        #[arg(long)]
        at: Option<String>,
    },

    /// Edit fields of an existing position
    Edit {
        /// Position id
        id: i64,

        /// New company
        #[arg(long)]
        company: Option<String>,

        /// New bank
        #[arg(long)]
        bank: Option<String>,

        /// New account code
        #[arg(long)]
        account: Option<String>,

        /// New instrument type
        #[arg(long = "type")]
        instrument_type: Option<String>,

        /// New deposited value
        #[arg(long)]
        value: Option<String>,

        /// New deposit date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New CDI percentage
        #[arg(long)]
        cdi: Option<String>,
    },

    /// Remove a position and all of its withdrawals
    Remove {
        /// Position id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum WithdrawalCommands {
    /// Register a withdrawal against a position
    Add {
        /// Owning position id
        position_id: i64,

        /// Amount to withdraw
        amount: String,

        /// Withdrawal date (YYYY-MM-DD; defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List withdrawals
    List {
        /// Only withdrawals against this position id
        #[arg(long)]
        position: Option<i64>,
    },
}
