use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "workchain", about = "Single-node proof-of-work ledger")]
pub struct Opt {
    /// Identity the command runs as
    #[arg(long = "user", short = 'u', global = true)]
    pub user: Option<String>,

    /// Directory holding the snapshots and the account database
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(name = "init", about = "Create the chain snapshot with its genesis block")]
    Init,
    #[command(name = "createaccount", about = "Register a new identity")]
    Createaccount {
        #[arg(help = "Identity to register")]
        identity: String,
    },
    #[command(name = "grant", about = "Credit seed tokens to an account")]
    Grant {
        #[arg(help = "Identity to credit")]
        identity: String,
        #[arg(long = "amount", help = "Tokens to credit (defaults to the configured grant)")]
        amount: Option<u64>,
    },
    #[command(name = "balance", about = "Show an account balance")]
    Balance {
        #[arg(help = "Identity to look up (defaults to --user)")]
        identity: Option<String>,
    },
    #[command(name = "send", about = "Queue a transfer from the --user account")]
    Send {
        #[arg(help = "Receiving identity")]
        to: String,
        #[arg(help = "Amount to transfer")]
        amount: u64,
        #[arg(long = "from", help = "Sending identity (defaults to --user)")]
        from: Option<String>,
    },
    #[command(name = "listpool", about = "Print pending transfers")]
    Listpool,
    #[command(name = "mine", about = "Mine pending transfers into a block, fees to --user")]
    Mine,
    #[command(name = "printchain", about = "Print all blocks in the chain")]
    Printchain {
        #[arg(long = "json", help = "Print as JSON")]
        json: bool,
    },
    #[command(name = "validate", about = "Re-check every block hash and link")]
    Validate,
}
