use chorepoints_shared::Decision;
use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Options can also be provided via environment variables:
  CONFIG_PATH (default: ./config.yaml)
  DB_PATH     (default: config database_path, then data/app.db)
  RUST_LOG    (default: info)

Every command acts on behalf of the actor id given on the command line;
authentication is the caller's responsibility.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "chorepoints",
    version,
    about = "Chore points workflow engine",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or upgrade the database schema and apply the config seed
    Migrate,
    /// Print a child's current balance
    Balance {
        #[arg(long)]
        child: String,
    },
    /// Print a child's ledger, newest first
    History {
        #[arg(long)]
        child: String,
    },
    /// Record a manual point adjustment
    Adjust {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: i32,
        #[arg(long)]
        note: Option<String>,
    },
    /// Assign a task definition to a child
    Assign {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
        #[arg(long)]
        task: String,
    },
    /// Mark an assignment as done (child)
    Submit {
        #[arg(long)]
        child: String,
        #[arg(long)]
        assignment: String,
    },
    /// Approve or reject a submitted assignment
    Verify {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        assignment: String,
        /// approved | rejected
        #[arg(long)]
        decision: Decision,
    },
    /// Redeem a reward (child)
    Claim {
        #[arg(long)]
        child: String,
        #[arg(long)]
        reward: String,
    },
    /// Approve or reject a pending claim
    Review {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        claim: String,
        /// approved | rejected
        #[arg(long)]
        decision: Decision,
    },
    /// Issue an invitation code for a child
    Invite {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
    },
    /// Join a child using an invitation code
    Accept {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        code: String,
    },
}
