use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use bridge_core::VERSION;

/// Bridge - local encrypted map from opaque student ids to student identity
#[derive(Parser)]
#[command(name = "bridge")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the bridge file
    #[arg(short, long, global = true, env = "BRIDGE_PATH")]
    pub bridge: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, env = "BRIDGE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty bridge
    Init(InitArgs),

    /// List and edit the roster
    #[command(subcommand)]
    Roster(RosterCommand),

    /// Merge students from a CSV file (name,localId[,classPeriod])
    Import(ImportArgs),

    /// Change the bridge passphrase
    Rotate,

    /// Work with the encrypted envelope
    #[command(subcommand)]
    Envelope(EnvelopeCommand),

    /// Check outbound payloads for student identity keys
    #[command(subcommand)]
    Guard(GuardCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the bridge will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// District name
    #[arg(long)]
    pub district: Option<String>,

    /// School name
    #[arg(long)]
    pub school: Option<String>,

    /// Teacher name
    #[arg(long)]
    pub teacher: Option<String>,

    /// Class periods offered (repeatable)
    #[arg(long = "period", value_name = "PERIOD")]
    pub periods: Vec<String>,

    /// PBKDF2 iterations for this bridge
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Write a config file pointing at the new bridge
    #[arg(long)]
    pub write_config: bool,
}

#[derive(Subcommand)]
pub enum RosterCommand {
    /// List students
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        name: Option<String>,

        /// Exact local ID lookup
        #[arg(long)]
        local_id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one student by opaque id
    Show {
        /// Student id
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a student
    Add {
        /// Student name
        #[arg(value_name = "NAME")]
        name: String,

        /// District-assigned student ID
        #[arg(long)]
        local_id: Option<String>,

        /// Class period or section
        #[arg(long)]
        class_period: Option<String>,
    },

    /// Update a student
    Update {
        /// Student id
        #[arg(value_name = "ID")]
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New local ID (empty clears it)
        #[arg(long)]
        local_id: Option<String>,

        /// New class period (empty clears it)
        #[arg(long)]
        class_period: Option<String>,
    },

    /// Remove a student
    Remove {
        /// Student id
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Replace the list of class periods
    Periods {
        /// Class periods (empty clears the list)
        #[arg(value_name = "PERIOD")]
        periods: Vec<String>,
    },
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import ("-" reads stdin)
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Output the import summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum EnvelopeCommand {
    /// Show non-secret envelope metadata (no passphrase needed)
    Inspect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a freshly sealed copy of the bridge to another file
    Export {
        /// Destination path
        #[arg(value_name = "DEST")]
        destination: String,
    },
}

#[derive(Subcommand)]
pub enum GuardCommand {
    /// Scan a JSON payload and report denylisted key paths
    Scan {
        /// JSON file to scan ("-" reads stdin)
        #[arg(value_name = "FILE")]
        file: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// POST a JSON payload through the guard
    Send {
        /// Destination URL
        #[arg(value_name = "URL")]
        url: String,

        /// JSON body file ("-" reads stdin)
        #[arg(value_name = "FILE")]
        file: String,

        /// Extra request headers (NAME:VALUE, repeatable)
        #[arg(long = "header", short = 'H', value_name = "HEADER")]
        headers: Vec<String>,
    },
}
