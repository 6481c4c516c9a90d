use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse, highlight and run CRM advanced search strings
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Search profile (TOML) with field metadata
    #[arg(long, global = true, env = "CRM_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a search string into offsets
    Parse {
        /// Search string, e.g. 'status:open -tag:lost acme'
        query: String,
    },
    /// Turn a JSON parsed query back into a search string
    Serialize {
        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Render a search string with keyword highlighting
    Highlight {
        query: String,

        /// Emit HTML spans instead of terminal colors
        #[arg(long)]
        html: bool,
    },
    /// Show the storage predicates a search string translates to
    Translate {
        query: String,

        /// Fail on unknown keywords instead of skipping them
        #[arg(long)]
        strict: bool,
    },
    /// Apply the active/inactive toggle to a search string and show the
    /// resulting submit action
    ToggleActive {
        query: String,

        /// true or false
        #[arg(action = clap::ArgAction::Set, value_parser = clap::value_parser!(bool))]
        active: bool,
    },
    /// Search a JSON file of records
    Search {
        query: String,

        /// JSON array of records
        #[arg(short, long)]
        records: PathBuf,

        /// Only records updated after this RFC 3339 timestamp
        #[arg(long)]
        modified_since: Option<String>,

        /// Fail on unknown keywords instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Write the matching records as CSV instead of a listing
        #[arg(long)]
        export: bool,
    },
    /// Count records grouped by a relation, field or `active`
    Count {
        /// JSON array of records
        #[arg(short, long)]
        records: PathBuf,

        /// Relation or field to group by
        #[arg(short, long, default_value = crate::crm::DEFAULT_GROUP_BY)]
        group_by: String,

        /// Only records assigned to this user
        #[arg(long)]
        assignee: Option<String>,
    },
    /// List the keywords offered by the picker
    Fields,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
