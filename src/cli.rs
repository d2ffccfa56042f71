use clap::{Parser, Subcommand};

/// Election results reporting for the school voting back office.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Admin user recorded in the audit log. Defaults to REPORT_ACTOR.
    #[clap(long, global = true, value_parser)]
    pub actor: Option<String>,

    /// Turn on debug logging.
    #[clap(long, global = true, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the tables if they do not exist yet.
    InitSchema,
    /// Vote counts and percentages per position.
    Tally {
        #[clap(value_parser)]
        election_id: i64,
    },
    /// Turnout per program and overall participation.
    Turnout {
        #[clap(value_parser)]
        election_id: i64,
    },
    /// Completed sessions per hour.
    Timeline {
        #[clap(value_parser)]
        election_id: i64,
        /// (YYYY-MM-DD) Print a zero-filled 24 hour axis for this day instead of sparse buckets.
        #[clap(long, value_parser)]
        fill_date: Option<String>,
    },
    /// Counting statistics, system-wide unless an election is given.
    Summary {
        #[clap(long, value_parser)]
        election: Option<i64>,
    },
    /// List elections, newest first.
    Elections {
        #[clap(long, value_parser, default_value_t = 1, allow_hyphen_values = true)]
        page: i64,
        #[clap(long, value_parser, default_value_t = 20, allow_hyphen_values = true)]
        per_page: i64,
        /// draft, active, completed or cancelled
        #[clap(long, value_parser)]
        status: Option<String>,
    },
}
