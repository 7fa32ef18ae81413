use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::{parse_duration_minutes, TopicStatus};
use crate::features::analytics::{MAX_DAYS, MAX_WEEKS};

#[derive(Parser)]
#[command(name = "studyflow")]
#[command(about = "Study planning, spaced-repetition revision and study analytics")]
#[command(long_about = "studyflow - study tracking from the command line

Track subjects, topics, study sessions, deadlines and daily plans.
Revisions follow a fixed 1, 3, 7, 14, 30 day spaced-repetition schedule,
and the stats commands summarize how your studying is going.

QUICK START:
  studyflow subject add Maths             Add a subject
  studyflow topic add Maths \"Limits\"      Add a topic to it
  studyflow session log 1h30m -s Maths    Log a study session
  studyflow revise 1                      Record a revision of topic 1
  studyflow due                           Topics due for revision
  studyflow stats                         Full dashboard

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  studyflow <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output,
    /// or 'json' for machine-readable output suitable for scripting.
    /// Defaults to the configured format.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// User whose records are read and written
    #[arg(short, long, global = true, env = "STUDYFLOW_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage subjects
    Subject(SubjectArgs),

    /// Manage topics within subjects
    Topic(TopicArgs),

    /// Log and list study sessions
    Session(SessionArgs),

    /// Manage deadlines
    Deadline(DeadlineArgs),

    /// Manage daily study plans
    Plan(PlanArgs),

    /// Record a revision of a topic
    ///
    /// The next review is scheduled 1, 3, 7, 14 and then every 30 days
    /// after successive revisions.
    ///
    /// Examples:
    ///   studyflow revise 4
    ///   studyflow revise 4 --confidence 3 --at yesterday
    Revise {
        /// Topic id
        topic: i64,

        /// How confident you felt, 1 (shaky) to 5 (solid)
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=5))]
        confidence: Option<u8>,

        /// When the revision happened (default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// List topics due for revision
    Due {
        /// Day to check against (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Study statistics and insights
    ///
    /// Without a subcommand, shows the full dashboard.
    Stats(StatsArgs),

    /// Export all of your records to a JSON file
    Export {
        /// Destination file (default: a dated file under the exports directory)
        file: Option<PathBuf>,
    },

    /// Import records from a JSON export
    ///
    /// Records are added for the current user with fresh ids. Nothing is
    /// imported if any record is invalid.
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// Create or inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Example: studyflow completions bash > ~/.bash_completion.d/studyflow
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ==================== Subjects ====================

#[derive(Args)]
pub struct SubjectArgs {
    #[command(subcommand)]
    pub command: SubjectCommands,
}

#[derive(Subcommand)]
pub enum SubjectCommands {
    /// Add a subject
    Add {
        /// Subject name
        name: String,

        /// Display color
        #[arg(long)]
        color: Option<String>,
    },

    /// List subjects
    List,
}

// ==================== Topics ====================

#[derive(Args)]
pub struct TopicArgs {
    #[command(subcommand)]
    pub command: TopicCommands,
}

#[derive(Subcommand)]
pub enum TopicCommands {
    /// Add a topic to a subject
    Add {
        /// Subject id or name
        subject: String,

        /// Topic title
        title: String,

        /// Initial status (not-started, in-progress, completed)
        #[arg(long, value_parser = parse_topic_status, default_value = "not-started")]
        status: TopicStatus,
    },

    /// List topics
    List {
        /// Only topics of this subject (id or name)
        #[arg(long, short)]
        subject: Option<String>,
    },

    /// Change a topic's status
    Status {
        /// Topic id
        id: i64,

        /// New status (not-started, in-progress, completed)
        #[arg(value_parser = parse_topic_status)]
        status: TopicStatus,
    },
}

// ==================== Sessions ====================

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Log a study session
    ///
    /// Examples:
    ///   studyflow session log 45 -s Maths
    ///   studyflow session log 1h30m --at "2024-03-06 09:00"
    Log {
        /// Duration such as 25, 25m or 1h30m; omit for a session still running
        #[arg(value_parser = parse_duration)]
        duration: Option<u32>,

        /// Subject id or name
        #[arg(long, short)]
        subject: Option<String>,

        /// Start time (default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// List recent sessions
    List {
        /// Maximum number of sessions to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },
}

// ==================== Deadlines ====================

#[derive(Args)]
pub struct DeadlineArgs {
    #[command(subcommand)]
    pub command: DeadlineCommands,
}

#[derive(Subcommand)]
pub enum DeadlineCommands {
    /// Add a deadline
    ///
    /// Example: studyflow deadline add "Lab report" friday -s Chemistry
    Add {
        /// Deadline title
        title: String,

        /// Due date or time (today, friday, in 3 days, 2024-03-10, 2024-03-10 17:00)
        due: String,

        /// Subject id or name
        #[arg(long, short)]
        subject: Option<String>,
    },

    /// Mark a deadline completed
    Done {
        /// Deadline id
        id: i64,
    },

    /// List deadlines
    List {
        /// Only pending deadlines
        #[arg(long)]
        pending: bool,
    },
}

// ==================== Plans ====================

#[derive(Args)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub command: PlanCommands,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Plan something for a day
    Add {
        /// What to do
        title: String,

        /// Day (default: today)
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Mark a plan completed
    Done {
        /// Plan id
        id: i64,
    },

    /// List plans
    List {
        /// First day to show (default: today)
        #[arg(long)]
        from: Option<String>,

        /// Number of days to show
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS)))]
        days: u32,
    },
}

// ==================== Stats ====================

#[derive(Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: Option<StatsCommands>,
}

/// Statistics subcommands.
#[derive(Subcommand)]
pub enum StatsCommands {
    /// Show full dashboard with all metrics
    Dashboard,

    /// Minutes per week
    Weekly {
        /// Number of weeks (default: configured)
        #[arg(long, short, value_parser = window_parser(MAX_WEEKS))]
        weeks: Option<usize>,
    },

    /// Which days you studied, as a heatmap
    Consistency {
        /// Number of days (default: configured)
        #[arg(long, short, value_parser = window_parser(MAX_DAYS))]
        days: Option<usize>,
    },

    /// Current and longest study streaks
    Streaks {
        /// Number of days to look back (default: configured)
        #[arg(long, short, value_parser = window_parser(MAX_DAYS))]
        days: Option<usize>,
    },

    /// Time spent per subject
    Subjects {
        /// Number of days to look back (default: configured)
        #[arg(long, short, value_parser = window_parser(MAX_DAYS))]
        days: Option<usize>,
    },

    /// Topic completion per subject
    Topics,

    /// Deadline adherence
    Deadlines,

    /// Focus score for the last 7 days
    Focus,

    /// Study time this week against last week
    Trend,

    /// Show actionable insights
    Insights,
}

// ==================== Config ====================

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with every setting at its default
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}

/// Window lengths for the stats commands, `1..=max`.
fn window_parser(max: u16) -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=u64::from(max))
}

fn parse_topic_status(s: &str) -> Result<TopicStatus, String> {
    TopicStatus::parse(s).map_err(|e| e.to_string())
}

fn parse_duration(s: &str) -> Result<u32, String> {
    parse_duration_minutes(s).map_err(|e| e.to_string())
}
