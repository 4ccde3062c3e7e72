use crate::export::ExportFormat;
use crate::models::{Channel, SubjectKind};
use clap::{Parser, Subcommand};

/// Command-line interface definition for rattendance
/// School attendance engine: period timetable, grace classification and
/// absentee sweeps over SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record RFID / face detections against a school timetable and sweep absentees using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their defaults")]
        migrate: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Show or edit the stored timetable
    Settings {
        #[arg(long = "print", help = "Print the timetable in effect")]
        print: bool,

        #[arg(
            long = "periods",
            value_name = "HH:MM/MIN,...",
            help = "Replace the period list, e.g. 08:00/45,08:45/45"
        )]
        periods: Option<String>,

        #[arg(
            long = "grace",
            value_name = "FULL/HALF",
            help = "Grace thresholds in minutes, e.g. 5/20"
        )]
        grace: Option<String>,

        #[arg(
            long = "holidays",
            value_name = "DAYS",
            help = "Weekly holidays: indices (0=Sun) or names, or 'none'"
        )]
        holidays: Option<String>,

        #[arg(
            long = "staff",
            value_name = "HH:MM/MIN",
            help = "Staff check-in window, e.g. 09:00/60"
        )]
        staff: Option<String>,

        #[arg(
            long = "reset",
            conflicts_with_all = ["periods", "grace", "holidays", "staff"],
            help = "Drop the stored timetable and use the built-in default"
        )]
        reset: bool,
    },

    /// Manage the subject registry
    Enroll {
        /// Subject identity (badge or face id)
        id: Option<String>,

        #[arg(long, value_enum, default_value = "student")]
        kind: SubjectKind,

        #[arg(long, help = "Display name")]
        name: Option<String>,

        #[arg(long, requires = "id", help = "Remove the subject instead")]
        remove: bool,

        #[arg(long, help = "List enrolled subjects")]
        list: bool,
    },

    /// Record one detection
    Scan {
        /// Recognised identity; omit when nobody matched
        id: Option<String>,

        #[arg(long, value_enum, default_value = "student")]
        kind: SubjectKind,

        #[arg(
            long,
            value_name = "INSTANT",
            help = "Detection instant (RFC 3339, or school-local YYYY-MM-DD HH:MM); default now"
        )]
        at: Option<String>,

        #[arg(long, value_enum, default_value = "rfid")]
        channel: Channel,

        #[arg(long, help = "Period hint for manual entry")]
        period: Option<u32>,
    },

    /// Mark absentees for closed periods
    Sweep {
        #[arg(long, value_name = "INSTANT", help = "Sweep as of this instant; default now")]
        at: Option<String>,

        #[arg(long, conflicts_with = "at", help = "Keep sweeping every sweep_interval_secs")]
        watch: bool,
    },

    /// Current period and attendance count
    Status {
        #[arg(long, value_name = "INSTANT")]
        at: Option<String>,
    },

    /// Presence per weekday over the last seven days
    Stats {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Last day of the week; default today")]
        date: Option<String>,
    },

    /// List attendance records of a day
    List {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Day to list; default today")]
        date: Option<String>,

        #[arg(long, value_enum)]
        kind: Option<SubjectKind>,
    },

    /// Export attendance records
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "YYYY-MM-DD, YYYY-MM-DD:YYYY-MM-DD or all"
        )]
        range: Option<String>,

        #[arg(long, value_enum)]
        kind: Option<SubjectKind>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
