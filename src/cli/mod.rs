//! CLI argument parsing using clap 4.x derive macros

use clap::{Parser, Subcommand, ValueEnum};

/// Automated GPS check-in for the k8n.cn student portal
///
/// Supply a session cookie and coordinates once, then check in on demand or
/// on a daily schedule.
#[derive(Parser, Debug)]
#[command(name = "punchcard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration profile to operate on
    #[arg(short, long, global = true, default_value = "default")]
    pub user: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a check-in right now
    Now {
        /// 1-based class ordinal to use when several classes are found
        /// (skips the interactive prompt)
        #[arg(short, long)]
        choose: Option<String>,
    },

    /// Change one configuration value
    Set {
        /// Which setting to change
        key: SetKey,

        /// The new value (not used by remove-notification)
        value: Option<String>,

        /// Notification target the level applies to
        #[arg(short, long, default_value = "console")]
        target: String,
    },

    /// Show the stored configuration
    Config,

    /// Run the daily auto check-in loop in the foreground
    Daemon,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SetKey {
    /// Session cookie copied from the browser
    Cookie,
    /// Latitude to submit
    Lat,
    /// Longitude to submit
    Lng,
    /// Pinned class id (empty means resolve from the dashboard)
    ClassId,
    /// Coordinate jitter magnitude
    Offset,
    /// Daily auto check-in time, HH:MM
    AutoTime,
    /// Turn the daily auto check-in on or off
    AutoEnable,
    /// Notification level for a target: always/never/failure_only
    Notification,
    /// Drop a target's notification settings
    RemoveNotification,
}
