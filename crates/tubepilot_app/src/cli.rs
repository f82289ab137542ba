use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tubepilot_core::constants::{DEFAULT_LOG_PAGE_SIZE, MAX_RETRY_ATTEMPTS};
use tubepilot_core::{Privacy, Theme};
use tubepilot_gateway::DEFAULT_API_URL;

use crate::platform::logging::LogDestination;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_DIR: &str = ".tubepilot";

#[derive(Parser)]
#[command(
    name = "tubepilot",
    version,
    about = "Drive a remote video automation service"
)]
pub struct Cli {
    #[arg(long, global = true, env = "TUBEPILOT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Per-request timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "TUBEPILOT_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
    /// Directory holding the stored token and settings.
    #[arg(long, global = true, env = "TUBEPILOT_STATE_DIR", default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,
    /// Attempts for commands that only read remote state.
    #[arg(long, global = true, default_value_t = MAX_RETRY_ATTEMPTS)]
    pub retries: u32,
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an access token for later commands.
    Login { token: String },
    /// Forget the stored token and settings.
    Logout,
    /// Show the locally known state.
    Status,
    /// Scrape one or more video pages.
    Scrape {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    Download {
        url: String,
        #[arg(long)]
        quality: Option<String>,
    },
    Process(ProcessArgs),
    Upload(UploadArgs),
    #[command(subcommand)]
    Scheduler(SchedulerCommand),
    Quota,
    Analytics,
    #[command(subcommand)]
    Settings(SettingsCommand),
    #[command(subcommand)]
    Logs(LogsCommand),
}

#[derive(Args)]
pub struct MetadataArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_enum)]
    pub privacy: Option<PrivacyArg>,
}

#[derive(Args)]
pub struct ProcessArgs {
    pub file_path: String,
    #[command(flatten)]
    pub metadata: MetadataArgs,
}

#[derive(Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub metadata: MetadataArgs,
}

#[derive(Subcommand)]
pub enum SchedulerCommand {
    Status,
    Start,
    Stop,
    /// Show the remote configuration.
    Config,
    /// Replace the remote configuration.
    Configure(ConfigureArgs),
    /// List the preset schedules.
    Presets,
    /// Poll the status until interrupted.
    Watch {
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
    },
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Five-field cron expression.
    #[arg(long)]
    pub schedule: String,
    #[arg(long)]
    pub max_videos_per_day: u32,
    #[arg(long = "category")]
    pub categories: Vec<String>,
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    Set(SettingsSetArgs),
}

#[derive(Args)]
pub struct SettingsSetArgs {
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub channel_id: Option<String>,
    #[arg(long, value_enum)]
    pub default_privacy: Option<PrivacyArg>,
    #[arg(long)]
    pub auto_tags: Option<bool>,
    #[arg(long)]
    pub notifications: Option<bool>,
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,
}

#[derive(Subcommand)]
pub enum LogsCommand {
    List {
        #[arg(long, default_value_t = DEFAULT_LOG_PAGE_SIZE)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    Clear,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PrivacyArg {
    Public,
    Private,
    Unlisted,
}

impl From<PrivacyArg> for Privacy {
    fn from(value: PrivacyArg) -> Self {
        match value {
            PrivacyArg::Public => Privacy::Public,
            PrivacyArg::Private => Privacy::Private,
            PrivacyArg::Unlisted => Privacy::Unlisted,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::System => Theme::System,
        }
    }
}
