use clap::{Parser, Subcommand, ValueEnum};
use ors_admin::NotificationKind;

#[derive(Parser)]
#[command(name = "ors")]
#[command(about = "ORS admin CLI — send push notifications through the ORS API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and ORS_URL env var)
    #[arg(short, long, global = true, env = "ORS_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "ORS_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Page the request is issued from; public pages skip the session check
    #[arg(long, global = true, env = "ORS_PATH")]
    pub path: Option<String>,

    /// Log dispatches and session decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s, true).ok()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the stored login session
    Session(SessionArgs),
    /// Send a notification
    Notify(NotifyArgs),
    /// List roles that can receive role-based notifications
    Roles,
    /// Check that the notification controller answers
    Status,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Store identity fields from an existing login
    Set(SessionSetArgs),
    /// Show the stored identity
    Show,
    /// Remove every stored identity field
    Clear,
}

#[derive(clap::Args)]
pub struct SessionSetArgs {
    /// First name; its presence marks the session as logged in
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Access token, sent as a Bearer credential
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub refresh_token: Option<String>,
    #[arg(long)]
    pub login_id: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub user_id: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum KindArg {
    /// Send to this device's delivery token only
    #[default]
    Test,
    /// Send to every user holding one of the given roles
    RoleBased,
    /// Send to all users
    Broadcast,
}

impl From<KindArg> for NotificationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Test => NotificationKind::Test,
            KindArg::RoleBased => NotificationKind::RoleBased,
            KindArg::Broadcast => NotificationKind::Broadcast,
        }
    }
}

#[derive(clap::Args)]
pub struct NotifyArgs {
    /// Delivery mode
    #[arg(short = 't', long = "type", default_value = "test")]
    pub kind: KindArg,
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub body: String,
    /// Role id to target (repeatable, role-based only)
    #[arg(long = "role")]
    pub roles: Vec<String>,
    /// Delivery token to use instead of the stored one (test only)
    #[arg(long)]
    pub fcm_token: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format, path, timeout)
    pub key: String,
    /// Value
    pub value: String,
}
