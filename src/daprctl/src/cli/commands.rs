use crate::cli::handlers::OutputFormat;
use clap::{Args, Parser, Subcommand};
use daprctl_common::workdir::DAPRCTL_WORK_DIR;
use std::path::PathBuf;

fn footer_message() -> String {
    format!("Log file: {:?}", &DAPRCTL_WORK_DIR.log_file)
}

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "daprctl",
    about = "Inspect local Dapr sidecars and subscribe to pub/sub topics",
    version = env!("CARGO_PKG_VERSION"),
    after_help = footer_message()
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the sidecars running on this host
    List {
        /// Output format
        #[clap(long, short, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Subscribe to a topic through a temporary subscriber app
    Subscribe(SubscribeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SubscribeArgs {
    /// The ID of the subscribing app
    #[clap(long = "subscribe-app-id", short = 'a', visible_alias = "app-id")]
    pub app_id: String,

    /// The name of the pub/sub component
    #[clap(long, short)]
    pub pubsub: String,

    /// The topic to subscribe to
    #[clap(long, short)]
    pub topic: String,

    /// The JSON serialized subscription metadata
    #[clap(long, short)]
    pub metadata: Option<String>,

    /// JSON routing rules, e.g. '{"rules": [{"match": "...", "path": "/widgets"}], "default": "/products"}'
    #[clap(long, short)]
    pub routes: Option<String>,

    /// Directory to create the subscriber's unix domain socket in instead of using a TCP port
    #[clap(long = "unix-domain-socket", short = 'u')]
    pub socket_dir: Option<PathBuf>,
}
