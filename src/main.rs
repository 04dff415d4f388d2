mod commands;
mod permission;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use showup_core::config::ShowUpConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "showup")]
#[command(about = "Share event invitations as links and get reminded before they start")]
struct Cli {
    /// Log what showup is doing (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event and print its shareable link
    New(commands::new::NewArgs),
    /// Show the event carried by a link
    Open { link: String },
    /// Confirm attendance and schedule reminders
    Confirm { link: String },
    /// Decline attendance and cancel reminders
    Decline { link: String },
    /// List reminders that haven't fired yet
    Pending,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ShowUpConfig::load()?;

    match cli.command {
        Commands::New(args) => commands::new::run(args, &config),
        Commands::Open { link } => commands::open::run(&link, config).await,
        Commands::Confirm { link } => commands::confirm::run(&link, config).await,
        Commands::Decline { link } => commands::decline::run(&link, config).await,
        Commands::Pending => commands::pending::run(config).await,
    }
}

/// Logs go to stderr so links printed on stdout stay pipeable.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "showup=info,showup_core=info",
        _ => "showup=debug,showup_core=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
