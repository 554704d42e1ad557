//! cvsync CLI - runs and schedules the CVCRM sales sync.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::stats::OutputFormat;

#[derive(Parser)]
#[command(name = "cvsync")]
#[command(version)]
#[command(about = "Incremental sync of CVCRM sales data into PostgreSQL or SQLite")]
#[command(
    long_about = "cvsync pulls developments, units, reservations, sales, commissions, \
payouts, prosoluto and attendance records from the CVCRM data-warehouse API and upserts \
them into a relational schema with reporting views for dashboards."
)]
#[command(after_long_help = r#"EXAMPLES
    Run one sync now, ignoring the operating window:
        $ cvsync run --force

    Run as a service (initial pass, then every 4 hours):
        $ cvsync daemon

    Create the schema without syncing:
        $ cvsync migrate up

    Show row counts as JSON:
        $ cvsync stats --output json

CONFIGURATION
    cvsync reads configuration from:
      1. ~/.config/cvsync/config.toml (or $XDG_CONFIG_HOME/cvsync/config.toml)
      2. ./cvsync.toml
      3. Environment variables (CVSYNC_* prefix, e.g., CVSYNC_API__TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    CVSYNC_DATABASE__URL        Database connection string (default: ~/.local/state/cvsync/cvsync.db)
    CVSYNC_API__EMAIL           CVCRM API e-mail (legacy: CVCRM_API_EMAIL)
    CVSYNC_API__TOKEN           CVCRM API token (legacy: CVCRM_API_TOKEN)
    CVSYNC_SCHEDULE__ENVIRONMENT  "production" enables the 6h-22h window (legacy: RAILWAY_ENVIRONMENT)
    CVSYNC_ALERT__USER          SMTP user for alerts (legacy: ALERT_EMAIL_USER)
    CVSYNC_ALERT__PASSWORD      SMTP password (legacy: ALERT_EMAIL_PASSWORD)
    DATABASE_URL                Used when no database URL is configured
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full sync pass
    Run {
        /// Run even outside the production operating window
        #[arg(short, long)]
        force: bool,
    },
    /// Run a pass now, then on the configured cron schedule
    Daemon,
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Show row counts per table
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Interactive runs print their own progress; keep library logs to warnings.
    let default_filter = if Term::stdout().is_term() {
        "cvsync=warn,cvsync_cli=warn"
    } else {
        "cvsync=info,cvsync_cli=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set database.url or DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Run { force } => {
            commands::run::handle_run(&config, &database_url, force).await?;
        }
        Commands::Daemon => {
            commands::daemon::handle_daemon(&config, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Stats { output } => {
            commands::stats::handle_stats(output, &database_url).await?;
        }
    }

    Ok(())
}
