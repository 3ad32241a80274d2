use civicly_db_migration::{Migrator, MigratorTrait};
use clap::{Parser, Subcommand};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use sea_orm_migration::sea_orm::{ConnectOptions, Database};
use serde::Deserialize;
use std::error::Error;
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Debug, Parser)]
#[clap(name = "civicly-db-migration")]
#[clap(about = "Apply or roll back the Civicly schema", long_about = None)]
struct Cli {
    /// Config file holding `database_url`
    #[clap(short, long, default_value = "App.toml")]
    config: String,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply all pending migrations
    Up,
    /// Roll back the last `num` migrations
    Down {
        #[clap(short, long, default_value_t = 1)]
        num: u32,
    },
    /// Drop everything and re-apply all migrations
    Fresh,
    /// Print applied and pending migrations
    Status,
}

#[derive(Debug, Deserialize)]
struct MigrationConfig {
    database_url: String,
    #[serde(default = "default_log")]
    rust_log: String,
}

fn default_log() -> String {
    "info".to_owned()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config: MigrationConfig = Figment::new()
        .merge(Toml::file(&cli.config))
        .merge(Env::prefixed("CIVICLY_"))
        .extract()?;

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.rust_log);
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("civicly_db_migration=info".parse()?),
        )
        .with_span_events(FmtSpan::FULL)
        .init();

    let mut options: ConnectOptions = config.database_url.into();
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => {
            Migrator::up(&db, None).await?;
            info!("Migrations applied");
        }
        Command::Down { num } => {
            Migrator::down(&db, Some(num)).await?;
            info!("Rolled back {} migration(s)", num);
        }
        Command::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Schema recreated");
        }
        Command::Status => {
            Migrator::status(&db).await?;
        }
    }

    Ok(())
}
