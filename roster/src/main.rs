use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use roster::poll_roster;
use roster_store::{
    Color, PlayerRecordStore, PlayerUpdate, Provisioner, RetryPolicy, SqliteTable, StoreConfig,
};

#[derive(Parser, Debug)]
struct Params {
    /// SQLite database path or `sqlite:` url. Falls back to DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    /// YAML file with `database_url`, `sheet` and `pool_size`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the sheet from the config file.
    #[arg(long)]
    sheet: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema and the player sheet.
    Init,
    /// Print every player.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print one player as JSON.
    Show {
        #[arg(long)]
        user_id: i64,
    },
    /// Push a player's position, online flag and notification.
    Update {
        #[arg(long)]
        user_id: i64,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long)]
        online: bool,
        #[arg(long, default_value_t = 0)]
        notification: i64,
    },
    /// Add a new player with its color.
    Provision {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        color: String,
    },
    /// Change a player's color.
    Recolor {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        color: String,
    },
    /// Poll the roster at a fixed interval and log what changed.
    Poll {
        #[arg(
            long,
            default_value_t = 1000,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_ms: u64,
        #[arg(long)]
        rounds: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Params) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config =
        StoreConfig::from_cli_or_env_or_yaml(args.database_url, args.config.as_deref())?;
    if let Some(sheet) = args.sheet {
        config.sheet = sheet;
    }

    let pool = config.connect_with_retry(RetryPolicy::default()).await?;
    let table = SqliteTable::new(pool, config.sheet.clone());
    if config.is_in_memory() || matches!(args.command, Command::Init) {
        table.run_migrations().await?;
        table.create_sheet().await?;
    }
    let store = PlayerRecordStore::new(table);

    match args.command {
        Command::Init => {
            log::info!("sheet '{}' ready at {}", store.backend().sheet(), config.url);
        }
        Command::List { json } => {
            let roster = store.try_read_all().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&roster)?);
            } else {
                for record in &roster {
                    println!("{record}");
                }
            }
        }
        Command::Show { user_id } => match store.find(user_id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => {
                log::warn!("player {user_id} not found");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Update {
            user_id,
            x,
            y,
            online,
            notification,
        } => {
            let update = PlayerUpdate {
                user_id,
                x,
                y,
                online,
                notification,
            };
            if !store.update(&update).await {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Provision { user_id, color } => {
            let record = Provisioner::new(&store)
                .provision(user_id, Color::from(color))
                .await?;
            println!("{record}");
        }
        Command::Recolor { user_id, color } => {
            Provisioner::new(&store)
                .assign_color(user_id, Color::from(color))
                .await?;
        }
        Command::Poll {
            interval_ms,
            rounds,
        } => {
            let roster = poll_roster(&store, Duration::from_millis(interval_ms), rounds).await;
            log::info!("last snapshot had {} players", roster.len());
        }
    }
    Ok(ExitCode::SUCCESS)
}
