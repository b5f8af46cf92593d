use std::{process::ExitCode, time::Duration};

use blog_seed::{article_names, list_articles, reset_articles, seed_articles};
use blog_server::database::RedisStore;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Where to reach the document store
    #[arg(long, env = "BLOG_DB_ADDRESS", default_value = "redis://127.0.0.1:6379")]
    db_address: String,

    /// Logical database namespace
    #[arg(long, env = "BLOG_DB_NAME", default_value = "my-blog")]
    db_name: String,

    /// Connect timeout in milliseconds
    #[arg(long, env = "BLOG_DB_CONNECT_TIMEOUT_MS", default_value_t = 2000)]
    connect_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create articles with zero upvotes and no comments, resetting existing ones
    Seed { names: Vec<String> },

    /// Print every seeded article
    List,

    /// Remove every seeded article
    Reset,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let store = match RedisStore::open(
        &args.db_address,
        &args.db_name,
        Duration::from_millis(args.connect_timeout_ms),
    ) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Invalid database address {}: {e}", args.db_address);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Seed { names } => seed_articles(&store, &article_names(names)).await,
        Command::List => list_articles(&store).await,
        Command::Reset => reset_articles(&store).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
