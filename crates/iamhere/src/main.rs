#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use iamhere::{
    config::{Config, DotenvStatus},
    run_server,
};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// IAmHere support backend
#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind, overrides API_HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides API_PORT
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file, overrides DATABASE_PATH
    #[arg(long)]
    database: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let dotenv = DotenvStatus::load();
    let log_file = std::env::var_os("LOG_FILE")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    iamhere::telemetry::init_tracing(log_file.as_deref());
    dotenv.report();

    let mut cfg = Config::from_env()?;
    if let Some(host) = args.host {
        cfg.api_host = host;
    }
    if let Some(port) = args.port {
        cfg.api_port = port;
    }
    if let Some(database) = args.database {
        cfg.database_path = database;
    }

    run_server(cfg).await
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
