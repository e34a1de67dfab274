use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use vendomat::application::engine::VendingEngine;
use vendomat::domain::ports::MachineStoreBox;
#[cfg(feature = "storage-rocksdb")]
use vendomat::infrastructure::rocksdb::RocksDBStore;
use vendomat::infrastructure::json_file::{DEFAULT_STATE_FILE, JsonFileStore};
use vendomat::interfaces::csv::command_reader::CommandReader;
use vendomat::interfaces::http;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding the machine state. Created on first use.
    #[arg(long, global = true, env = "VENDOMAT_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "VENDOMAT_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[arg(long, env = "VENDOMAT_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },
    /// Execute a CSV command script, printing one JSON response per line.
    Run {
        /// Script with header `op, item, value, amount, change`
        script: PathBuf,
    },
}

fn open_store(state_file: PathBuf, db_path: Option<PathBuf>) -> Result<MachineStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to JSON file storage."
            );
            Ok(Box::new(JsonFileStore::new(state_file)))
        }
        None => Ok(Box::new(JsonFileStore::new(state_file))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    vendomat::telemetry::init();
    let cli = Cli::parse();

    let engine = Arc::new(VendingEngine::new(open_store(cli.state_file, cli.db_path)?));

    match cli.command {
        Command::Serve { addr } => {
            let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
            tracing::info!("listening on {}", listener.local_addr().into_diagnostic()?);
            axum::serve(listener, http::router(engine))
                .await
                .into_diagnostic()?;
        }
        Command::Run { script } => {
            let file = File::open(script).into_diagnostic()?;
            let reader = CommandReader::new(file);
            for command in reader.commands() {
                match command {
                    Ok(command) => {
                        let response = command.execute(&engine).await;
                        let line = serde_json::to_string(&response).into_diagnostic()?;
                        writeln!(io::stdout(), "{line}").into_diagnostic()?;
                    }
                    Err(e) => {
                        eprintln!("Error reading command: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}
