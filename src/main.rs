/// Main entry point for the habit store MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_store::HabitTrackerServer;

/// Find a writable directory for the database, falling back to the temp dir
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit-store")),
        dirs::data_dir().map(|p| p.join("habit-store")),
        dirs::config_dir().map(|p| p.join("habit-store")),
        std::env::current_dir().ok().map(|p| p.join(".habit-store")),
    ];

    for dir in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(dir).is_err() {
            continue;
        }

        let probe = dir.join(".write_test");
        if std::fs::write(&probe, b"ok").is_ok() {
            let _ = std::fs::remove_file(&probe);
            return Ok(dir.join("habits.db"));
        }
    }

    let dir = std::env::temp_dir().join("habit-store");
    std::fs::create_dir_all(&dir)?;

    tracing::warn!("Using temporary directory for database: {}", dir.display());
    Ok(dir.join("habits.db"))
}

/// Command line arguments for the habit store MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Restore corrupt data from the last backup instead of refusing to start
    #[arg(long)]
    recover: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_store={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting habit store MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = HabitTrackerServer::new(db_path, args.recover)?;
    server.run().await?;

    info!("Habit store MCP server shutdown complete");
    Ok(())
}
