use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use roster_terminal::config::AppConfig;
use roster_terminal::db::Database;
use roster_terminal::logging;
use roster_terminal::schedule;
use roster_terminal::schedule_import::import_schedule_file;

#[derive(Debug, Parser)]
#[command(name = "import_schedule", about = "Import a schedule file without the terminal UI")]
struct Args {
    /// Text file with one `date, opponent, location, time` record per line.
    file: PathBuf,
    /// SQLite file to use instead of ROSTER_DB_PATH.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init_stderr_logger();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let db_path = args.db.unwrap_or(config.db_path);
    let db = Database::open(&db_path).context("unable to open schedule database")?;

    let summary = import_schedule_file(&db, &args.file)?;
    let total = schedule::count_games(&db)?;

    println!("Schedule upload complete");
    println!("DB: {}", db.path().display());
    println!("New games added: {}", summary.added);
    println!("Duplicate games skipped: {}", summary.duplicates);
    println!("Games stored: {total}");
    Ok(())
}
