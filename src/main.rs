use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use numbers_api::{
    convert, get_all_conversions, import_numbers, init_logging, load_csv, parse_input_number,
    setup_database, AppConfig,
};

#[derive(Parser)]
#[command(name = "numbers", version, about = "Convert integers to English words")]
struct Cli {
    /// SQLite database holding conversion records (overrides NUMBERS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the words for a number (nothing is stored)
    Convert {
        #[arg(allow_hyphen_values = true)]
        number: String,
    },
    /// Create a conversion for every row of a CSV with an `input_number` column
    Import { csv: PathBuf },
    /// List stored conversions
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_database_path(cli.db);
    init_logging(&config.log_filter);

    match cli.command {
        Command::Convert { number } => run_convert(&number),
        Command::Import { csv } => run_import(&config.database_path, &csv),
        Command::List => run_list(&config.database_path),
    }
}

fn run_convert(raw: &str) -> Result<()> {
    let number = parse_input_number(raw)?;
    println!("{}", convert(number)?);
    Ok(())
}

fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_import(db_path: &Path, csv_path: &Path) -> Result<()> {
    let rows = load_csv(csv_path)?;
    println!("📂 Loaded {} rows from {:?}", rows.len(), csv_path);

    let conn = open_database(db_path)?;
    let summary = import_numbers(&conn, &rows)?;

    println!("✓ Inserted: {} conversions", summary.inserted);
    for (row, err) in &summary.rejected {
        println!("✗ Row {}: {}", row, err);
    }

    Ok(())
}

fn run_list(db_path: &Path) -> Result<()> {
    let conn = open_database(db_path)?;

    for conversion in get_all_conversions(&conn)? {
        println!("{}  {}", conversion.created_at.format("%Y-%m-%d %H:%M:%S"), conversion);
    }

    Ok(())
}
