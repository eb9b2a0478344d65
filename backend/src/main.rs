//! Boxoffice CLI - Clean movie metadata and query it
//!
//! # Main Commands
//!
//! ```bash
//! boxoffice transform                       # Raw CSV -> cleaned_movies.csv
//! boxoffice serve                           # Start HTTP server (port 3000)
//! ```
//!
//! # Query Commands
//!
//! ```bash
//! boxoffice genres                          # List genres in the cleaned file
//! boxoffice query --year-min 2015 --genre Action --genre Drama
//! ```
//!
//! Paths and port default to `BOXOFFICE_INPUT`, `BOXOFFICE_DATA` and
//! `BOXOFFICE_PORT` (a `.env` file is read if present); flags win.

use boxoffice::{
    transform_file, Config, Dashboard, FilterCriteria, FilterOverrides, MovieStore,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "boxoffice")]
#[command(about = "Clean movie metadata and explore box office performance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw dataset into the fixed-schema CSV
    Transform {
        /// Raw CSV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Cleaned CSV file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the main genres present in the cleaned file
    Genres {
        /// Cleaned CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Print dashboard aggregates for a filter as JSON
    Query {
        /// Cleaned CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// First release year (inclusive)
        #[arg(long)]
        year_min: Option<i32>,

        /// Last release year (inclusive)
        #[arg(long)]
        year_max: Option<i32>,

        /// Lowest budget (inclusive)
        #[arg(long)]
        budget_min: Option<f64>,

        /// Highest budget (inclusive)
        #[arg(long)]
        budget_max: Option<f64>,

        /// Genre to include; repeat for several (default: dashboard genres)
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Cleaned CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Transform { input, output } => cmd_transform(
            &input.unwrap_or(config.input_path),
            &output.unwrap_or(config.data_path),
        ),

        Commands::Genres { data } => cmd_genres(&data.unwrap_or(config.data_path)),

        Commands::Query {
            data,
            year_min,
            year_max,
            budget_min,
            budget_max,
            genres,
            out,
        } => {
            let overrides = FilterOverrides {
                year_min,
                year_max,
                budget_min,
                budget_max,
                genres: (!genres.is_empty()).then_some(genres),
            };
            cmd_query(&data.unwrap_or(config.data_path), overrides, out.as_deref())
        }

        Commands::Serve { data, port } => {
            cmd_serve(
                data.unwrap_or(config.data_path),
                port.unwrap_or(config.port),
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let report = transform_file(input, output)?;
    let stats = &report.stats;

    eprintln!("\n📊 Summary");
    eprintln!("   Rows read:            {}", report.rows_read);
    eprintln!("   Unreadable:           {}", stats.unreadable);
    eprintln!("   Missing key fields:   {}", stats.missing_key_fields);
    eprintln!("   Below threshold:      {}", stats.below_threshold);
    eprintln!("   Incomplete:           {}", stats.incomplete);
    eprintln!("   Unknown genre:        {}", stats.unknown_genre);
    eprintln!("   ✅ Written:           {}", report.rows_written);
    eprintln!("   💾 Saved to: {}", report.output.display());

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_genres(data: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let table = MovieStore::new(data).load()?;
    for genre in table.available_genres() {
        println!("{}", genre);
    }
    Ok(())
}

fn cmd_query(
    data: &Path,
    overrides: FilterOverrides,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = MovieStore::new(data).load()?;
    let criteria = FilterCriteria::dashboard_default(&table).with_overrides(overrides)?;
    let dashboard = Dashboard::build(&table, criteria);

    let json = serde_json::to_string_pretty(&dashboard)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(data: PathBuf, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    boxoffice::server::start_server(MovieStore::new(data), port).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
