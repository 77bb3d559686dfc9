use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod aggregate;
mod chart;
mod color;
mod config;
mod db;
mod error;
mod heatmap;
mod models;
mod report;
mod scoring;
mod tracking;

use config::{AttemptMode, BandCount};
use heatmap::{Heatmap, HeatmapOptions};

#[derive(Parser)]
#[command(name = "scorm-heatmap")]
#[command(about = "Per-question score heatmaps for SCORM activities", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct HeatmapArgs {
    #[arg(long)]
    scorm_id: i64,
    /// Number of score bands (at least 2)
    #[arg(long, default_value = "10")]
    bands: BandCount,
    /// Keep each attempt separate instead of one row per learner
    #[arg(long)]
    per_attempt: bool,
}

impl HeatmapArgs {
    fn options(&self) -> HeatmapOptions {
        HeatmapOptions {
            bands: self.bands,
            mode: if self.per_attempt {
                AttemptMode::PerAttempt
            } else {
                AttemptMode::PerLearner
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo activity with tracking data
    Seed,
    /// Import tracking rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Emit the chart description as JSON
    Heatmap {
        #[command(flatten)]
        args: HeatmapArgs,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        args: HeatmapArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn load_heatmap(pool: &PgPool, args: &HeatmapArgs) -> anyhow::Result<Heatmap> {
    let records = db::fetch_tracking(pool, args.scorm_id).await?;
    let heatmap = heatmap::build(
        &records,
        &args.options(),
        &scoring::RuleRegistry::default(),
        &chart::EnglishStrings,
    )?;
    Ok(heatmap)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the tracking database")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let scorm_id = db::seed(&pool).await?;
            println!("Seed data inserted for scorm {scorm_id}.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} tracking rows from {}.", csv.display());
        }
        Commands::Heatmap { args, out } => {
            db::fetch_activity_name(&pool, args.scorm_id).await?;
            let heatmap = load_heatmap(&pool, &args).await?;
            let json = serde_json::to_string_pretty(&heatmap.chart)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Heatmap written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { args, out } => {
            let activity = db::fetch_activity_name(&pool, args.scorm_id).await?;
            let heatmap = load_heatmap(&pool, &args).await?;
            let report = report::build_report(
                &activity,
                chrono::Local::now().naive_local(),
                args.bands,
                &heatmap,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
