//! # cake-crawler CLI Application
//!
//! Command-line front end for the crawler.
//!
//! ## Key Components
//!
//! - `crawl`: run the listing/detail pipeline into the database
//! - `locate`: match one location string against the gazetteer
//! - `seed-locations`: load the gazetteer into the database
//! - `list`: print stored jobs as text or JSON

mod telemetry;

use anyhow::Context;
use cake_crawler::crawler::{
    CrawlReport, CrawlerConfig, Pipeline, PipelineConfig, PipelineState, Profession,
};
use cake_crawler::job::Remote;
use cake_crawler::location::{Gazetteer, JsonGazetteerSource, LocationMatcher};
use cake_crawler::store::{Database, JobFilter, JobSink, MemorySink};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Parser)]
#[command(author, version, about = "Crawl job postings and reconcile their locations", long_about = None)]
struct Cli {
    /// Export traces and metrics over OTLP
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl listing and detail pages and store the postings
    Crawl(CrawlArgs),

    /// Match a location string against the gazetteer
    Locate(LocateArgs),

    /// Load the gazetteer into the database
    SeedLocations(SeedArgs),

    /// List stored postings
    List(ListArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Profession filter code (repeatable)
    #[arg(short, long = "profession")]
    professions: Vec<String>,

    /// Listing pages per profession
    #[arg(short = 'p', long, default_value = "10")]
    max_pages: u32,

    /// Location filter for the listing search
    #[arg(short, long, default_value = cake_crawler::crawler::DEFAULT_LOCATION)]
    location: String,

    /// Concurrent requests per crawl stage
    #[arg(long, default_value = "30")]
    parallelism: usize,

    /// Upper bound of the random delay before each request, in milliseconds
    #[arg(long, default_value = "200")]
    delay: u64,

    /// Database path
    #[arg(long, default_value = "cake.db")]
    database: PathBuf,

    /// Gazetteer JSON file
    #[arg(long, default_value = "data/address.json")]
    gazetteer: PathBuf,

    /// Keep records in memory and print them as JSON instead of storing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct LocateArgs {
    /// Free-text location, e.g. "Taipei, Taiwan"
    #[arg(required = true)]
    location: String,

    /// Gazetteer JSON file
    #[arg(long, default_value = "data/address.json")]
    gazetteer: PathBuf,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Database path
    #[arg(long, default_value = "cake.db")]
    database: PathBuf,

    /// Gazetteer JSON file
    #[arg(long, default_value = "data/address.json")]
    gazetteer: PathBuf,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Only jobs of this company
    #[arg(long)]
    company: Option<String>,

    /// Only jobs with this exact title
    #[arg(long)]
    title: Option<String>,

    /// Remote policy: full, partial, optional or none (repeatable)
    #[arg(long = "remote", value_parser = parse_remote)]
    remotes: Vec<Remote>,

    /// Only jobs carrying any of these tags (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Page of results, starting at 1
    #[arg(long, requires = "per_page")]
    page: Option<u32>,

    /// Results per page
    #[arg(long)]
    per_page: Option<u32>,

    /// Database path
    #[arg(long, default_value = "cake.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.otel)?;

    match cli.command {
        Some(Commands::Crawl(args)) => crawl_command(args).await?,
        Some(Commands::Locate(args)) => locate_command(args)?,
        Some(Commands::SeedLocations(args)) => seed_command(args).await?,
        Some(Commands::List(args)) => list_command(args).await?,
        None => {
            let _ = Cli::parse_from(["cake-crawler", "--help"]);
        }
    }

    Ok(())
}

fn load_gazetteer(path: &Path) -> cake_crawler::Result<Gazetteer> {
    let gazetteer = Gazetteer::load(&JsonGazetteerSource::new(path))?;
    info!("Gazetteer has {} entries", gazetteer.len());
    Ok(gazetteer)
}

async fn open_database(path: &Path) -> cake_crawler::Result<Database> {
    Ok(Database::new_from_path(&path.to_string_lossy()).await?)
}

fn parse_remote(value: &str) -> Result<Remote, String> {
    match value.to_ascii_lowercase().as_str() {
        "full" => Ok(Remote::Full),
        "partial" => Ok(Remote::Partial),
        "optional" => Ok(Remote::Optional),
        "none" => Ok(Remote::None),
        _ => Remote::from_label(value)
            .ok_or_else(|| format!("unknown remote policy '{}'", value)),
    }
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let gazetteer = load_gazetteer(&args.gazetteer)
        .with_context(|| format!("Failed to load gazetteer from {}", args.gazetteer.display()))?;

    let professions = if args.professions.is_empty() {
        Profession::defaults()
    } else {
        args.professions.iter().map(Profession::new).collect()
    };
    let config = PipelineConfig::builder()
        .professions(professions)
        .max_pages(args.max_pages)
        .location(args.location.clone())
        .crawler(
            CrawlerConfig::builder()
                .parallelism(args.parallelism)
                .random_delay_ms(args.delay)
                .build(),
        )
        .build();

    if args.dry_run {
        let sink = Arc::new(MemorySink::new());
        let matcher = Arc::new(LocationMatcher::new(gazetteer));
        let pipeline = Pipeline::new(config, Arc::clone(&sink), matcher)?;
        let report = run_with_progress(&pipeline).await?;

        println!("{}", serde_json::to_string_pretty(&sink.records().await)?);
        eprintln!("{}", report);
        return Ok(());
    }

    let db = open_database(&args.database)
        .await
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    // Upsert by address, so a changed gazetteer file takes effect
    let seeded = db.save_locations(gazetteer.entries()).await?;
    info!(seeded, "Seeded locations");
    let matcher = Arc::new(LocationMatcher::new(gazetteer));
    let pipeline = Pipeline::new(config, Arc::new(db), matcher)?;
    let report = run_with_progress(&pipeline).await?;

    println!("{}", report);
    Ok(())
}

/// Run one crawl while a spinner shows the stage and queue sizes
async fn run_with_progress<S: JobSink>(pipeline: &Pipeline<S>) -> anyhow::Result<CrawlReport> {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress_bar.enable_steady_tick(Duration::from_millis(120));

    let run = pipeline.update();
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            _ = ticker.tick() => {
                let (listing, detail) = pipeline.pending();
                progress_bar.set_message(format!(
                    "{}: {} listing / {} detail pages pending",
                    pipeline.state(),
                    listing,
                    detail
                ));
            }
        }
    };

    progress_bar.finish_with_message(PipelineState::Done.to_string());
    Ok(result?)
}

#[instrument]
fn locate_command(args: LocateArgs) -> anyhow::Result<()> {
    let gazetteer = load_gazetteer(&args.gazetteer)
        .with_context(|| format!("Failed to load gazetteer from {}", args.gazetteer.display()))?;
    let matcher = LocationMatcher::new(gazetteer);
    let result = matcher.best_match(&args.location);

    match result.entry {
        Some(entry) => println!("{} (score {:.3})", entry.address(), result.score),
        None => println!("No match (best score {:.3})", result.score),
    }
    Ok(())
}

#[instrument]
async fn seed_command(args: SeedArgs) -> anyhow::Result<()> {
    let gazetteer = load_gazetteer(&args.gazetteer)
        .with_context(|| format!("Failed to load gazetteer from {}", args.gazetteer.display()))?;
    let db = open_database(&args.database)
        .await
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;

    let saved = db.save_locations(gazetteer.entries()).await?;
    let total = db.location_count().await?;
    println!(
        "Saved {} locations to {} ({} stored)",
        saved,
        args.database.display(),
        total
    );
    Ok(())
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let db = open_database(&args.database)
        .await
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;

    let mut filter = JobFilter::new();
    filter.company = args.company.clone();
    filter.title = args.title.clone();
    filter.remotes = args.remotes.clone();
    filter.tags = args.tags.clone();
    if let Some(per_page) = args.per_page {
        filter = filter.page(args.page.unwrap_or(1), per_page);
    }
    let jobs = db.find_jobs(&filter).await?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        _ => {
            println!("Stored jobs: {}", jobs.len());
            for job in jobs {
                let record = &job.record;
                println!("{} - {}", record.company, record.title);
                println!("   URL: {}", record.link);
                println!(
                    "   Location: {} ({})",
                    record.location,
                    job.canonical_location.as_deref().unwrap_or("unmatched")
                );
                println!(
                    "   {} / {} / {}",
                    record.employment_type, record.seniority, record.remote
                );
                if !record.salary.is_empty() {
                    println!("   Salary: {}", record.salary);
                }
                println!();
            }
        }
    }

    Ok(())
}
