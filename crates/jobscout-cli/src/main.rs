use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use jobscout_client::{ReqwestFetcher, SelectorExtractor};
use jobscout_core::config::DEFAULT_POOL_SIZE;
use jobscout_core::{BatchProcessor, ExtractionSchema, JobRecord, PipelineConfig};

#[derive(Parser)]
#[command(name = "jobscout", version, about = "Batch job posting scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch job postings and print the extracted records
    Scrape {
        /// Job posting URLs
        urls: Vec<String>,

        /// File with one URL per line (blank lines and `#` comments ignored)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Selector schema JSON file (defaults to the built-in Indeed schema)
        #[arg(short, long, env = "JOBSCOUT_SCHEMA")]
        schema: Option<PathBuf>,

        /// Number of concurrent workers
        #[arg(
            short,
            long,
            env = "JOBSCOUT_POOL_SIZE",
            default_value_t = DEFAULT_POOL_SIZE,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        pool_size: usize,

        /// Maximum URLs waiting for a worker (defaults to the pool size)
        #[arg(
            long,
            env = "JOBSCOUT_QUEUE_CAPACITY",
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        queue_capacity: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(
            long,
            env = "JOBSCOUT_FETCH_TIMEOUT_SECS",
            default_value_t = 30,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout: u64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the effective selector schema
    Schema {
        /// Selector schema JSON file (defaults to the built-in Indeed schema)
        #[arg(short, long, env = "JOBSCOUT_SCHEMA")]
        schema: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobscout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            mut urls,
            file,
            schema,
            pool_size,
            queue_capacity,
            timeout,
            format,
        } => {
            if let Some(path) = file {
                urls.extend(read_url_file(&path)?);
            }
            if urls.is_empty() {
                bail!("No URLs given. Pass them as arguments or with --file.");
            }
            let schema = load_schema(schema.as_deref())?;
            let mut pipeline = PipelineConfig::with_pool_size(pool_size);
            if let Some(capacity) = queue_capacity {
                pipeline = pipeline.with_queue_capacity(capacity);
            }
            cmd_scrape(urls, &schema, pipeline, timeout, format).await?;
        }
        Commands::Schema { schema } => {
            let schema = load_schema(schema.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn load_schema(path: Option<&Path>) -> Result<ExtractionSchema> {
    match path {
        Some(path) => ExtractionSchema::from_file(path)
            .with_context(|| format!("Failed to load schema {}", path.display())),
        None => Ok(ExtractionSchema::indeed()),
    }
}

async fn cmd_scrape(
    urls: Vec<String>,
    schema: &ExtractionSchema,
    pipeline: PipelineConfig,
    timeout_secs: u64,
    format: OutputFormat,
) -> Result<()> {
    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(timeout_secs))
        .and_then(ReqwestFetcher::allow_private_urls)
        .context("Failed to create HTTP client")?;
    let extractor = SelectorExtractor::new(schema)?;
    let processor = BatchProcessor::new(fetcher, extractor, pipeline);

    tracing::info!(urls = urls.len(), schema = %schema.name, "Scraping");
    let outcome = processor.process(urls).await?;

    let stdout = std::io::stdout();
    write_records(&outcome.records, format, stdout.lock())?;

    for failure in &outcome.failures {
        eprintln!("failed: {} ({})", failure.url, failure.error);
    }
    eprintln!(
        "{} of {} URLs extracted",
        outcome.records.len(),
        outcome.submitted
    );

    Ok(())
}

/// Read URLs from a file, one per line.
fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file: {}", path.display()))?;
    Ok(parse_url_lines(&contents))
}

fn parse_url_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn write_records<W: Write>(records: &[JobRecord], format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
