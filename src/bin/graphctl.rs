//! Graph control binary entry point.
//!
//! This binary provides a command-line interface for the arXiv knowledge-graph
//! backend: inspecting which dates have stored papers and embeddings,
//! triggering paper fetches and embedding generation, and building the
//! knowledge graph for a date with flexible output formatting (table or JSON).
//!
//! # Examples
//!
//! List available dates:
//! ```bash
//! graphctl dates
//! ```
//!
//! Fetch papers for a date, then generate embeddings:
//! ```bash
//! graphctl fetch 2024-02-01
//! graphctl embed 2024-02-01
//! ```
//!
//! Build the graph and print statistics:
//! ```bash
//! graphctl graph 2024-02-01 --threshold 0.5 --category cs.AI
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arxiv_graph::{
    backend::http::HttpBackend,
    cache::DateAvailabilityCache,
    models::{is_valid_date, DateSelection},
    session::GraphSession,
    view::GraphConfigUpdate,
};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for the graph subcommand
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-friendly statistics table
    Table,
    /// Full graph as machine-readable JSON
    Json,
}

/// Graph control CLI for the arXiv knowledge-graph backend
#[derive(Parser, Debug)]
#[command(
    name = "graphctl",
    version,
    about = "Browse, fetch, and build arXiv knowledge graphs",
    long_about = "Control the arXiv knowledge-graph backend from the command line. \
                  Inspect date availability, trigger paper fetches and embedding \
                  generation, and build similarity graphs.

EXAMPLES:
  List available dates:
    graphctl dates

  Fetch papers for a date:
    graphctl fetch 2024-02-01

  Regenerate embeddings:
    graphctl embed 2024-02-01 --force

  Build a graph as JSON:
    graphctl graph 2024-02-01 --format json"
)]
struct Args {
    /// Base URL of the backend service
    #[arg(long, value_name = "URL", default_value = "http://localhost:8000", global = true)]
    backend_url: String,

    /// Logging verbosity level
    #[arg(long, default_value = "warn", value_name = "LEVEL", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List dates with stored papers and embedding coverage
    Dates,

    /// Trigger a backend paper fetch for a date
    Fetch {
        /// Calendar date (YYYY-MM-DD)
        date: String,
    },

    /// Trigger embedding generation for a date
    Embed {
        /// Calendar date (YYYY-MM-DD)
        date: String,

        /// Regenerate even if embeddings already exist
        #[arg(long)]
        force: bool,
    },

    /// Build the knowledge graph for a date
    Graph {
        /// Calendar date (YYYY-MM-DD)
        date: String,

        /// Minimum similarity for an edge
        #[arg(long, value_name = "SCORE", default_value = "0.6")]
        threshold: f64,

        /// Restrict papers to an arXiv category (e.g. cs.AI)
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,

        /// Skip the backend's precomputed graph and rebuild locally
        #[arg(long)]
        force_rebuild: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

/// Create a spinner for long-running backend operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Validate a user-supplied date argument
fn validate_date(date: &str) -> Result<()> {
    if !is_valid_date(date) {
        anyhow::bail!("Invalid date: '{}'. Expected format: YYYY-MM-DD", date);
    }
    Ok(())
}

/// Print the date/papers/embeddings availability table
async fn run_dates(backend: Arc<HttpBackend>) -> Result<()> {
    let cache = DateAvailabilityCache::new(backend);
    let dates = cache.refresh(true).await;

    if let Some(error) = cache.last_error().await {
        anyhow::bail!("Failed to load date indexes: {}", error);
    }

    if dates.is_empty() {
        println!("No dates available. Run 'graphctl fetch <date>' first.");
        return Ok(());
    }

    let embeddings: HashMap<String, u64> = cache
        .embedding_indexes()
        .await
        .into_iter()
        .map(|e| (e.date, e.total_count))
        .collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Papers").add_attribute(Attribute::Bold),
        Cell::new("Embeddings").add_attribute(Attribute::Bold),
        Cell::new("Fetched At").add_attribute(Attribute::Bold),
    ]);

    for index in &dates {
        let embedded = embeddings.get(&index.date).copied().unwrap_or(0);
        let (embedded_str, color) = if embedded >= index.total_count && embedded > 0 {
            (format!("{}", embedded), Color::Green)
        } else if embedded > 0 {
            (format!("{}", embedded), Color::Yellow)
        } else {
            ("none".to_string(), Color::Red)
        };

        table.add_row(vec![
            Cell::new(&index.date),
            Cell::new(index.total_count),
            Cell::new(embedded_str).fg(color),
            Cell::new(&index.fetched_at),
        ]);
    }

    println!("{}", table);
    println!(
        "{} days, {} papers total",
        cache.total_days().await,
        cache.total_papers().await
    );

    Ok(())
}

/// Trigger a paper fetch and report the outcome
async fn run_fetch(backend: Arc<HttpBackend>, date: &str) -> Result<()> {
    validate_date(date)?;

    let cache = DateAvailabilityCache::new(backend);
    let spinner = create_spinner(&format!("Fetching papers for {}", date));
    let outcome = cache.fetch_for_date(date).await;
    spinner.finish_and_clear();

    if !outcome.success {
        anyhow::bail!(
            "Fetch failed for {}: {}",
            date,
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    match outcome.count {
        Some(count) => println!("Fetched {} papers for {}", count, date),
        None => println!("Fetch complete for {}", date),
    }

    Ok(())
}

/// Trigger embedding generation and report the outcome
async fn run_embed(backend: Arc<HttpBackend>, date: &str, force: bool) -> Result<()> {
    validate_date(date)?;

    let cache = DateAvailabilityCache::new(backend);
    if !force {
        cache.refresh(true).await;
        if cache.has_embedding(date).await {
            println!(
                "Embeddings already exist for {}. Use --force to regenerate.",
                date
            );
            return Ok(());
        }
    }

    let spinner = create_spinner(&format!("Generating embeddings for {}", date));
    let outcome = cache.generate_embedding_for_date(date, force).await;
    spinner.finish_and_clear();

    if !outcome.success {
        anyhow::bail!(
            "Embedding generation failed for {}: {}",
            date,
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    match outcome.generated_count {
        Some(count) => println!("Generated embeddings for {} papers on {}", count, date),
        None => println!("Embedding generation complete for {}", date),
    }

    Ok(())
}

/// Build the graph for a date and print it in the requested format
async fn run_graph(
    backend: Arc<HttpBackend>,
    date: &str,
    threshold: f64,
    category: Option<&str>,
    force_rebuild: bool,
    format: OutputFormat,
) -> Result<()> {
    validate_date(date)?;

    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!(
            "Invalid threshold: {}. Must be between 0.0 and 1.0",
            threshold
        );
    }

    let mut session = GraphSession::new(backend);
    session.store_mut().update_config(GraphConfigUpdate {
        similarity_threshold: Some(threshold),
        ..Default::default()
    });

    let selection = DateSelection::Single(date.to_string());
    let spinner = create_spinner(&format!("Building graph for {}", date));
    let start = Instant::now();
    let result = session.build_graph(&selection, category, force_rebuild).await;
    spinner.finish_and_clear();
    result.with_context(|| format!("Failed to build graph for {}", date))?;

    info!("Graph built in {:.2?}", start.elapsed());

    let graph = session
        .store()
        .graph()
        .ok_or_else(|| anyhow::anyhow!("No graph was stored after a successful build"))?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_statistics_table(graph));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(graph)
                .with_context(|| "Failed to serialize graph to JSON")?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Format graph statistics as a pretty table
fn format_statistics_table(graph: &arxiv_graph::KnowledgeGraphData) -> String {
    let stats = &graph.statistics;

    let mut out = String::new();
    out.push_str(&format!(
        "Graph for {}: {} papers, {} connections, avg similarity {:.1}%\n",
        graph.date,
        stats.total_papers,
        stats.total_connections,
        stats.avg_similarity * 100.0
    ));

    if stats.top_categories.is_empty() {
        return out;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Papers").add_attribute(Attribute::Bold),
    ]);

    for category in &stats.top_categories {
        table.add_row(vec![
            Cell::new(&category.category_name),
            Cell::new(category.count),
        ]);
    }

    out.push_str(&table.to_string());
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level);

    let backend = Arc::new(
        HttpBackend::new(args.backend_url.clone())
            .with_context(|| format!("Failed to create backend client for {}", args.backend_url))?,
    );

    info!("Using backend at {}", args.backend_url);

    match args.command {
        Command::Dates => run_dates(backend).await,
        Command::Fetch { date } => run_fetch(backend, &date).await,
        Command::Embed { date, force } => run_embed(backend, &date, force).await,
        Command::Graph {
            date,
            threshold,
            category,
            force_rebuild,
            format,
        } => {
            run_graph(
                backend,
                &date,
                threshold,
                category.as_deref(),
                force_rebuild,
                format,
            )
            .await
        }
    }
}
