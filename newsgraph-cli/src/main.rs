//! newsgraph - entity co-occurrence analytics CLI
//!
//! Drives the pipeline over an article table and manages its output
//! directory:
//!
//! ```bash
//! # Full pipeline: articles.csv -> ner.csv + link.csv
//! newsgraph run --articles data/articles.csv --dir data
//!
//! # Re-run the graph analytics over existing tables
//! newsgraph analyze --dir data --weight-threshold 4 --mode per-community
//!
//! # Emit the visualization document
//! newsgraph export --dir data
//!
//! # Push tables to the graph API
//! newsgraph upload --dir data --base-url https://example.org/api
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use newsgraph::export::{self, ENTITY_TABLE, GRAPH_DOC, LINK_TABLE};
use newsgraph::pipeline;
use newsgraph::source::read_articles;
use newsgraph::upload::{RetryPolicy, Uploader};
use newsgraph::{
    CentralityMode, EntityType, HeuristicTagger, PipelineConfig, PipelineOutput, Result,
};

/// Entity co-occurrence analytics over news article tables.
#[derive(Parser)]
#[command(name = "newsgraph", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: extract entities, aggregate links, detect
    /// communities, score, and write the tables.
    Run(RunArgs),
    /// Re-run the graph analytics over existing ner.csv/link.csv tables.
    Analyze(AnalyzeArgs),
    /// Write the visualization document (graph.json) from the tables.
    Export(ExportArgs),
    /// Upload tables to the graph API.
    Upload(UploadArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to the article table (CSV).
    #[arg(long)]
    articles: PathBuf,
    /// Output directory for ner.csv and link.csv.
    #[arg(long, default_value = "data")]
    dir: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Directory containing ner.csv and link.csv.
    #[arg(long, default_value = "data")]
    dir: PathBuf,
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct ExportArgs {
    /// Directory containing ner.csv and link.csv.
    #[arg(long, default_value = "data")]
    dir: PathBuf,
    /// Output file; defaults to graph.json inside the directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct UploadArgs {
    /// Directory containing ner.csv and link.csv.
    #[arg(long, default_value = "data")]
    dir: PathBuf,
    /// API base URL (endpoints: /article, /node, /edge).
    #[arg(long)]
    base_url: String,
    /// Also upload this article table.
    #[arg(long)]
    articles: Option<PathBuf>,
    /// Attempts per chunk before giving up.
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,
    /// Delay between attempts, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    delay_ms: u64,
}

/// Pipeline thresholds, shared by `run` and `analyze`.
#[derive(Args)]
struct ConfigArgs {
    /// Keep links supported by strictly more than this many articles.
    #[arg(long, default_value_t = 6)]
    weight_threshold: u64,
    /// Minimum clique size k for community detection.
    #[arg(long, default_value_t = 7)]
    clique_size_threshold: usize,
    /// Entity types to keep (comma-separated labels, e.g. PER,ORG).
    #[arg(long, value_delimiter = ',', default_values_t = ["PER".to_string(), "ORG".to_string()])]
    types: Vec<String>,
    /// Centrality scope.
    #[arg(long, value_enum, default_value_t = ModeArg::Global)]
    mode: ModeArg,
    /// Power-iteration cap.
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,
    /// Convergence tolerance.
    #[arg(long, default_value_t = 1e-6)]
    epsilon: f64,
    /// Clique enumeration budget.
    #[arg(long, default_value_t = 100_000)]
    max_cliques: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// One centrality pass over the whole filtered graph.
    Global,
    /// Independent centrality per community subgraph.
    PerCommunity,
}

impl ConfigArgs {
    fn to_config(&self) -> PipelineConfig {
        let mode = match self.mode {
            ModeArg::Global => CentralityMode::Global,
            ModeArg::PerCommunity => CentralityMode::PerCommunity,
        };
        PipelineConfig::default()
            .with_weight_threshold(self.weight_threshold)
            .with_clique_size_threshold(self.clique_size_threshold)
            .with_accepted_types(self.types.iter().map(|t| EntityType::from_label(t)))
            .with_centrality_mode(mode)
            .with_max_iterations(self.max_iterations)
            .with_epsilon(self.epsilon)
            .with_max_cliques(self.max_cliques)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Analyze(args) => analyze(&args),
        Commands::Export(args) => export_doc(&args),
        Commands::Upload(args) => upload(&args),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = args.config.to_config();
    config.validate()?;
    let articles = read_articles(&args.articles)?;
    info!("read {} usable articles from {}", articles.len(), args.articles.display());
    let tagger = HeuristicTagger::new();
    let output = pipeline::run(&tagger, &articles, &config)?;
    write_tables(&args.dir, &output)?;
    print_summary(&output)
}

fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = args.config.to_config();
    config.validate()?;
    let entities = export::read_entities(args.dir.join(ENTITY_TABLE))?;
    let links = export::read_links(args.dir.join(LINK_TABLE))?;
    let output = pipeline::analyze(entities, links, &config)?;
    write_tables(&args.dir, &output)?;
    print_summary(&output)
}

fn export_doc(args: &ExportArgs) -> Result<()> {
    let entities = export::read_entities(args.dir.join(ENTITY_TABLE))?;
    let links = export::read_links(args.dir.join(LINK_TABLE))?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.dir.join(GRAPH_DOC));
    export::write_graph_doc(&output, &entities, &links)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn upload(args: &UploadArgs) -> Result<()> {
    let entities = export::read_entities(args.dir.join(ENTITY_TABLE))?;
    let links = export::read_links(args.dir.join(LINK_TABLE))?;
    let policy = RetryPolicy::new(args.max_attempts, Duration::from_millis(args.delay_ms));
    let uploader = Uploader::new(args.base_url.clone()).with_policy(policy);
    if let Some(path) = &args.articles {
        uploader.upload_articles(&read_articles(path)?)?;
    }
    uploader.upload_nodes(&entities)?;
    uploader.upload_edges(&links)?;
    Ok(())
}

fn write_tables(dir: &Path, output: &PipelineOutput) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    export::write_entities(dir.join(ENTITY_TABLE), &output.entities)?;
    export::write_links(dir.join(LINK_TABLE), &output.links)?;
    info!("wrote {} and {} in {}", ENTITY_TABLE, LINK_TABLE, dir.display());
    Ok(())
}

fn print_summary(output: &PipelineOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&output.metadata)?);
    Ok(())
}
