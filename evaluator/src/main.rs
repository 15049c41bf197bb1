use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use clients::{GeminiJudge, SearchApiClient, ServiceArgs};
use evalcore::batch::{BatchOrchestrator, DEFAULT_LABEL};
use evalcore::cache::EvaluationCache;
use evalcore::judge::RelevanceJudge;
use evalcore::record::parse_survey;
use evalcore::summary::BatchSummary;
use evalcore::SurveyRecord;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Evaluate a book search API against survey ground truth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse survey CSV files and print the extracted records as JSON
    Parse {
        /// Input path (file or directory of .csv files)
        #[arg(long)]
        input: String,
    },
    /// Search and judge every survey query, then write the batch result
    Run {
        /// Input path (file or directory of .csv files)
        #[arg(long)]
        input: String,
        /// Output JSON path; stdout when omitted
        #[arg(long)]
        output: Option<String>,
        /// Batch label
        #[arg(long, default_value = DEFAULT_LABEL)]
        label: String,
        #[command(flatten)]
        services: ServiceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input } => {
            let records = load_records(Path::new(&input))?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Commands::Run { input, output, label, services } => {
            run_batch(&input, output.as_deref(), &label, &services).await
        }
    }
}

async fn run_batch(input: &str, output: Option<&str>, label: &str, services: &ServiceArgs) -> Result<()> {
    let records = load_records(Path::new(input))?;
    if records.is_empty() {
        bail!("no valid survey records under {input}");
    }

    let search = SearchApiClient::new(&services.search_config()?)?;
    let judge_config = services.judge_config()?;
    let judge = RelevanceJudge::new(Arc::new(GeminiJudge::new(&judge_config)?), Arc::new(EvaluationCache::new()))
        .with_timeout(judge_config.timeout);
    let orchestrator = BatchOrchestrator::new(Arc::new(search), judge);

    let result = orchestrator.run(&records, label).await?;
    let summary = BatchSummary::of(&result);
    tracing::info!(
        queries = summary.queries,
        avg_precision = result.average_metrics.avg_precision,
        avg_recall = result.average_metrics.avg_recall,
        avg_ndcg = result.average_metrics.avg_ndcg,
        mrr = summary.mean_reciprocal_rank,
        highly_relevant = summary.distribution.highly_relevant,
        partially_relevant = summary.distribution.partially_relevant,
        not_relevant = summary.distribution.not_relevant,
        "batch summary"
    );
    for (query_type, count) in &summary.type_counts {
        tracing::info!(%query_type, count, "queries by type");
    }

    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(output = path, "batch result written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// A single CSV file, or every `.csv` file under a directory in path order.
fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("csv") {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn load_records(input: &Path) -> Result<Vec<SurveyRecord>> {
    let files = collect_inputs(input);
    if files.is_empty() {
        bail!("no survey files found at {}", input.display());
    }
    let mut records = Vec::new();
    for file in files {
        let content = fs::read_to_string(&file)?;
        let parsed = parse_survey(&content);
        tracing::info!(file = %file.display(), records = parsed.len(), "loaded survey file");
        records.extend(parsed);
    }
    Ok(records)
}
