use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use dc_common::config::EngineConfig;
use dc_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use dc_common::{ApplicationRecord, MatchEngine, Project, RecordError};
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "dc-rank",
    about = "Score and rank applications for a project from a JSON request"
)]
struct Cli {
    /// JSON file with `project` and `applications`
    #[arg(long)]
    input: PathBuf,

    /// Shortlist length [default: DC_RANK_TOP_N or 5]
    #[arg(long)]
    top_n: Option<usize>,

    /// Print the full match details for this application instead of ranking
    #[arg(long)]
    explain: Option<i64>,

    /// Classifier artifact bundle [default: DC_MODEL_DIR]
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Text embedder, `hash` or `none` [default: DC_EMBEDDER or none]
    #[arg(long)]
    embedder: Option<String>,

    /// Embedding width for the hashing embedder [default: DC_EMBEDDING_DIMENSION or 384]
    #[arg(long)]
    embedding_dimension: Option<usize>,
}

impl Cli {
    /// Environment first, then explicit flags on top.
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(dir) = &self.model_dir {
            config.model_dir = Some(dir.clone());
        }
        if let Some(embedder) = &self.embedder {
            config.embedder = embedder.trim().to_ascii_lowercase();
        }
        if let Some(dimension) = self.embedding_dimension.filter(|d| *d > 0) {
            config.embedding_dimension = dimension;
        }
        if let Some(top_n) = self.top_n {
            config.default_top_n = top_n;
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    project: Project,
    #[serde(default)]
    applications: Vec<ApplicationRecord>,
}

#[derive(Debug, thiserror::Error)]
enum RankCliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid request in {path}: {source}")]
    Request {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("application {0} is not in the request")]
    NotFound(i64),
    #[error(transparent)]
    Record(#[from] RecordError),
}

fn read_request(path: &Path) -> Result<RankRequest, RankCliError> {
    let raw = fs::read_to_string(path).map_err(|source| RankCliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| RankCliError::Request {
        path: path.to_path_buf(),
        source,
    })
}

fn run() -> Result<(), RankCliError> {
    dotenv().ok();
    init_tracing_subscriber("dc-rank");
    install_tracing_panic_hook("dc-rank");

    let cli = Cli::parse();
    let request = read_request(&cli.input)?;
    let engine = MatchEngine::from_config(&cli.engine_config());

    info!(
        project_id = request.project.id,
        applications = request.applications.len(),
        backend = engine.backend_name(),
        "loaded ranking request"
    );

    let output = match cli.explain {
        Some(application_id) => {
            let record = request
                .applications
                .iter()
                .find(|r| r.application.id == application_id)
                .ok_or(RankCliError::NotFound(application_id))?;
            let details = engine.explain_application(&request.project, record)?;
            serde_json::to_string_pretty(&details)?
        }
        None => {
            let ranked = engine.shortlist(&request.project, &request.applications);
            serde_json::to_string_pretty(&ranked)?
        }
    };

    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("dc-rank failed: {err}");
        std::process::exit(1);
    }
}
