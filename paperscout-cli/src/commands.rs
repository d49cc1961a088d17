//! CLI subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use paperscout_core::config::{PaperScoutConfig, load_config};
use paperscout_core::extract::extract_file;
use paperscout_core::summarizer::{SummarizationBackend, backend_from_config};
use paperscout_core::{
    ArxivClient, Document, LengthTier, PaperScoutError, Pipeline, PipelineError, SummarizeError,
    Summarizer,
};
use tokio::io::AsyncReadExt;

use crate::render;
use crate::{Commands, ConfigAction, InputArgs};

/// How results are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    options: OutputOptions,
) -> anyhow::Result<()> {
    match command {
        Commands::Summarize { input, length } => {
            handle_summarize(input, length, workspace, options).await
        }
        Commands::Related { input, max_results } => {
            handle_related(input, max_results, workspace, options).await
        }
        Commands::Search { query, max_results } => {
            handle_search(&query.join(" "), max_results, workspace, options).await
        }
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn load(workspace: &Path) -> anyhow::Result<PaperScoutConfig> {
    load_config(Some(workspace), None)
        .map_err(PaperScoutError::from)
        .context("Failed to load config")
}

/// Build the pipeline. Discovery commands never call the summarizer, so a
/// missing API key only matters when `needs_summarizer` is set.
fn build_pipeline(config: &PaperScoutConfig, needs_summarizer: bool) -> anyhow::Result<Pipeline> {
    let search = ArxivClient::new(&config.search).map_err(PaperScoutError::from)?;

    let backend: Arc<dyn SummarizationBackend> = match backend_from_config(&config.summarizer) {
        Ok(backend) => backend,
        Err(err) if needs_summarizer => return Err(PaperScoutError::from(err).into()),
        Err(err) => {
            tracing::debug!(error = %err, "Summarizer not configured; discovery only");
            Arc::new(Unconfigured { error: err })
        }
    };

    let summarizer = Summarizer::from_config(backend, &config.summarizer);
    Ok(Pipeline::new(
        Arc::new(search),
        summarizer,
        config.pipeline.clone(),
    ))
}

/// Stand-in backend for commands that never summarize.
struct Unconfigured {
    error: SummarizeError,
}

#[async_trait::async_trait]
impl SummarizationBackend for Unconfigured {
    async fn summarize(
        &self,
        _text: &str,
        _budget: paperscout_core::SummaryBudget,
    ) -> Result<String, SummarizeError> {
        Err(SummarizeError::Unavailable {
            backend: "unconfigured".to_string(),
            message: self.error.to_string(),
        })
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Resolve the research text from `--file`, `--text`, or stdin.
async fn read_input(input: InputArgs) -> anyhow::Result<Document> {
    if let Some(path) = input.file {
        let doc = extract_file(&path)
            .await
            .map_err(PaperScoutError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(doc);
    }
    if let Some(text) = input.text {
        return Ok(Document::pasted(text));
    }

    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read text from stdin")?;
    Ok(Document::pasted(buf))
}

async fn handle_summarize(
    input: InputArgs,
    length: LengthTier,
    workspace: &Path,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let config = load(workspace)?;
    let pipeline = build_pipeline(&config, true)?;
    let document = read_input(input).await?;
    tracing::info!(source = ?document.source(), %length, "Summarizing");

    let report = pipeline
        .summarize(document.raw_text(), length)
        .await
        .map_err(PaperScoutError::from)?;
    println!("{}", render::summary_report(&report, options.json)?);
    Ok(())
}

async fn handle_related(
    input: InputArgs,
    max_results: Option<usize>,
    workspace: &Path,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let config = load(workspace)?;
    let pipeline = build_pipeline(&config, false)?;
    let document = read_input(input).await?;
    let n = max_results.unwrap_or(config.search.default_max_results);

    let discovery = pipeline
        .related_papers(document.raw_text(), n)
        .await
        .map_err(PaperScoutError::from)?;
    println!("{}", render::discovery(&discovery, options.json)?);
    if let Some(warning) = &discovery.warning {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

async fn handle_search(
    query: &str,
    max_results: Option<usize>,
    workspace: &Path,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let config = load(workspace)?;
    let pipeline = build_pipeline(&config, false)?;
    let n = max_results.unwrap_or(config.search.default_max_results);

    let discovery = pipeline
        .search_papers(query, n)
        .await
        .map_err(PaperScoutError::from)?;
    println!("{}", render::discovery(&discovery, options.json)?);
    if let Some(warning) = &discovery.warning {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".paperscout");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&PaperScoutConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let mut config = load(workspace)?;
            if config.summarizer.api_key.is_some() {
                config.summarizer.api_key = Some("********".to_string());
            }
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Map a failed command to a process exit code.
///
/// Input and configuration problems exit with 2; unreachable services and
/// everything else with 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PaperScoutError>() {
        Some(PaperScoutError::Pipeline(
            PipelineError::Readiness(_) | PipelineError::InvalidQuery { .. },
        )) => 2,
        Some(PaperScoutError::Config(_)) => 2,
        Some(PaperScoutError::Summarize(
            SummarizeError::MissingApiKey { .. } | SummarizeError::UnknownBackend { .. },
        )) => 2,
        Some(PaperScoutError::Extract(_)) => 2,
        _ => 1,
    }
}
