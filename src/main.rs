//! Cogniweave CLI entry point.
//!
//! Wires the Model Provider Layer, Token Optimizer, Ephemeral Cache, and
//! Thinking Engine together behind the eight-operation tool surface, and
//! exposes that surface as a set of subcommands.

use clap::{Parser, Subcommand};
use cogniweave_core::config::EnvConfig;
use cogniweave_core::error::CognitionError;
use cogniweave_core::providers::{CancellationSource, ModelProvider, Provider};
use cogniweave_core::thinking::{ThinkingEngine, ThinkingEngineOptions, ThinkingModel};
use cogniweave_core::tool_surface::{GenerateRequest, MaintenanceSystem, ToolSurface};
use cogniweave_core::{EphemeralCache, TokenOptimizer};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "cogniweave")]
#[command(about = "Cognitive orchestration engine for LLM-backed tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single completion, optionally compressing the prompt to fit a budget.
    Generate {
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        model: Option<String>,

        #[arg(long, default_value = "1024")]
        max_tokens: usize,

        #[arg(long)]
        optimize_tokens: bool,
    },

    /// Run the iterative Thinking Engine against a problem statement.
    Think {
        #[arg(short, long)]
        problem: String,

        #[arg(short, long)]
        model: Option<String>,

        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Estimate the token count of a block of text for a given model.
    EstimateTokens {
        #[arg(short, long)]
        text: String,

        #[arg(short, long)]
        model: Option<String>,
    },

    /// Run maintenance passes (cache eviction, etc.) across one or more systems.
    Maintain {
        /// One or more of: cache, memory, thinking, optimization, all
        #[arg(short, long, default_value = "all")]
        systems: Vec<String>,
    },
}

fn build_surface(default_model: &str) -> Result<ToolSurface, CognitionError> {
    let api_key = EnvConfig::api_key()?;
    let provider: Arc<dyn Provider> = Arc::new(ModelProvider::new(
        "primary".to_string(),
        DEFAULT_ENDPOINT.to_string(),
        api_key,
    )?);
    let optimizer = Arc::new(TokenOptimizer::new());
    let cache = Arc::new(EphemeralCache::new(DEFAULT_CACHE_CAPACITY));
    let thinking = Arc::new(ThinkingEngine::new(provider.clone(), optimizer.clone()));
    let _ = default_model;
    Ok(ToolSurface::new(provider, optimizer, cache, thinking))
}

fn parse_systems(raw: &[String]) -> Vec<MaintenanceSystem> {
    raw.iter()
        .filter_map(|s| match s.to_lowercase().as_str() {
            "cache" => Some(MaintenanceSystem::Cache),
            "memory" => Some(MaintenanceSystem::Memory),
            "thinking" => Some(MaintenanceSystem::Thinking),
            "optimization" => Some(MaintenanceSystem::Optimization),
            "all" => Some(MaintenanceSystem::All),
            _ => None,
        })
        .collect()
}

async fn run(cli: Cli) -> Result<(), CognitionError> {
    match cli.command {
        Commands::Generate {
            prompt,
            model,
            max_tokens,
            optimize_tokens,
        } => {
            let model_id = model.unwrap_or_else(|| "gpt-4o-mini".to_string());
            let surface = build_surface(&model_id)?;
            let cancel = CancellationSource::new().token();
            let result = surface
                .generate(
                    GenerateRequest {
                        prompt,
                        model_id,
                        max_tokens,
                        optimize_tokens,
                    },
                    &cancel,
                )
                .await?;
            println!("{}", result.response);
            debug!(
                cached = result.cached,
                total_tokens = result.token_usage.total,
                "generate complete"
            );
            Ok(())
        }
        Commands::Think {
            problem,
            model,
            max_steps,
        } => {
            let model_id = model.unwrap_or_else(|| "gpt-4o-mini".to_string());
            let surface = build_surface(&model_id)?;
            let thinking_model = ThinkingModel {
                name: model_id,
                ..ThinkingModel::default()
            };
            let options = ThinkingEngineOptions {
                max_steps,
                ..ThinkingEngineOptions::default()
            };
            let cancel = CancellationSource::new().token();
            let result = surface
                .thinking_process(&problem, &thinking_model, &options, &cancel)
                .await;
            for line in &result.reasoning {
                println!("{}", line);
            }
            debug!(steps = result.steps.len(), "thinking process complete");
            Ok(())
        }
        Commands::EstimateTokens { text, model } => {
            let model_id = model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
            let surface = build_surface(&model_id)?;
            let count = surface.estimate_tokens(&text, model.as_deref());
            println!("{{\"count\": {}}}", count);
            Ok(())
        }
        Commands::Maintain { systems } => {
            let surface = build_surface("gpt-4o-mini")?;
            let report = surface.perform_maintenance(&parse_systems(&systems)).await;
            for (system, removed) in &report.removed_by_system {
                println!("{}: {}", system, removed);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let filter = EnvFilter::new(format!("cogniweave={}", level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = EnvConfig::api_key() {
        error!("{}", err);
        return ExitCode::from(3);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start async runtime: {}", err);
            return ExitCode::from(4);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::from(0),
        Err(CognitionError::Config(msg)) => {
            error!("configuration error: {}", msg);
            ExitCode::from(2)
        }
        Err(err) => {
            error!("unhandled error: {}", err);
            ExitCode::from(4)
        }
    }
}
