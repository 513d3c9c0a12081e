use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use memo_agents::{route, PlanningAgent};
use memo_core::{Intent, KeywordPolicy, RawRequest};
use memo_ml::{ClassifierConfig, TieredClassifier};
use memo_observability::{init_tracing, AppMetrics, DiagnosticSink, FanoutSink, MemorySink, TracingSink};

#[derive(Debug, Parser)]
#[command(name = "memo-planner")]
#[command(about = "Classify market-entry requests and build memo task plans")]
struct Cli {
    /// Keyword policy JSON replacing the built-in table.
    #[arg(long, env = "MEMO_POLICY_FILE", global = true)]
    policy: Option<PathBuf>,

    /// Skip the model call and classify with keywords only.
    #[arg(long, global = true)]
    offline: bool,

    #[arg(long, env = "MEMO_CLASSIFIER_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    #[arg(long, env = "MEMO_OPENAI_MODEL", global = true)]
    model: Option<String>,

    /// Print classification records and a metrics snapshot to stderr on exit.
    #[arg(long, global = true)]
    audit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify one request (file path or `-` for stdin).
    Classify {
        #[arg(long, default_value = "-")]
        request: String,
    },
    /// Classify one request and build its task plan.
    Plan {
        #[arg(long, default_value = "-")]
        request: String,
    },
    /// Build a task plan from an already classified intent.
    Route {
        #[arg(long)]
        intent: PathBuf,
    },
    /// Plan every request in a JSON-lines file concurrently.
    Batch {
        #[arg(long)]
        requests: PathBuf,
    },
    /// Print the effective keyword policy table.
    Policy,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("memo_planner");
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let audit_sink = MemorySink::shared();
    let agent = build_agent(&config, cli.audit.then(|| audit_sink.clone()))?;

    match &cli.command {
        Command::Classify { request } => {
            let request = read_request(request)?;
            let (intent, record) = agent.classify(&request).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "intent": intent,
                    "record": record,
                }))?
            );
        }
        Command::Plan { request } => {
            let request = read_request(request)?;
            let outcome = agent.plan(request).await.context("failed to build task plan")?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Route { intent } => {
            let raw = fs::read_to_string(intent)
                .with_context(|| format!("failed reading intent from {}", intent.display()))?;
            let intent: Intent = serde_json::from_str(&raw).context("intent json is incomplete or invalid")?;
            let plan = route(&intent).context("intent violates routing preconditions")?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Batch { requests } => run_batch(&agent, requests).await?,
        Command::Policy => {
            println!("{}", serde_json::to_string_pretty(agent.classifier().fallback().policy())?);
        }
    }

    if cli.audit {
        for record in audit_sink.records() {
            eprintln!("{}", serde_json::to_string(&record)?);
        }
        eprintln!("{}", serde_json::to_string_pretty(&agent.metrics().snapshot())?);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClassifierConfig> {
    let mut config = ClassifierConfig::from_env()?;

    if let Some(path) = &cli.policy {
        config.policy = KeywordPolicy::from_json_file(path)
            .with_context(|| format!("failed loading keyword policy from {}", path.display()))?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if cli.offline {
        config = config.offline();
    }
    Ok(config)
}

fn build_agent(config: &ClassifierConfig, audit: Option<Arc<MemorySink>>) -> Result<PlanningAgent> {
    let sink: Arc<dyn DiagnosticSink> = match audit {
        Some(memory) => {
            let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![Arc::new(TracingSink), memory];
            Arc::new(FanoutSink::new(sinks))
        }
        None => Arc::new(TracingSink),
    };
    let classifier = TieredClassifier::from_config(config)
        .context("failed building intent classifier")?
        .with_sink(sink);

    Ok(PlanningAgent::new(classifier, AppMetrics::shared()))
}

fn read_request(source: &str) -> Result<RawRequest> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed reading request from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("failed reading request from {source}"))?
    };
    serde_json::from_str(&raw).context("request is not a JSON object")
}

async fn run_batch(agent: &PlanningAgent, path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading requests from {}", path.display()))?;

    let requests = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str::<RawRequest>(line)
                .with_context(|| format!("invalid request on line {}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcomes = join_all(requests.into_iter().map(|request| agent.plan(request))).await;
    for outcome in outcomes {
        let outcome = outcome.context("failed to build task plan")?;
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
