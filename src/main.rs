//! litgraph CLI: run the research pipeline or the orchestrator on one query.

use clap::{Parser, Subcommand};
use litgraph_agents::Orchestrator;
use litgraph_core::Settings;
use litgraph_research::{ResearchAssistant, RunSettings};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "litgraph",
    version = env!("CARGO_PKG_VERSION"),
    about = "Literature review pipeline and query orchestrator"
)]
struct Cli {
    /// Settings file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "litgraph.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan, retrieve, synthesize and report on a research question
    Research {
        query: String,

        /// Model name sent to the generation service
        #[arg(long)]
        model: Option<String>,

        /// Records to request (never more than 5 are returned)
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Classify a query and answer it through the matching handler
    Ask { query: String },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "litgraph=info,litgraph_graph=info,litgraph_research=info,litgraph_agents=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;

    match cli.command {
        Commands::Research {
            query,
            model,
            max_results,
        } => {
            if let Some(model) = model {
                settings.llm.model = model;
            }
            if let Some(n) = max_results {
                settings.search.max_results = n;
            }
            let assistant = ResearchAssistant::from_settings(&settings)?;
            let run = RunSettings::from(&settings);
            info!(model = %run.model, "running research pipeline");

            let report = assistant.invoke(&query, run).await?;
            println!("=== PLAN ===");
            println!("{}", serde_json::to_string_pretty(&report.plan)?);
            println!("\n=== SUMMARY ===");
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
            println!("\n=== REPORT ===");
            println!("{}", report.formatted_report.unwrap_or_default());
        }

        Commands::Ask { query } => {
            let orchestrator = Orchestrator::from_settings(&settings)?;
            let reply = orchestrator.invoke(&query).await?;
            println!("=== FINAL ANSWER ===");
            println!("{}", reply.final_answer);
            println!("\nAgents visited: {}", reply.agents_visited.join(" -> "));
            println!("Tools used: {}", reply.tools_used.join(", "));
        }

        Commands::Config => {
            print!("{}", settings.to_toml()?);
        }
    }

    Ok(())
}
