use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use suite::chain::FallbackChain;
use suite::clerk::{intents, Clerk};
use suite::logging::{ExecutionLogger, TracingLogger};
use suite::orchestrator::{Orchestrator, DEFAULT_MAX_ITERATIONS};
use suite::providers::configs::OllamaProviderConfig;
use suite::providers::factory::{chain_for_executive, get_provider};
use suite::providers::ollama::OllamaProvider;
use suite::registry::demo::DemoRegistry;
use suite::registry::ToolRegistry;

#[derive(Parser)]
#[command(name = "suite", about = "Ask the orchestrator a question")]
struct Cli {
    /// The question to answer
    question: String,

    /// Executive persona selecting the provider chain order
    #[arg(long, default_value = "eliza")]
    executive: String,

    /// Maximum tool-loop resubmissions
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Skip the final natural-language synthesis pass
    #[arg(long)]
    no_synthesis: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "suite=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut providers = Vec::new();
    for config in chain_for_executive(&cli.executive) {
        providers.push(get_provider(config)?);
    }

    let registry: Arc<dyn ToolRegistry> = Arc::new(DemoRegistry);
    let logger: Arc<dyn ExecutionLogger> = Arc::new(TracingLogger);

    let offline = OllamaProvider::new(OllamaProviderConfig::from_env().offline())?;
    let clerk = Clerk::new(intents::default_intents(), registry.clone(), logger.clone())
        .with_offline(offline);

    let orchestrator = Orchestrator::new(FallbackChain::new(providers), registry, logger, clerk)
        .with_max_iterations(cli.max_iterations)
        .with_synthesis(!cli.no_synthesis);

    let reply = orchestrator.reply(&cli.question).await;

    println!("{}", reply.content);
    if let Some(provider) = reply.provider {
        eprintln!("[{} | {} tool(s) executed]", provider, reply.tools_executed);
    } else {
        eprintln!("[clerk | {} tool(s) executed]", reply.tools_executed);
    }

    Ok(())
}
