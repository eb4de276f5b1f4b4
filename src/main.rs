use anyhow::Result;
use clap::Parser;
use plansolve::llm::{GeminiProvider, ModelCaller, OpenAiCompatibleProvider};
use plansolve::prompt::PromptStore;
use plansolve::{Agent, Executor, ModelConfig, Planner};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Plan-then-execute agent: decompose a question into steps, then solve
/// them in order.
#[derive(Debug, Parser)]
#[command(name = "plansolve", version, about)]
struct Cli {
    /// The question to plan for and answer.
    question: String,

    /// Directory containing the planner.md and executor.md templates.
    #[arg(long, default_value = "prompts")]
    prompts_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let planner_config = ModelConfig::planner_from_env()?;
    let executor_config = ModelConfig::executor_from_env()?;

    let planner_caller = ModelCaller::new(
        Box::new(OpenAiCompatibleProvider::new(
            "openai",
            &planner_config.base_url,
            &planner_config.api_key,
            planner_config.timeout_secs,
        )),
        planner_config,
    );
    let executor_caller = ModelCaller::new(
        Box::new(GeminiProvider::new(
            &executor_config.base_url,
            &executor_config.api_key,
            executor_config.timeout_secs,
        )),
        executor_config,
    );

    let agent = Agent::new(
        Planner::new(planner_caller, PromptStore::open(&cli.prompts_dir)),
        Executor::new(executor_caller, PromptStore::open(&cli.prompts_dir)),
    );
    agent.run(&cli.question).await;

    Ok(())
}
