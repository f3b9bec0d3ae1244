//! Registers the tax auditor agent and runs a few turns against it.

#[macro_use]
extern crate tracing;

use std::io::{self, IsTerminal as _};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use taxagent::Error;
use taxagent::core::AgentBuilder;
use taxagent::driver::{self, DEFAULT_INPUTS, DEMO_CONTEXT, RunOptions};
use taxagent::presets::{
    self, InstructionPreset, PresetOptions, RagInstructionPreset,
};
use taxagent::settings::{DEFAULT_ENV_FILE, Settings};
use taxagent::tools::AccountToolkit;
use taxagent_oci::{OciAgentService, OciConfigBuilder};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

#[derive(Parser, Debug)]
#[command(name = "taxagent", version, about = "Tax auditor assistant")]
struct Cli {
    /// Dotenv file with the agent settings.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
    /// Routing instructions of the agent.
    #[arg(long, value_enum, default_value_t = InstructionPreset::default())]
    instructions: InstructionPreset,
    /// Description of the RAG tool.
    #[arg(long, value_enum, default_value_t = RagInstructionPreset::default())]
    rag_instructions: RagInstructionPreset,
    /// Also register the account lookup tools.
    #[arg(long)]
    account_toolkit: bool,
    /// Continue one session across all inputs.
    #[arg(long)]
    chain_session: bool,
    /// Text prepended to every input. Defaults to the demo user context
    /// when the account tools are registered.
    #[arg(long)]
    context: Option<String>,
    /// Don't print the execution traces.
    #[arg(long)]
    no_traces: bool,
    /// Maximum exchanges per turn.
    #[arg(
        long,
        default_value_t = taxagent::core::DEFAULT_MAX_STEPS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
    )]
    max_steps: usize,
    /// Inputs to run, one turn each.
    #[arg()]
    inputs: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let settings = Settings::load(&cli.env_file)?;
    let options = PresetOptions {
        instructions: cli.instructions,
        rag_instructions: cli.rag_instructions,
    };
    let config = presets::build_agent_config(&settings, &options)?;

    let mut oci_config = OciConfigBuilder::with_config_file(
        settings.oci_config_file.as_str(),
    )
    .with_profile(settings.oci_profile.as_str())
    .with_region(settings.agent_region.as_str());
    if let Some(endpoint) = &settings.service_endpoint {
        oci_config = oci_config.with_service_endpoint(endpoint.as_str());
    }
    let service = OciAgentService::new(oci_config.build()?);

    let mut builder = AgentBuilder::with_service(service, config)
        .with_max_steps(cli.max_steps);
    if cli.account_toolkit {
        builder = builder.with_toolkit(AccountToolkit::new());
    }
    let mut agent = builder.build();

    let progress_bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        progress_bar.set_style(style.tick_chars(TICK_CHARS));
    }
    progress_bar.set_message("Setting up the agent...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    let setup = agent.setup().await;
    progress_bar.finish_and_clear();
    setup?;

    let inputs = if cli.inputs.is_empty() {
        DEFAULT_INPUTS.iter().map(|input| input.to_string()).collect()
    } else {
        cli.inputs
    };
    let context = match cli.context {
        Some(context) => Some(context),
        None if cli.account_toolkit => Some(DEMO_CONTEXT.to_owned()),
        None => None,
    };
    let run_options = RunOptions {
        chain_session: cli.chain_session,
        context,
        show_traces: !cli.no_traces,
        color: io::stdout().is_terminal(),
    };

    let mut stdout = io::stdout().lock();
    driver::run_turns(&agent, &inputs, &run_options, &mut stdout).await?;
    Ok(())
}
