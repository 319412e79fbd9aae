//! turnkit CLI binary entry point.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use turnkit::agent::Agent;
use turnkit::cli::{render_message, ChatArgs, Cli, Commands};
use turnkit::config::AgentConfig;
use turnkit::tools::builtin::default_registry;
use turnkit::util::timeout::with_timeout;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("turnkit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match AgentConfig::resolve(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Chat(args) => handle_chat(config, args).await,
            Commands::Tools => handle_tools(&config),
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn handle_tools(config: &AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    for definition in default_registry(config)?.definitions() {
        println!("{:<16} {}", definition.name, definition.description);
    }
    Ok(())
}

async fn handle_chat(
    mut config: AgentConfig,
    args: ChatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(model) = args.model {
        config.model = model;
    }

    let mut agent = Agent::from_config(&config)?;
    let tools = if args.tools.is_empty() {
        agent.registry().definitions()
    } else {
        agent.registry().definitions_for(&args.tools)?
    };

    let turn = agent.run_turn(&args.message, &tools);
    let result = match args.timeout_secs {
        Some(secs) => with_timeout(Duration::from_secs(secs), turn).await,
        None => turn.await,
    };

    let history = match result {
        Ok(history) => history,
        Err(e) => {
            if let Some(call) = agent.conversation().pending_tool_call() {
                tracing::warn!(tool = call.name(), tool_call_id = %call.id, "tool request left without a result");
            }
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        for message in &history {
            println!("{}", render_message(message));
        }
    }

    Ok(())
}
