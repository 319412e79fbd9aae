//! Command-line front end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::Message;

/// turnkit CLI
#[derive(Parser, Debug)]
#[command(name = "turnkit", version, about = "Run one tool-calling agent turn")]
pub struct Cli {
    /// Config file (defaults to ./turnkit.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message and print the resulting history
    Chat(ChatArgs),
    /// List the built-in tools and their descriptions
    Tools,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Tools to offer the model, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,

    /// Override the configured model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Abort the turn after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the history as JSON
    #[arg(long)]
    pub json: bool,

    /// The user message
    pub message: String,
}

/// One line per message, e.g. `assistant -> dad_joke({})`.
pub fn render_message(message: &Message) -> String {
    let role = message.role();
    match message.tool_calls() {
        [] => format!("{role}: {}", message.content().unwrap_or_default()),
        calls => {
            let requested: Vec<String> = calls
                .iter()
                .map(|call| format!("{}({})", call.name(), call.arguments()))
                .collect();
            format!("{role} -> {}", requested.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssistantMessage, ToolInvocation};

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["turnkit", "chat", "hello"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.message, "hello");
                assert!(args.tools.is_empty());
                assert!(args.model.is_none());
                assert!(args.timeout_secs.is_none());
                assert!(!args.json);
            }
            other => panic!("expected Chat, got {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_chat_with_all_options() {
        let cli = Cli::try_parse_from([
            "turnkit",
            "--config",
            "custom.toml",
            "chat",
            "--tools",
            "dad_joke,reddit",
            "-m",
            "gpt-4o",
            "--timeout-secs",
            "30",
            "--json",
            "tell me a dad joke",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.tools, ["dad_joke", "reddit"]);
                assert_eq!(args.model.as_deref(), Some("gpt-4o"));
                assert_eq!(args.timeout_secs, Some(30));
                assert!(args.json);
                assert_eq!(args.message, "tell me a dad joke");
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_tools_subcommand() {
        let cli = Cli::try_parse_from(["turnkit", "tools"]).unwrap();
        assert!(matches!(cli.command, Commands::Tools));
    }

    #[test]
    fn chat_requires_a_message() {
        assert!(Cli::try_parse_from(["turnkit", "chat"]).is_err());
    }

    #[test]
    fn render_plain_and_tool_messages() {
        assert_eq!(render_message(&Message::user("hi")), "user: hi");
        let request: Message =
            AssistantMessage::requesting_tools(vec![ToolInvocation::new("c1", "dad_joke", "{}")])
                .into();
        assert_eq!(render_message(&request), "assistant -> dad_joke({})");
        assert_eq!(
            render_message(&Message::tool_result("c1", "a joke")),
            "tool: a joke"
        );
    }
}
