//! CLI module for MaBaba
//!
//! Provides commands:
//! - `ask`: answer one request and print the report
//! - `chat`: interactive session that keeps conversation history
//! - `route`: show which specialists a request would reach
//! - `agents`: list the specialist catalog

use crate::app::{build_app, build_catalog, load_config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use mababa_core::{format_error_for_cli, RuleClassifier};

mod chat;

/// MaBaba parental consultant CLI
#[derive(Parser, Debug)]
#[command(name = "mababa")]
#[command(about = "Your Friendly Parental Consultant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one request
    Ask {
        /// The request, e.g. "Find me a stroller"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat (type `exit` or `quit` to leave)
    Chat,
    /// Show the routing decision for a request without calling the model
    Route {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List the specialist agents
    Agents,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Ask { text, json }) => ask(&text.join(" "), json).await,
        Some(Commands::Chat) => chat::run().await,
        Some(Commands::Route { text }) => route(&text.join(" ")),
        Some(Commands::Agents) => agents(),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn ask(request: &str, json: bool) -> Result<()> {
    let app = build_app(load_config()?)?;
    let shutdown = app.orchestrator.shutdown_token();

    let result = tokio::select! {
        r = app.orchestrator.respond(request, &[]) => r,
        _ = tokio::signal::ctrl_c() => {
            shutdown.cancel();
            Err(mababa_core::Error::Cancelled)
        }
    };

    match result {
        Ok(response) if json => println!("{}", serde_json::to_string_pretty(&response)?),
        Ok(response) => println!("{}", response.text),
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            return Err(e.into());
        }
    }
    Ok(())
}

fn route(request: &str) -> Result<()> {
    let config = load_config()?;
    let catalog = build_catalog(&config)?;
    let decision = RuleClassifier.classify_sync(request);

    if decision.is_empty() {
        println!("No match: MaBaba would ask for clarification.");
        return Ok(());
    }
    for intent in &decision.intents {
        let agents: Vec<&str> = catalog.for_intent(*intent).map(|a| a.name.as_str()).collect();
        if agents.is_empty() {
            println!("{intent}: answered directly");
        } else {
            println!("{intent}: {}", agents.join(", "));
        }
    }
    Ok(())
}

fn agents() -> Result<()> {
    let config = load_config()?;
    let catalog = build_catalog(&config)?;

    println!("{} specialists (model: {})\n", catalog.len(), config.llm.model);
    for agent in catalog.iter() {
        let tools: Vec<&str> = agent.tools.iter().map(String::as_str).collect();
        println!("{}  [{}]", agent.title, agent.intent);
        println!("  name:       {}", agent.name);
        println!("  output key: {}", agent.output_key);
        println!("  tools:      {}", tools.join(", "));
        println!("  covers:     {}\n", agent.shape.labels().join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_json() {
        let cli = Cli::try_parse_from(["mababa", "ask", "--json", "Find", "me", "a", "stroller"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask { text, json }) => {
                assert!(json);
                assert_eq!(text.join(" "), "Find me a stroller");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_route_requires_text() {
        assert!(Cli::try_parse_from(["mababa", "route"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["mababa"]).unwrap();
        assert!(cli.command.is_none());
    }
}
