//! Interactive chat over a runner session

use crate::app::{build_app, load_config};
use anyhow::Result;
use mababa_core::format_error_for_chat;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Run the REPL until `exit`, `quit`, end of input or Ctrl-C
pub async fn run() -> Result<()> {
    let app = build_app(load_config()?)?;
    let runner = app.runner();
    let mut session = runner.new_session();
    let shutdown = app.orchestrator.shutdown_token();

    println!("MaBaba here. Ask me about baby gear, things for mom, classes, or coping.");
    println!("Type `exit` to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&request.to_lowercase().as_str()) {
            break;
        }

        let result = tokio::select! {
            r = runner.run(&mut session, request) => r,
            _ = tokio::signal::ctrl_c() => {
                shutdown.cancel();
                Err(mababa_core::Error::Cancelled)
            }
        };
        match result {
            Ok(response) => println!("\n{}\n", response.text),
            Err(mababa_core::Error::Cancelled) => {
                println!("\nCancelled.");
                break;
            }
            Err(e) => println!("\n{}\n", format_error_for_chat(&e)),
        }
    }

    println!("Goodbye!");
    Ok(())
}
