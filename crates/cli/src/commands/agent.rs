//! `ferrule agent`: interactive or single-message chat mode.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ferrule_agent::Agent;
use ferrule_config::AppConfig;
use ferrule_core::error::Error;
use ferrule_providers::AnthropicGateway;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

const WELCOME: &str = "Welcome to the AI Agent (powered by Claude)! Type 'exit' to quit.";
const PROMPT: &str = "> ";

pub async fn run(
    message: Option<String>,
    conversation: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;
    if let Some(path) = conversation {
        config.conversation_file = path;
    }

    let gateway = AnthropicGateway::from_config(&config)?;
    if gateway.is_placeholder() {
        warn!("No API key configured, replies are placeholders");
    }

    let mut agent = Agent::from_config(&config, Arc::new(gateway))
        .map_err(|e| format!("Failed to initialize agent: {e}"))?;

    let outcome = match message {
        Some(msg) => agent.process(&msg).await.map(|reply| println!("{reply}")),
        None => {
            println!("{WELCOME}");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            let mut stderr = std::io::stderr();
            let read = repl(&mut agent, stdin, &mut stdout, &mut stderr).await;
            agent.save()?;
            return Ok(read?);
        }
    };

    // Save even when the single message failed, so the user turn is kept.
    agent.save()?;
    Ok(outcome?)
}

/// Read lines until EOF or `exit`, answering each non-blank one.
/// A failed turn is reported on `err` and the loop carries on. A failed read
/// (e.g. input that is not UTF-8) is reported on `err` and ends the loop.
pub async fn repl<R, O, E>(
    agent: &mut Agent,
    input: R,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    O: Write,
    E: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                writeln!(err, "Error reading input: {e}")?;
                break;
            }
        };
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match agent.process(line).await {
            Ok(reply) => writeln!(out, "{reply}")?,
            Err(e) => writeln!(err, "Error: {e}")?,
        }
    }
    Ok(())
}
