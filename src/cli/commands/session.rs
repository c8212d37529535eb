//! Console session: pick a source, build its tool, answer prompts.

use crate::agent::Agent;
use crate::cli::repl::{prompt_line, run_repl};
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::session::{Orchestrator, SessionConfig};
use crate::source::SourceKind;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::info;

const KIND_PROMPT: &str = "What type of file would you like to query (CSV, Excel, PDF, or YouTube)? ";

/// Ask for the source kind and location, then run the session.
pub async fn run_interactive(settings: Settings) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();

    let Some(config) = ask_session_config(&mut input, &mut stdout)? else {
        return Ok(());
    };

    run_session(config, settings, input).await
}

/// Run a session on a source given on the command line.
pub async fn run_query(
    kind: &str,
    location: &str,
    index_name: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let kind = match kind.parse::<SourceKind>() {
        Ok(kind) => kind,
        Err(e) => {
            Output::error(&e.to_string());
            return Ok(());
        }
    };

    let mut config = SessionConfig::new(kind, location);
    if let Some(name) = index_name {
        config = config.with_index_name(name);
    }

    let stdin = std::io::stdin();
    run_session(config, settings, stdin.lock()).await
}

/// Read the source kind and location. `None` means there is nothing to run.
fn ask_session_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<SessionConfig>> {
    let Some(kind) = prompt_line(input, output, KIND_PROMPT)? else {
        return Ok(None);
    };

    let kind = match kind.parse::<SourceKind>() {
        Ok(kind) => kind,
        Err(e) => {
            Output::error(&e.to_string());
            return Ok(None);
        }
    };

    let Some(location) = prompt_line(input, output, &kind.input_prompt())? else {
        return Ok(None);
    };

    Ok(Some(SessionConfig::new(kind, &location)))
}

async fn run_session<R: BufRead>(config: SessionConfig, settings: Settings, input: R) -> Result<()> {
    preflight::check(config.kind, &settings)?;

    let max_iterations = settings.llm.max_iterations;
    let mut orchestrator = Orchestrator::new(settings);

    let tools = orchestrator.build_tools(&config).await?;
    if tools.is_empty() {
        Output::warning("No data source loaded");
        return Ok(());
    }

    let agent = Agent::new(orchestrator.model()?, tools).with_max_iterations(max_iterations);

    let answered = run_repl(input, std::io::stdout(), &agent).await?;
    info!("Session ended after {} prompts", answered);

    Ok(())
}
