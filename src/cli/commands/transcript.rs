//! Transcript command - fetch a transcript without generating notes.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

/// Run the transcript command.
pub async fn run_transcript(url: &str, output: Option<String>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Transcript)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript...");
    let result = orchestrator.transcript(url).await;
    spinner.finish_and_clear();

    let transcript = result?;

    match output {
        Some(path) => {
            std::fs::write(&path, &transcript)?;
            Output::success(&format!("Wrote transcript to {path}"));
        }
        None => println!("{transcript}"),
    }

    Ok(())
}
