//! Notes command - generate structured notes for a video.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::notes::Notes;
use crate::orchestrator::Orchestrator;

/// Run the notes command.
pub async fn run_notes(url: &str, json: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Notes)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript and generating notes...");
    let result = orchestrator.notes(url).await;
    spinner.finish_and_clear();

    let video_notes = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&video_notes)?);
        return Ok(());
    }

    Output::header(&video_notes.title);
    Output::kv("Video", &video_notes.url);

    match &video_notes.notes {
        Notes::Structured {
            summary,
            notes,
            takeaways,
        } => {
            Output::header("Summary");
            println!("{summary}");

            Output::header("Notes");
            for item in notes {
                Output::list_item(item);
            }

            Output::header("Key Takeaways");
            for item in takeaways {
                Output::list_item(item);
            }
        }
        Notes::Unparsed(raw) => {
            // The model skipped the requested sections; show its reply as-is
            Output::header("Notes");
            println!("{raw}");
        }
    }

    println!();
    Ok(())
}
