//! CLI command implementations.

mod config;
mod doctor;
mod notes;
mod transcript;

pub use config::run_config;
pub use doctor::run_doctor;
pub use notes::run_notes;
pub use transcript::run_transcript;
