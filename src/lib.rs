//! Notat - YouTube Notes
//!
//! A CLI tool that turns YouTube videos into structured notes.
//!
//! The name "Notat" comes from the Norwegian word for "note."
//!
//! # Overview
//!
//! Notat allows you to:
//! - Resolve a video ID from any common YouTube URL shape
//! - Acquire a transcript through a fallback chain (manual captions,
//!   auto-generated captions, translated captions, audio transcription)
//! - Generate structured notes (summary, bullet notes, key takeaways)
//!   from the transcript with an LLM
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `video` - Video ID resolution and title lookup
//! - `transcript` - Transcript sources and the fallback chain
//! - `notes` - Notes generation and reply parsing
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use notat::config::Settings;
//! use notat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.notes("https://youtu.be/dQw4w9WgXcQ").await?;
//!     println!("{}", result.title);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod notes;
pub mod openai;
pub mod orchestrator;
pub mod transcript;
pub mod video;

pub use error::{NotatError, Result};
