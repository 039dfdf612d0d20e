//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{NotatError, Result};
use crate::openai::api_key_from_env;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Notes generation always needs the API key.
    Notes,
    /// Transcript acquisition has no hard requirements: captions need
    /// nothing, and the audio fallback reports its own missing pieces.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Notes => check_api_key()?,
        Operation::Transcript => {}
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match api_key_from_env() {
        Some(_) => Ok(()),
        None => Err(NotatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transcript_no_requirements() {
        // Transcript acquisition should always pass pre-flight
        assert!(check(Operation::Transcript).is_ok());
    }
}
