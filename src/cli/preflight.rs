//! Pre-flight checks before starting long-running operations.
//!
//! Validates that required configuration is available before the server
//! binds, so a missing key fails at startup rather than on the first request.

use crate::config::Settings;
use crate::error::{Result, TubeQaError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving requires the LLM API key.
    Serve,
    /// Inspecting configuration has no requirements.
    Config,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve => {
            check_api_key(&settings.llm.api_key_env)?;
        }
        Operation::Config => {}
    }
    Ok(())
}

/// Check that the named API key variable is set and non-empty.
fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(TubeQaError::Config(format!(
            "{} is empty. Set it in the environment or a .env file.",
            var
        ))),
        Err(_) => Err(TubeQaError::Config(format!(
            "{} not set. Set it in the environment or a .env file.",
            var
        ))),
    }
}
