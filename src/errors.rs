/*!
 * Error types for the glossgen application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Failures fall in two classes: per-term task failures (`TaskError`), which are
 * always retryable and never leave the batch engine, and run-level failures
 * (`GlossaryError`), which abort a run and are returned to the caller.
 */

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a chat-completion backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Failure of a single enrichment task for a single term.
///
/// Every variant is retryable; the batch engine records the term as failed for
/// the current round and moves on.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Transport or HTTP level failure
    #[error("Transport failure: {0}")]
    Transport(#[from] ProviderError),

    /// The request did not settle before its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend used up the whole output budget
    #[error("Output truncated: {used} completion tokens for a limit of {limit}")]
    Truncated {
        /// Completion tokens reported by the backend
        used: u32,
        /// Max output tokens requested for the task
        limit: u32,
    },

    /// The reply could not be repaired into the expected JSON shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors that abort a glossary run
#[derive(Error, Debug)]
pub enum GlossaryError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend could not be reached before enrichment started
    #[error("Backend connection test failed: {0}")]
    ConnectionTest(String),

    /// The tokenizer could not be initialized
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}
