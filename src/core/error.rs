//! Error types for the simulation core and its data files.
//!
//! None of these escape a tick: systems log them and fall back to a safe
//! behavior (retreat, skip, best-effort placement, disabled subsystem).

use thiserror::Error;

/// Errors that can occur inside the simulation or while loading its data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A target, obstacle or path point the logic relied on is gone.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// A direction vector had zero length.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A bounded search ran out of attempts.
    #[error("Exhausted {attempts} attempts while {context}")]
    ExhaustedRetry { context: String, attempts: u32 },

    /// Scene or data setup that disables a subsystem.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// File could not be written.
    #[error("Failed to write file '{path}': {details}")]
    WriteError { path: String, details: String },

    /// RON parsing or serialization failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },
}
