//! The error kinds shared by every handler, matching spec §7.
//!
//! Handlers never invent new failure shapes: validation and lookup errors
//! map onto one of these variants and are surfaced to the caller as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kind enumerated in spec §7, carried over the wire as `{error: {code, message}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Conflict,
    Protected,
    Auth,
    Io,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Protected => "protected",
            ErrorKind::Auth => "auth",
            ErrorKind::Io => "io",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }
}

/// The error type every handler returns.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct ThrumError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ThrumError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn protected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protected, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<std::io::Error> for ThrumError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for ThrumError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_request(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThrumError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
