// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the WARDEN binary.

use thiserror::Error;

/// Result type alias for warden-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the WARDEN binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initialization error.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] warden_api::ApiError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] warden_core::WardenError),
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }
}
