// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for FaultPage
//!
//! This module defines the error type shared by every component of the
//! FaultPage code generator. The `thiserror` crate is used to keep error
//! creation concise and the messages consistent across the library.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the FaultPage library.
pub type Result<T> = std::result::Result<T, FaultPageError>;

/// The main error type for FaultPage, encompassing all failure cases.
///
/// Generation is a pure in-memory transform, so most variants describe
/// problems in the surroundings: configuration files, templates, and the
/// filesystem used when exports are written out.
#[derive(Error, Debug)]
pub enum FaultPageError {
    /// Error related to configuration loading or validation.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// A generator was requested for an output kind that does not exist.
    ///
    /// This is a programming error on the caller's side; the supported kinds
    /// are `json`, `javascript` and `python`.
    #[error("Unsupported output kind `{kind}` (expected json, javascript or python).")]
    UnsupportedKind {
        /// The kind name that was requested.
        kind: String,
    },

    /// A value could not be turned into a literal tree or parsed from JSON.
    #[error("Serialization error: {message}.")]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
        /// The underlying serde error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Error related to boilerplate template rendering.
    #[error(
        "Template rendering error: {message} in template `{template}`."
    )]
    TemplateRenderingError {
        /// Description of the template rendering error.
        message: String,
        /// The template name associated with the error.
        template: String,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered during file operations.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// General internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for FaultPageError {
    /// Converts a standard IO error into a `FaultPageError::IOError` with an
    /// empty path.
    fn from(source: std::io::Error) -> Self {
        FaultPageError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<serde_json::Error> for FaultPageError {
    fn from(source: serde_json::Error) -> Self {
        FaultPageError::SerializationError {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

impl FaultPageError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        FaultPageError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates an `UnsupportedKind` error for the requested kind name.
    pub fn unsupported_kind<S: Into<String>>(kind: S) -> Self {
        FaultPageError::UnsupportedKind { kind: kind.into() }
    }

    /// Creates a `TemplateRenderingError` with a message, template name, and optional source.
    ///
    /// # Parameters
    /// - `message`: A description of the template rendering error.
    /// - `template`: The template associated with the error.
    /// - `source`: An optional source error providing additional context.
    pub fn template_rendering_error<S: Into<String>>(
        message: S,
        template: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FaultPageError::TemplateRenderingError {
            message: message.into(),
            template,
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        FaultPageError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        FaultPageError::InternalError(message.into())
    }
}
