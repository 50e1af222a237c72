// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # FaultPage Library
//!
//! FaultPage turns the configuration of a customised edge-proxy style error
//! page into ready-to-use source code: a JSON descriptor, or a small
//! JavaScript or Python web handler that serves the page with per-request
//! values (ray id, client address) filled in at runtime.
//!
//! For more information, visit the [FaultPage documentation](https://docs.rs/faultpage).

#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/faultpage")]
#![crate_name = "faultpage"]
#![crate_type = "lib"]

use crate::export::OutputKind;
use crate::model::Configuration;

pub use crate::core::error::{FaultPageError, Result};

/// Module containing core utilities, such as configuration and error handling.
pub mod core {
    /// Handles configuration of the FaultPage export tool.
    pub mod config;
    /// Contains error types and handling for FaultPage.
    pub mod error;
}

/// Provides command-line interface utilities.
pub mod cli;

/// Selects generators by output kind and packages their results.
pub mod export;

/// Provides source generators for each output language.
pub mod generators;

/// Language-neutral literal tree and its encoder.
pub mod literal;

/// The error page configuration model.
pub mod model;

/// Render parameter preparation for the HTML page.
pub mod page;

/// Runtime value substitution.
pub mod placeholder;

/// Provides template rendering utilities.
pub mod template;

/// Trait for template rendering implementations.
///
/// This trait defines methods for rendering and validating templates.
pub trait TemplateRenderer: Send + Sync + std::fmt::Debug {
    /// Renders a template with the specified context.
    ///
    /// # Arguments
    /// * `template` - The template name or identifier.
    /// * `context` - The context data for rendering the template.
    ///
    /// # Returns
    /// * `Result<String>` - The rendered output, or an error if rendering fails.
    fn render(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String>;

    /// Validates the template against the context.
    ///
    /// # Arguments
    /// * `template` - The template name or identifier.
    /// * `context` - The context data.
    ///
    /// # Returns
    /// * `Result<()>` - Indicates success if valid, or an error otherwise.
    fn validate(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<()>;
}

/// Trait for source code generators.
///
/// A generator is pure: the same configuration always yields the same text,
/// and the configuration is never modified.
pub trait CodeGenerator: Send + Sync + std::fmt::Debug {
    /// The output kind this generator produces.
    fn kind(&self) -> OutputKind;

    /// Human readable generator name.
    fn name(&self) -> &str;

    /// Language tag for syntax highlighting.
    fn language(&self) -> &str {
        self.kind().language()
    }

    /// Generates the source text for `config`.
    ///
    /// # Arguments
    /// * `config` - The error page configuration.
    ///
    /// # Returns
    /// * `Result<String>` - The generated source, or an error if the
    ///   configuration cannot be serialized or the wrapper fails to render.
    fn generate(&self, config: &Configuration) -> Result<String>;
}
