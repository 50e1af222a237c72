// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Code Generators
//!
//! A code generator turns one [`Configuration`] into a complete, directly
//! usable source file in a target language. Every generator is the same
//! [`SourceGenerator`] pipeline parameterised by a [`TargetLanguage`]:
//!
//! 1. the language's [`Placeholders`] lower the configuration into a
//!    [`Literal`](crate::literal::Literal) tree with runtime fields spliced in;
//! 2. a [`LiteralEncoder`] writes the tree with the language's
//!    [`LiteralSyntax`];
//! 3. the [`TemplateRenderer`] wraps the literal in the language's handler
//!    boilerplate, together with the normalized error code.
//!
//! ```
//! use faultpage::generators::generator_for;
//! use faultpage::export::OutputKind;
//! use faultpage::model::Configuration;
//! use faultpage::template::HandlebarsRenderer;
//! use std::sync::Arc;
//!
//! let renderer = Arc::new(HandlebarsRenderer::new().unwrap());
//! let generator = generator_for(OutputKind::Python, renderer);
//! let config = Configuration::from_json(r#"{"title": "Teapot", "error_code": "418"}"#).unwrap();
//! let source = generator.generate(&config).unwrap();
//! assert!(source.contains("return render_cf_error_page(params), 418"));
//! ```

/// JSON descriptor output.
pub mod json;

/// JavaScript (Express-style handler) output.
pub mod javascript;

/// Python (Flask/WSGI handler) output.
pub mod python;

pub use javascript::JavaScript;
pub use json::Json;
pub use python::Python;

use crate::export::OutputKind;
use crate::literal::{LiteralEncoder, LiteralSyntax};
use crate::model::{Configuration, ErrorCode};
use crate::placeholder::Placeholders;
use crate::{CodeGenerator, Result, TemplateRenderer};
use log::debug;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, OnceLock};

/// Status used when the configured error code is not a three digit numeral.
pub const FALLBACK_ERROR_CODE: u16 = 500;

/// Everything that differs between output languages.
pub trait TargetLanguage: LiteralSyntax {
    /// The output kind this language produces.
    fn kind(&self) -> OutputKind;

    /// Human readable generator name.
    fn name(&self) -> &'static str;

    /// Runtime substitutions for one generation call.
    fn placeholders(&self) -> Placeholders;
}

/// Maps the configured error code to the HTTP status used by the wrapper.
///
/// Any code whose text contains three consecutive digits is passed through
/// unchanged (`"404"`, `999`, but also `"4040"` and `"abc500xyz"`); anything
/// else, including a missing code, becomes [`FALLBACK_ERROR_CODE`].
pub fn normalize_error_code(error_code: Option<&ErrorCode>) -> ErrorCode {
    static THREE_DIGITS: OnceLock<Regex> = OnceLock::new();
    let pattern = THREE_DIGITS.get_or_init(|| {
        Regex::new(r"[0-9]{3}").expect("three-digit pattern is valid")
    });

    match error_code {
        Some(code)
            if !code.is_blank() && pattern.is_match(&code.to_string()) =>
        {
            code.clone()
        }
        _ => ErrorCode::from(FALLBACK_ERROR_CODE),
    }
}

/// The shared generation pipeline.
#[derive(Debug, Clone)]
pub struct SourceGenerator<L> {
    language: L,
    renderer: Arc<dyn TemplateRenderer>,
}

impl<L: TargetLanguage> SourceGenerator<L> {
    /// Creates a generator for `language` that wraps output with `renderer`.
    pub fn new(language: L, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { language, renderer }
    }

    /// Encodes `config` as a literal of the target language, with runtime
    /// fields substituted but without any boilerplate.
    pub fn encode(&self, config: &Configuration) -> Result<String> {
        let literal = self.language.placeholders().apply(config)?;
        Ok(LiteralEncoder::new(&self.language).encode(&literal))
    }
}

impl<L: TargetLanguage + 'static> CodeGenerator for SourceGenerator<L> {
    fn kind(&self) -> OutputKind {
        self.language.kind()
    }

    fn name(&self) -> &str {
        self.language.name()
    }

    fn generate(&self, config: &Configuration) -> Result<String> {
        let kind = self.language.kind();
        let literal = self.encode(config)?;
        let error_code = normalize_error_code(
            config.error_code.as_ref().and_then(Option::as_ref),
        );
        debug!(
            "Generating {} source ({} bytes of literal, status {})",
            kind.language(),
            literal.len(),
            error_code
        );

        let context = json!({
            "literal": literal,
            "error_code": error_code.to_string(),
            "name": self.language.name(),
            "language": kind.language(),
            "extension": kind.extension(),
        });
        self.renderer.render(kind.language(), &context)
    }
}

/// Returns the generator for `kind`.
pub fn generator_for(
    kind: OutputKind,
    renderer: Arc<dyn TemplateRenderer>,
) -> Box<dyn CodeGenerator> {
    match kind {
        OutputKind::Json => Box::new(SourceGenerator::new(Json, renderer)),
        OutputKind::JavaScript => {
            Box::new(SourceGenerator::new(JavaScript, renderer))
        }
        OutputKind::Python => {
            Box::new(SourceGenerator::new(Python, renderer))
        }
    }
}
