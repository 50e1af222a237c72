// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Boilerplate Template Rendering
//!
//! Wraps an encoded configuration literal in a short, language-specific
//! handler skeleton. Templates are Handlebars files; one for each output
//! kind is embedded in the crate and any of them can be replaced from a
//! directory of `*.hbs` files.
//!
//! ## Template context
//!
//! Every template is rendered with the same keys:
//!
//! - `literal`: the encoded configuration literal, unindented
//! - `error_code`: the normalized HTTP status
//! - `name`: human readable generator name
//! - `language`: the target language tag
//! - `extension`: the file extension of the target language
//!
//! HTML escaping is disabled: the output is source code. The built-in
//! `indent` helper shifts every line after the first by the given number of
//! spaces so the literal lines up with the wrapper's nesting, e.g.
//! `params = {{indent literal 4}}`.

use crate::{FaultPageError, Result, TemplateRenderer};
use handlebars::{
    Context, Handlebars, Helper, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use log::{debug, error, warn};
use parking_lot::RwLock;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Templates compiled into the crate, keyed by language tag.
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("json", include_str!("../templates/json.hbs")),
    ("javascript", include_str!("../templates/javascript.hbs")),
    ("python", include_str!("../templates/python.hbs")),
];

/// Value used to check that a template actually embeds the literal.
const SAMPLE_LITERAL: &str = "{\"faultpage\": \"sample\"}";

/// Represents a custom template helper with helper name and execution.
pub trait TemplateHelper: Send + Sync {
    /// Executes the helper with the given parameters and context.
    fn execute(
        &self,
        params: &[JsonValue],
        context: &JsonValue,
    ) -> Result<JsonValue>;

    /// Returns the name of the helper for registration.
    fn name(&self) -> &str;
}

/// Handlebars renderer for the boilerplate wrappers.
#[derive(Clone)]
pub struct HandlebarsRenderer {
    engine: Arc<RwLock<Handlebars<'static>>>, // Handlebars engine
    template_dir: Option<PathBuf>,            // Directory of overrides
    template_cache: Arc<RwLock<HashMap<String, String>>>, // Registered sources
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("template_dir", &self.template_dir)
            .field("templates", &self.template_names())
            .finish()
    }
}

impl HandlebarsRenderer {
    /// Creates a renderer with the embedded templates and helpers.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        let renderer = Self {
            engine: Arc::new(RwLock::new(handlebars)),
            template_dir: None,
            template_cache: Arc::new(RwLock::new(HashMap::new())),
        }
        .with_helper(helpers::IndentHelper);

        for (name, source) in EMBEDDED_TEMPLATES {
            renderer.register_template(name, source)?;
        }
        Ok(renderer)
    }

    /// Replaces templates with the `*.hbs` files found in `template_dir`.
    ///
    /// The file stem is the template name, so `python.hbs` replaces the
    /// Python wrapper. Files with other extensions are ignored.
    pub fn with_template_dir(mut self, template_dir: &Path) -> Result<Self> {
        self.template_dir = Some(template_dir.to_path_buf());
        self.load_templates(template_dir)?;
        Ok(self)
    }

    /// Registers or replaces a single template.
    pub fn with_template(self, name: &str, source: &str) -> Result<Self> {
        self.register_template(name, source)?;
        Ok(self)
    }

    /// Registers a custom helper with the renderer.
    pub fn with_helper<H>(self, helper: H) -> Self
    where
        H: TemplateHelper + 'static,
    {
        let name = helper.name().to_string();
        self.register_helper(&name, helper);
        self
    }

    /// Names of all registered templates, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.template_cache.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Loads templates from the directory, validating each one.
    fn load_templates(&self, template_dir: &Path) -> Result<()> {
        let entries = std::fs::read_dir(template_dir).map_err(|e| {
            FaultPageError::template_rendering_error(
                format!("Failed to read template directory: {}", e),
                template_dir.display().to_string(),
                Some(Box::new(e)),
            )
        })?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("hbs")
            {
                continue;
            }

            let template_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    FaultPageError::template_rendering_error(
                        "Invalid template filename",
                        path.display().to_string(),
                        None,
                    )
                })?;

            let source = std::fs::read_to_string(&path)
                .map_err(|e| FaultPageError::io_error(path.clone(), e))?;

            if !self.template_cache.read().contains_key(template_name) {
                warn!(
                    "Template '{}' does not override a built-in wrapper",
                    template_name
                );
            }
            self.register_template(template_name, &source)?;
            debug!("Loaded template '{}' from {:?}", template_name, path);
        }
        Ok(())
    }

    /// Compiles, validates and stores a template.
    fn register_template(&self, name: &str, source: &str) -> Result<()> {
        self.engine
            .write()
            .register_template_string(name, source)
            .map_err(|e| {
                FaultPageError::template_rendering_error(
                    format!("Failed to register template: {}", e),
                    name.to_string(),
                    Some(Box::new(e)),
                )
            })?;

        if let Err(e) = self.validate_template(name) {
            self.engine.write().unregister_template(name);
            if let Some(previous) = self.template_cache.read().get(name) {
                // Restore the wrapper that was replaced.
                if let Err(restore) = self
                    .engine
                    .write()
                    .register_template_string(name, previous)
                {
                    error!(
                        "Failed to restore template '{}': {}",
                        name, restore
                    );
                    return Err(FaultPageError::template_rendering_error(
                        format!(
                            "{}; previous template could not be restored: {}",
                            e, restore
                        ),
                        name.to_string(),
                        Some(Box::new(restore)),
                    ));
                }
            }
            return Err(e);
        }

        let _ = self
            .template_cache
            .write()
            .insert(name.to_string(), source.to_string());
        Ok(())
    }

    /// Registers a helper function with the Handlebars engine.
    fn register_helper<H>(&self, name: &str, helper: H)
    where
        H: TemplateHelper + 'static,
    {
        let helper_fn = move |h: &Helper,
                              _: &Handlebars,
                              ctx: &Context,
                              _: &mut RenderContext,
                              out: &mut dyn Output|
              -> std::result::Result<
            (),
            RenderError,
        > {
            let params: Vec<JsonValue> =
                h.params().iter().map(|p| p.value().clone()).collect();

            let result =
                helper.execute(&params, ctx.data()).map_err(|e| {
                    RenderError::from(RenderErrorReason::Other(
                        e.to_string(),
                    ))
                })?;
            match result {
                JsonValue::String(text) => out.write(&text)?,
                other => out.write(&other.to_string())?,
            }
            Ok(())
        };

        self.engine
            .write()
            .register_helper(name, Box::new(helper_fn));
    }

    /// Renders the template against a sample context and checks that the
    /// literal made it into the output.
    fn validate_template(&self, name: &str) -> Result<()> {
        let sample = json!({
            "literal": SAMPLE_LITERAL,
            "error_code": "500",
            "name": "sample",
            "language": name,
            "extension": "txt",
        });
        let rendered = self.engine.read().render(name, &sample).map_err(|e| {
            FaultPageError::template_rendering_error(
                format!("Template validation failed: {}", e),
                name.to_string(),
                Some(Box::new(e)),
            )
        })?;

        if !rendered.contains(SAMPLE_LITERAL) {
            return Err(FaultPageError::template_rendering_error(
                "Template never outputs `literal`",
                name.to_string(),
                None,
            ));
        }
        Ok(())
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        template: &str,
        context: &JsonValue,
    ) -> Result<String> {
        self.validate(template, context)?;
        self.engine.read().render(template, context).map_err(|e| {
            FaultPageError::template_rendering_error(
                format!("Template rendering failed: {}", e),
                template.to_string(),
                Some(Box::new(e)),
            )
        })
    }

    fn validate(
        &self,
        template: &str,
        context: &JsonValue,
    ) -> Result<()> {
        if !self.template_cache.read().contains_key(template) {
            return Err(FaultPageError::template_rendering_error(
                format!("Template '{}' not found", template),
                template.to_string(),
                None,
            ));
        }
        if context.get("literal").and_then(JsonValue::as_str).is_none() {
            return Err(FaultPageError::template_rendering_error(
                "Missing required variable 'literal'",
                template.to_string(),
                None,
            ));
        }
        Ok(())
    }
}

/// Built-in helpers for template processing.
pub mod helpers {
    use super::*;

    /// Indents every line after the first: `{{indent text 4}}`.
    #[derive(Debug, Clone, Copy)]
    pub struct IndentHelper;

    impl TemplateHelper for IndentHelper {
        fn execute(
            &self,
            params: &[JsonValue],
            _context: &JsonValue,
        ) -> Result<JsonValue> {
            let text =
                params.first().and_then(|p| p.as_str()).ok_or_else(|| {
                    FaultPageError::template_rendering_error(
                        "Indent helper requires a string parameter",
                        String::new(),
                        None,
                    )
                })?;
            let width = params
                .get(1)
                .map(|p| {
                    p.as_u64().ok_or_else(|| {
                        FaultPageError::template_rendering_error(
                            "Indent width must be a non-negative integer",
                            String::new(),
                            None,
                        )
                    })
                })
                .transpose()?
                .unwrap_or(0);

            let separator = format!("\n{}", " ".repeat(width as usize));
            Ok(JsonValue::String(text.replace('\n', &separator)))
        }

        fn name(&self) -> &str {
            "indent"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(literal: &str) -> JsonValue {
        json!({
            "literal": literal,
            "error_code": "503",
            "name": "test",
            "language": "python",
            "extension": "py",
        })
    }

    #[test]
    fn test_embedded_templates_are_registered() {
        let renderer = HandlebarsRenderer::new().unwrap();
        assert_eq!(
            renderer.template_names(),
            ["javascript", "json", "python"]
        );
    }

    #[test]
    fn test_indent_helper_shifts_following_lines() {
        let renderer = HandlebarsRenderer::new()
            .unwrap()
            .with_template("t", "x = {{indent literal 4}}")
            .unwrap();
        let out = renderer.render("t", &context("{\n\"a\": 1\n}")).unwrap();
        assert_eq!(out, "x = {\n    \"a\": 1\n    }");
    }

    #[test]
    fn test_output_is_not_html_escaped() {
        let renderer = HandlebarsRenderer::new()
            .unwrap()
            .with_template("t", "{{literal}} <{{error_code}}>")
            .unwrap();
        let out = renderer.render("t", &context("a && b < 'c'")).unwrap();
        assert_eq!(out, "a && b < 'c' <503>");
    }

    #[test]
    fn test_template_without_literal_is_rejected() {
        let result = HandlebarsRenderer::new()
            .unwrap()
            .with_template("t", "status {{error_code}}");
        assert!(matches!(
            result,
            Err(FaultPageError::TemplateRenderingError { .. })
        ));
    }

    #[test]
    fn test_rejected_override_keeps_previous_template() {
        let renderer = HandlebarsRenderer::new().unwrap();
        assert!(renderer
            .register_template("python", "{{error_code}}")
            .is_err());
        let out = renderer.render("python", &context("{}")).unwrap();
        assert!(out.contains("params = {}"));
    }

    #[test]
    fn test_failed_restore_is_reported() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let _ = renderer
            .template_cache
            .write()
            .insert("python".to_string(), "{{#if}}".to_string());

        let err = renderer
            .register_template("python", "{{error_code}}")
            .unwrap_err();
        assert!(matches!(
            err,
            FaultPageError::TemplateRenderingError { ref template, .. }
                if template == "python"
        ));
        assert!(err
            .to_string()
            .contains("previous template could not be restored"));
    }

    #[test]
    fn test_unknown_template_fails() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let err = renderer.render("ruby", &context("{}")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_literal_in_context_fails() {
        let renderer = HandlebarsRenderer::new().unwrap();
        assert!(renderer.render("json", &json!({})).is_err());
    }

    #[test]
    fn test_template_dir_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("json.hbs"),
            "// {{name}}\n{{indent literal 0}}\n",
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let renderer = HandlebarsRenderer::new()
            .unwrap()
            .with_template_dir(temp_dir.path())
            .unwrap();
        let out = renderer.render("json", &context("{}")).unwrap();
        assert_eq!(out, "// test\n{}\n");
        assert_eq!(renderer.template_names().len(), 3);
    }

    #[test]
    fn test_missing_template_dir_fails() {
        let result = HandlebarsRenderer::new()
            .unwrap()
            .with_template_dir(Path::new("/definitely/not/here"));
        assert!(result.is_err());
    }
}
