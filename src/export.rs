// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Export Driver
//!
//! Selects a generator by output kind, feeds it the current configuration
//! and packages the result with the metadata a save dialog needs: the
//! language tag used for syntax highlighting and a file name derived from the
//! page title.
//!
//! ```
//! use faultpage::export::{Exporter, OutputKind};
//! use faultpage::model::Configuration;
//!
//! let exporter = Exporter::new().unwrap();
//! let config = Configuration::from_json(r#"{"title": "I'm a teapot"}"#).unwrap();
//! let export = exporter.export(&config, OutputKind::Python).unwrap();
//! assert_eq!(export.filename, "i_m_a_teapot_example.py");
//! assert_eq!(export.kind.language(), "python");
//! ```

use crate::generators::generator_for;
use crate::model::Configuration;
use crate::template::HandlebarsRenderer;
use crate::{CodeGenerator, FaultPageError, Result, TemplateRenderer};
use log::{debug, info};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use unicode_normalization::UnicodeNormalization;

/// Title used for the file name when the configuration has none.
pub const DEFAULT_TITLE: &str = "Internal server error";

/// The target syntaxes a configuration can be exported to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// JSON descriptor.
    Json,
    /// JavaScript handler snippet.
    #[serde(alias = "js")]
    JavaScript,
    /// Python handler snippet.
    #[serde(alias = "py")]
    Python,
}

impl OutputKind {
    /// Every supported kind.
    pub const ALL: [OutputKind; 3] =
        [OutputKind::Json, OutputKind::JavaScript, OutputKind::Python];

    /// Language tag for syntax highlighting; also the template name.
    pub fn language(self) -> &'static str {
        match self {
            OutputKind::Json => "json",
            OutputKind::JavaScript => "javascript",
            OutputKind::Python => "python",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Json => "json",
            OutputKind::JavaScript => "js",
            OutputKind::Python => "py",
        }
    }

    /// Word separator used in file names.
    pub fn separator(self) -> char {
        match self {
            OutputKind::Python => '_',
            OutputKind::Json | OutputKind::JavaScript => '-',
        }
    }

    /// Snippets get an " example" suffix; the descriptor does not.
    fn is_example(self) -> bool {
        !matches!(self, OutputKind::Json)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language())
    }
}

impl FromStr for OutputKind {
    type Err = FaultPageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputKind::Json),
            "js" | "javascript" => Ok(OutputKind::JavaScript),
            "py" | "python" => Ok(OutputKind::Python),
            _ => Err(FaultPageError::unsupported_kind(s)),
        }
    }
}

/// Lower-cases and then NFKC-normalises `text`, and joins its runs of
/// letters and numbers with `separator`, dropping everything else.
/// Normalisation comes second, so compatibility forms such as `ℌ` fold to
/// their upper-case base letter.
pub fn slugify(text: &str, separator: char) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let pattern = NON_WORD.get_or_init(|| {
        Regex::new(r"[^\p{L}\p{N}]+").expect("non-word pattern is valid")
    });

    let normalized = text.to_lowercase().nfkc().collect::<String>();
    let mut buf = [0; 4];
    let joiner = separator.encode_utf8(&mut buf);
    pattern
        .replace_all(&normalized, NoExpand(joiner))
        .trim_matches(separator)
        .to_string()
}

/// File name for an export of `kind` for a page titled `title`.
pub fn export_filename(title: Option<&str>, kind: OutputKind) -> String {
    let mut name = title
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    if kind.is_example() {
        name.push_str(" example");
    }
    format!("{}.{}", slugify(&name, kind.separator()), kind.extension())
}

/// One generated file, ready to be saved, copied or highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// The kind that produced `content`.
    pub kind: OutputKind,
    /// Suggested file name.
    pub filename: String,
    /// Generated source text.
    pub content: String,
}

impl Export {
    /// Writes the export into `dir`, creating the directory if needed, and
    /// returns the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| FaultPageError::io_error(dir.to_path_buf(), e))?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.content)
            .map_err(|e| FaultPageError::io_error(path.clone(), e))?;
        info!("Wrote {} export to {:?}", self.kind, path);
        Ok(path)
    }
}

/// Produces exports for any output kind from a shared template renderer.
#[derive(Debug, Clone)]
pub struct Exporter {
    renderer: Arc<dyn TemplateRenderer>,
    strip_transient: bool,
}

impl Exporter {
    /// Creates an exporter using the embedded templates.
    pub fn new() -> Result<Self> {
        Ok(Self::with_renderer(Arc::new(HandlebarsRenderer::new()?)))
    }

    /// Creates an exporter using `renderer` for boilerplate.
    pub fn with_renderer(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            renderer,
            strip_transient: true,
        }
    }

    /// Whether `time`, `ray_id` and `client_ip` are removed before
    /// generation. On by default.
    pub fn strip_transient(mut self, strip: bool) -> Self {
        self.strip_transient = strip;
        self
    }

    /// The generator for `kind`.
    pub fn generator(&self, kind: OutputKind) -> Box<dyn CodeGenerator> {
        generator_for(kind, Arc::clone(&self.renderer))
    }

    /// Generates the export of `config` for `kind`.
    pub fn export(
        &self,
        config: &Configuration,
        kind: OutputKind,
    ) -> Result<Export> {
        let snapshot = if self.strip_transient {
            config.without_transient()
        } else {
            config.clone()
        };
        let generator = self.generator(kind);
        debug!("Exporting with generator '{}'", generator.name());
        let content = generator.generate(&snapshot)?;
        if content.trim().is_empty() {
            return Err(FaultPageError::internal_error(format!(
                "{} generator produced no output",
                kind
            )));
        }

        Ok(Export {
            kind,
            filename: export_filename(
                config.title.as_ref().and_then(Option::as_deref),
                kind,
            ),
            content,
        })
    }

    /// Generates every kind in `kinds`, failing on the first error so that
    /// nothing partial is handed back.
    pub fn export_all(
        &self,
        config: &Configuration,
        kinds: &[OutputKind],
    ) -> Result<Vec<Export>> {
        kinds.iter().map(|kind| self.export(config, *kind)).collect()
    }
}
