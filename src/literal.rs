// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Literal Encoding
//!
//! Serializes a value into the object/dict literal syntax of a target
//! language. Values are first lowered into a [`Literal`] tree, which is the
//! same shape as JSON plus one extra variant, [`Literal::Raw`], holding source
//! text that is emitted verbatim. Raw nodes are how generated code gets
//! runtime expressions (header lookups and the like) in places where the
//! configuration only had a constant.
//!
//! The per-language differences are captured by [`LiteralSyntax`]: how a
//! string is quoted, how booleans and null are spelled, and how wide one
//! indentation level is. The layout itself is shared: one entry per line,
//! `key: value` pairs, empty containers collapsed to `{}` / `[]`, and keys
//! emitted in insertion order.
//!
//! ```
//! use faultpage::literal::{Literal, LiteralEncoder, JsonSyntax};
//!
//! let value = Literal::Object(vec![
//!     ("hidden".to_string(), Literal::Bool(true)),
//!     ("ray_id".to_string(), Literal::Raw("req.id".to_string())),
//! ]);
//! let text = LiteralEncoder::new(&JsonSyntax).encode(&value);
//! assert_eq!(text, "{\n  \"hidden\": true,\n  \"ray_id\": req.id\n}");
//! ```

use crate::Result;
use serde::Serialize;
use serde_json::{Number, Value as JsonValue};

/// A value ready to be written as a source-language literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// JSON `null` / Python `None`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, written in JSON notation.
    Number(Number),
    /// A string, quoted and escaped by the language syntax.
    String(String),
    /// An ordered list.
    Array(Vec<Literal>),
    /// An ordered map; keys keep insertion order.
    Object(Vec<(String, Literal)>),
    /// Source text emitted without quoting or escaping.
    Raw(String),
}

impl Literal {
    /// Lowers any serializable value into a literal tree.
    ///
    /// Struct fields keep their declaration order and map entries keep their
    /// insertion order.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Creates a raw expression node.
    pub fn raw<S: Into<String>>(expression: S) -> Self {
        Literal::Raw(expression.into())
    }

    /// Looks up an object entry by key.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Object(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Replaces the value stored under `key`, keeping its position, or
    /// appends a new entry. Returns `false` if `self` is not an object.
    pub fn set(&mut self, key: &str, value: Literal) -> bool {
        let Literal::Object(entries) = self else {
            return false;
        };
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key.to_string(), value)),
        }
        true
    }
}

impl From<JsonValue> for Literal {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Literal::Null,
            JsonValue::Bool(b) => Literal::Bool(b),
            JsonValue::Number(n) => Literal::Number(n),
            JsonValue::String(s) => Literal::String(s),
            JsonValue::Array(items) => {
                Literal::Array(items.into_iter().map(Literal::from).collect())
            }
            JsonValue::Object(map) => Literal::Object(
                map.into_iter().map(|(k, v)| (k, Literal::from(v))).collect(),
            ),
        }
    }
}

/// Literal spelling rules of one target language.
pub trait LiteralSyntax: Send + Sync + std::fmt::Debug {
    /// Number of spaces per nesting level.
    fn indent_width(&self) -> usize;

    /// Spelling of `true` / `false`.
    fn format_bool(&self, value: bool) -> &'static str;

    /// Spelling of the null value.
    fn format_null(&self) -> &'static str;

    /// Returns `value` as a quoted, escaped string literal.
    ///
    /// The default produces a JSON string, which is also a valid string
    /// literal in JavaScript and Python.
    fn escape_string(&self, value: &str) -> String {
        JsonValue::String(value.to_string()).to_string()
    }
}

/// Plain JSON literal rules: `true`, `false`, `null`, two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSyntax;

impl LiteralSyntax for JsonSyntax {
    fn indent_width(&self) -> usize {
        2
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn format_null(&self) -> &'static str {
        "null"
    }
}

/// Writes [`Literal`] trees using one language's [`LiteralSyntax`].
#[derive(Debug, Clone, Copy)]
pub struct LiteralEncoder<'s> {
    syntax: &'s dyn LiteralSyntax,
}

impl<'s> LiteralEncoder<'s> {
    /// Creates an encoder for the given syntax.
    pub fn new(syntax: &'s dyn LiteralSyntax) -> Self {
        Self { syntax }
    }

    /// Encodes `value` starting at nesting depth zero.
    pub fn encode(&self, value: &Literal) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    fn write_value(&self, out: &mut String, value: &Literal, depth: usize) {
        match value {
            Literal::Null => out.push_str(self.syntax.format_null()),
            Literal::Bool(b) => out.push_str(self.syntax.format_bool(*b)),
            Literal::Number(n) => out.push_str(&n.to_string()),
            Literal::String(s) => out.push_str(&self.syntax.escape_string(s)),
            Literal::Raw(expression) => out.push_str(expression),
            Literal::Array(items) if items.is_empty() => out.push_str("[]"),
            Literal::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    self.open_entry(out, i, depth + 1);
                    self.write_value(out, item, depth + 1);
                }
                self.close(out, ']', depth);
            }
            Literal::Object(entries) if entries.is_empty() => {
                out.push_str("{}")
            }
            Literal::Object(entries) => {
                out.push('{');
                for (i, (key, item)) in entries.iter().enumerate() {
                    self.open_entry(out, i, depth + 1);
                    out.push_str(&self.syntax.escape_string(key));
                    out.push_str(": ");
                    self.write_value(out, item, depth + 1);
                }
                self.close(out, '}', depth);
            }
        }
    }

    fn open_entry(&self, out: &mut String, index: usize, depth: usize) {
        if index > 0 {
            out.push(',');
        }
        out.push('\n');
        self.indent(out, depth);
    }

    fn close(&self, out: &mut String, bracket: char, depth: usize) {
        out.push('\n');
        self.indent(out, depth);
        out.push(bracket);
    }

    fn indent(&self, out: &mut String, depth: usize) {
        let width = depth * self.syntax.indent_width();
        out.extend(std::iter::repeat(' ').take(width));
    }
}
