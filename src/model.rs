// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Parameter Model
//!
//! The typed description of one error page: its title, the three status
//! panels, the explanatory text and the optional attribution panels.
//!
//! Every field is optional. Absent fields are left out of every encoding and
//! fall back to renderer defaults at render time. A field given as `null`
//! is kept as `null` and treated like an absent one when rendering. Field
//! declaration order is significant: the literal encoders emit keys in
//! exactly this order.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;

/// A field that tells `null` apart from a missing key: `None` is absent,
/// `Some(None)` is an explicit `null` and `Some(Some(v))` holds a value.
pub type Nullable<T> = Option<Option<T>>;

/// Reads a present key, turning `null` into `Some(None)`. Missing keys never
/// reach this and stay `None` through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Status shown in a status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The hop is working.
    Ok,
    /// The hop is failing.
    Error,
}

/// Which of the three hops is blamed for the outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// The visitor's browser.
    Browser,
    /// The edge network in between.
    Cloudflare,
    /// The origin host.
    Host,
}

/// HTTP-ish error code. Usually a three digit numeral, but the form accepts
/// arbitrary tokens, so both JSON numbers and strings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    /// A JSON number such as `500`.
    Number(Number),
    /// A free-form string such as `"418"` or `"lmao"`.
    Text(String),
}

impl ErrorCode {
    /// Returns `true` for the values a JavaScript `||` would treat as empty.
    pub fn is_blank(&self) -> bool {
        match self {
            ErrorCode::Number(n) => n.as_f64() == Some(0.0),
            ErrorCode::Text(s) => s.is_empty(),
        }
    }

    /// Returns `true` if the code reads as a number the way JavaScript's
    /// `Number()` does: `404`, `"404"`, `" 5 "`, `"0x1f"`, `"Infinity"`, and
    /// the empty string. `"NaN"` and `"inf"` are not numbers.
    pub fn is_numeric(&self) -> bool {
        match self {
            ErrorCode::Number(_) => true,
            ErrorCode::Text(s) => is_numeric_text(s),
        }
    }
}

fn is_numeric_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        return !digits.is_empty()
            && digits.chars().all(|c| c.is_digit(radix));
    }

    let unsigned = trimmed
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return true;
    }
    // Rust also accepts "inf", "infinity" and "NaN" in any case.
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && trimmed.parse::<f64>().is_ok()
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{n}"),
            ErrorCode::Text(s) => f.write_str(s),
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        ErrorCode::Number(Number::from(code))
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

/// One of the three browser / edge / host panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPanel {
    /// Working or failing.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Nullable<Status>,
    /// Short label under the icon, e.g. `Working`.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_text: Nullable<String>,
    /// CSS colour override for `status_text`.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_text_color: Nullable<String>,
    /// Location line, e.g. `San Francisco`.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Nullable<String>,
    /// Panel heading, e.g. `Host`.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Nullable<String>,
}

impl StatusPanel {
    /// Creates a panel with only `status` set.
    pub fn with_status(status: Status) -> Self {
        Self {
            status: Some(Some(status)),
            ..Self::default()
        }
    }
}

/// The "Please include this Ray ID / visit ... for more information" line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoreInformation {
    /// Hide the whole line.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub hidden: Nullable<bool>,
    /// Link text.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Nullable<String>,
    /// Link target.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Nullable<String>,
    /// Audience label (the "for ..." suffix).
    #[serde(
        rename = "for",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub for_label: Nullable<String>,
}

/// "Performance & security by" attribution in the footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfSecBy {
    /// Attribution text.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Nullable<String>,
    /// Attribution link.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Nullable<String>,
}

/// Footer credit for whoever designed the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorInfo {
    /// Hide the credit.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub hidden: Nullable<bool>,
    /// Credit text.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Nullable<String>,
    /// Credit link.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Nullable<String>,
}

/// The full description of one error page.
///
/// Keys that are not recognised are kept in [`Configuration::extra`] and
/// emitted after the known fields, so configurations written for newer
/// renderers pass through the generators untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Main heading.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Nullable<String>,
    /// Code shown next to the heading and used as the HTTP status.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_code: Nullable<ErrorCode>,
    /// Document `<title>`; defaults to the heading.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub html_title: Nullable<String>,
    /// Timestamp string shown under the heading.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Nullable<String>,
    /// Per-request trace identifier, conventionally 16 hex characters.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub ray_id: Nullable<String>,
    /// Visitor address.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_ip: Nullable<String>,
    /// Browser panel.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub browser_status: Nullable<StatusPanel>,
    /// Edge panel.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub cloudflare_status: Nullable<StatusPanel>,
    /// Host panel.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub host_status: Nullable<StatusPanel>,
    /// Which panel is highlighted as the failing one.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_source: Nullable<ErrorSource>,
    /// "What happened?" paragraph, may contain inline markup.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub what_happened: Nullable<String>,
    /// "What can I do?" paragraph, may contain inline markup.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub what_can_i_do: Nullable<String>,
    /// Optional "more information" line.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub more_information: Nullable<MoreInformation>,
    /// Optional performance & security attribution.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub perf_sec_by: Nullable<PerfSecBy>,
    /// Optional creator credit.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub creator_info: Nullable<CreatorInfo>,
    /// Unrecognised keys, in input order.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Configuration {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns a copy without the per-request fields (`time`, `ray_id`,
    /// `client_ip`). Generators re-inject the identifiers themselves.
    pub fn without_transient(&self) -> Self {
        Self {
            time: None,
            ray_id: None,
            client_ip: None,
            ..self.clone()
        }
    }
}
