// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Python output for a Flask (WSGI) view function.
//!
//! Dict literals share JSON's string and number syntax, but booleans and
//! null are spelled `True`, `False` and `None`, and nesting uses four spaces.

use super::TargetLanguage;
use crate::export::OutputKind;
use crate::literal::LiteralSyntax;
use crate::placeholder::{Placeholders, RuntimeField};

/// First 16 characters of the `Cf-Ray` header, or an empty string.
pub const RAY_ID_EXPRESSION: &str = "request.headers.get(\"Cf-Ray\", \"\")[:16]";

/// `X-Forwarded-For`, falling back to the WSGI remote address.
pub const CLIENT_IP_EXPRESSION: &str =
    "request.headers.get(\"X-Forwarded-For\") or request.remote_addr";

/// The Python target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

impl LiteralSyntax for Python {
    fn indent_width(&self) -> usize {
        4
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }

    fn format_null(&self) -> &'static str {
        "None"
    }
}

impl TargetLanguage for Python {
    fn kind(&self) -> OutputKind {
        OutputKind::Python
    }

    fn name(&self) -> &'static str {
        "Python Example"
    }

    fn placeholders(&self) -> Placeholders {
        Placeholders::new()
            .raw(RuntimeField::RayId, RAY_ID_EXPRESSION)
            .raw(RuntimeField::ClientIp, CLIENT_IP_EXPRESSION)
    }
}
