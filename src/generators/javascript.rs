// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JavaScript output for an Express-style request handler. Object literal
//! syntax is a superset of JSON, so the JSON spelling rules apply unchanged.

use super::TargetLanguage;
use crate::export::OutputKind;
use crate::literal::{JsonSyntax, LiteralSyntax};
use crate::placeholder::{Placeholders, RuntimeField};

/// First 16 characters of the `Cf-Ray` header, or an empty string.
pub const RAY_ID_EXPRESSION: &str = "(req.get('Cf-Ray') ?? '').substring(0, 16)";

/// `X-Forwarded-For`, falling back to the socket's peer address.
pub const CLIENT_IP_EXPRESSION: &str =
    "req.get('X-Forwarded-For') || req.socket.remoteAddress";

/// The JavaScript target.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScript;

impl LiteralSyntax for JavaScript {
    fn indent_width(&self) -> usize {
        JsonSyntax.indent_width()
    }

    fn format_bool(&self, value: bool) -> &'static str {
        JsonSyntax.format_bool(value)
    }

    fn format_null(&self) -> &'static str {
        JsonSyntax.format_null()
    }
}

impl TargetLanguage for JavaScript {
    fn kind(&self) -> OutputKind {
        OutputKind::JavaScript
    }

    fn name(&self) -> &'static str {
        "JavaScript Example"
    }

    fn placeholders(&self) -> Placeholders {
        Placeholders::new()
            .raw(RuntimeField::RayId, RAY_ID_EXPRESSION)
            .raw(RuntimeField::ClientIp, CLIENT_IP_EXPRESSION)
    }
}
