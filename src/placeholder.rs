// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Runtime Field Placeholders
//!
//! Some configuration fields are meant to be computed by the generated code
//! for every request instead of being baked in as constants. `Placeholders`
//! records, for one generation call, which fields get which replacement.
//!
//! Applying the placeholders to a configuration happens in four steps:
//!
//! 1. the caller's configuration is cloned (it is never mutated);
//! 2. every replaced field is *marked* on the clone, which reserves its slot
//!    in the declared field order even if the caller stripped it;
//! 3. the clone is lowered into a [`Literal`] tree;
//! 4. the replacement is *spliced* into the reserved slot.
//!
//! A replacement is itself a [`Literal`]: usually [`Literal::Raw`] source
//! text, or a plain string for targets without expression syntax. Because
//! the substitution happens on the tree rather than on encoded text, nothing
//! in the configuration can collide with it.

use crate::literal::Literal;
use crate::model::Configuration;
use crate::Result;
use log::trace;

/// Configuration fields the generated code fills in per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeField {
    /// The request's trace identifier.
    RayId,
    /// The visitor's address.
    ClientIp,
}

impl RuntimeField {
    /// Key of the field in the encoded configuration.
    pub fn key(self) -> &'static str {
        match self {
            RuntimeField::RayId => "ray_id",
            RuntimeField::ClientIp => "client_ip",
        }
    }

    /// Reserves the field's slot on `config` so that it is encoded at its
    /// declared position.
    fn mark(self, config: &mut Configuration) {
        let slot = match self {
            RuntimeField::RayId => &mut config.ray_id,
            RuntimeField::ClientIp => &mut config.client_ip,
        };
        *slot = Some(Some(String::new()));
    }
}

/// The substitutions applied during one generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    entries: Vec<(RuntimeField, Literal)>,
}

impl Placeholders {
    /// Creates an empty set of substitutions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `field` with raw source text.
    pub fn raw<S: Into<String>>(self, field: RuntimeField, expression: S) -> Self {
        self.with(field, Literal::raw(expression))
    }

    /// Replaces `field` with a plain string literal.
    pub fn literal<S: Into<String>>(self, field: RuntimeField, text: S) -> Self {
        self.with(field, Literal::String(text.into()))
    }

    /// Replaces `field` with an arbitrary literal. A later entry for the same
    /// field overrides an earlier one.
    pub fn with(mut self, field: RuntimeField, value: Literal) -> Self {
        self.entries.retain(|(f, _)| *f != field);
        self.entries.push((field, value));
        self
    }

    /// Returns `true` if no field is replaced.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The replacement registered for `field`, if any.
    pub fn get(&self, field: RuntimeField) -> Option<&Literal> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    /// Returns a copy of `config` with every replaced field reserved.
    pub fn mark(&self, config: &Configuration) -> Configuration {
        let mut snapshot = config.clone();
        for (field, _) in &self.entries {
            field.mark(&mut snapshot);
        }
        snapshot
    }

    /// Writes every replacement into `literal`.
    pub fn splice(&self, literal: &mut Literal) {
        for (field, value) in &self.entries {
            if literal.set(field.key(), value.clone()) {
                trace!("Spliced runtime value into `{}`", field.key());
            }
        }
    }

    /// Marks, lowers and splices `config` in one go.
    pub fn apply(&self, config: &Configuration) -> Result<Literal> {
        let snapshot = self.mark(config);
        let mut literal = Literal::from_serialize(&snapshot)?;
        self.splice(&mut literal);
        Ok(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;

    fn sample() -> Configuration {
        Configuration {
            title: Some(Some("Down".to_string())),
            error_code: Some(Some(ErrorCode::from("502"))),
            what_happened: Some(Some("Gateway gone.".to_string())),
            ..Configuration::default()
        }
    }

    fn keys(literal: &Literal) -> Vec<String> {
        match literal {
            Literal::Object(entries) => {
                entries.iter().map(|(k, _)| k.clone()).collect()
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_places_fields_in_declared_order() {
        let placeholders = Placeholders::new()
            .raw(RuntimeField::ClientIp, "ip()")
            .raw(RuntimeField::RayId, "ray()");
        let literal = placeholders.apply(&sample()).unwrap();
        assert_eq!(
            keys(&literal),
            ["title", "error_code", "ray_id", "client_ip", "what_happened"]
        );
        assert_eq!(literal.get("ray_id"), Some(&Literal::raw("ray()")));
        assert_eq!(literal.get("client_ip"), Some(&Literal::raw("ip()")));
    }

    #[test]
    fn test_apply_overrides_existing_values() {
        let mut config = sample();
        config.ray_id = Some(Some("0123456789abcdef".to_string()));
        let literal = Placeholders::new()
            .literal(RuntimeField::RayId, "RAY")
            .apply(&config)
            .unwrap();
        assert_eq!(
            literal.get("ray_id"),
            Some(&Literal::String("RAY".to_string()))
        );
        assert_eq!(literal.get("client_ip"), None);
    }

    #[test]
    fn test_caller_configuration_is_not_mutated() {
        let config = sample();
        let before = config.clone();
        let _ = Placeholders::new()
            .raw(RuntimeField::RayId, "ray()")
            .apply(&config)
            .unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn test_user_text_equal_to_expression_stays_quoted() {
        let mut config = sample();
        config.title = Some(Some("ray()".to_string()));
        let literal = Placeholders::new()
            .raw(RuntimeField::RayId, "ray()")
            .apply(&config)
            .unwrap();
        assert_eq!(
            literal.get("title"),
            Some(&Literal::String("ray()".to_string()))
        );
    }

    #[test]
    fn test_later_entry_wins() {
        let placeholders = Placeholders::new()
            .raw(RuntimeField::RayId, "first")
            .raw(RuntimeField::RayId, "second");
        assert_eq!(
            placeholders.get(RuntimeField::RayId),
            Some(&Literal::raw("second"))
        );
        assert!(!placeholders.is_empty());
        assert!(Placeholders::new().is_empty());
    }
}
