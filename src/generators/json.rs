// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON descriptor output. JSON has no expressions, so the runtime fields
//! are written as plain placeholder strings for the reader to fill in.

use super::TargetLanguage;
use crate::export::OutputKind;
use crate::literal::{JsonSyntax, LiteralSyntax};
use crate::placeholder::{Placeholders, RuntimeField};

/// Placeholder written for `ray_id`.
pub const RAY_ID_PLACEHOLDER: &str = "<ray-id>";

/// Placeholder written for `client_ip`.
pub const CLIENT_IP_PLACEHOLDER: &str = "<client-ip>";

/// The JSON target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl LiteralSyntax for Json {
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

impl TargetLanguage for Json {
    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn name(&self) -> &'static str {
        "JSON"
    }

    fn placeholders(&self) -> Placeholders {
        Placeholders::new()
            .literal(RuntimeField::RayId, RAY_ID_PLACEHOLDER)
            .literal(RuntimeField::ClientIp, CLIENT_IP_PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::SourceGenerator;
    use crate::model::{
        Configuration, CreatorInfo, ErrorCode, MoreInformation, Status,
        StatusPanel,
    };
    use crate::template::HandlebarsRenderer;
    use crate::CodeGenerator;
    use std::sync::Arc;

    fn generator() -> SourceGenerator<Json> {
        SourceGenerator::new(Json, Arc::new(HandlebarsRenderer::new().unwrap()))
    }

    fn sample() -> Configuration {
        Configuration {
            title: Some(Some("Catastrophic infrastructure failure".to_string())),
            error_code: Some(Some(ErrorCode::from("500"))),
            browser_status: Some(Some(StatusPanel {
                status_text: Some(Some("Out of Memory".to_string())),
                ..StatusPanel::with_status(Status::Error)
            })),
            what_happened: Some(Some("<p>There is a \"catastrophic\" failure.</p>".to_string())),
            more_information: Some(Some(MoreInformation {
                hidden: Some(Some(false)),
                for_label: Some(Some("no help at all".to_string())),
                ..MoreInformation::default()
            })),
            creator_info: Some(Some(CreatorInfo {
                hidden: Some(Some(true)),
                ..CreatorInfo::default()
            })),
            ..Configuration::default()
        }
    }

    #[test]
    fn test_output_parses_back_to_configuration() {
        let config = sample();
        let output = generator().generate(&config).unwrap();

        let parsed = Configuration::from_json(&output).unwrap();
        let expected = Configuration {
            ray_id: Some(Some(RAY_ID_PLACEHOLDER.to_string())),
            client_ip: Some(Some(CLIENT_IP_PLACEHOLDER.to_string())),
            ..config
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_output_is_the_encoded_literal() {
        let generator = generator();
        let config = sample();
        let output = generator.generate(&config).unwrap();
        assert_eq!(output, format!("{}\n", generator.encode(&config).unwrap()));
    }

    #[test]
    fn test_two_space_indentation() {
        let output = generator().generate(&sample()).unwrap();
        assert!(output.starts_with("{\n  \"title\": "));
        assert!(output.contains("\n  \"browser_status\": {\n    \"status\": \"error\",\n    \"status_text\": \"Out of Memory\"\n  },"));
        assert!(output.contains("\"hidden\": false"));
        assert!(output.contains("\"hidden\": true"));
        assert!(output.contains("\"ray_id\": \"<ray-id>\""));
    }

    #[test]
    fn test_null_on_known_fields_round_trips() {
        let config = Configuration::from_json(
            r#"{"title": null, "more_information": {"hidden": null, "text": "x"}}"#,
        )
        .unwrap();
        let output = generator().generate(&config).unwrap();
        assert!(output.starts_with("{\n  \"title\": null,\n"));
        assert!(output.contains("\"hidden\": null"));

        let parsed = Configuration::from_json(&output).unwrap();
        assert_eq!(parsed.title, Some(None));
        assert_eq!(
            parsed.more_information.flatten().unwrap().hidden,
            Some(None)
        );
    }

    #[test]
    fn test_malformed_error_code_is_kept_in_descriptor() {
        let config = Configuration {
            error_code: Some(Some(ErrorCode::from("lmao"))),
            ..Configuration::default()
        };
        let output = generator().generate(&config).unwrap();
        assert!(output.contains("\"error_code\": \"lmao\""));
    }
}
