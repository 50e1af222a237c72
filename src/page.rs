// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Render Parameter Preparation
//!
//! The HTML error page itself is rendered elsewhere. Before handing a
//! configuration to that renderer, the per-request gaps are filled in here:
//! a timestamp, a random ray id, a document title for non-numeric codes, and
//! HTML escaping of the free-text fields when the source is not trusted.

use crate::model::{Configuration, Nullable};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Timestamp layout shown under the page heading.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Number of hex characters in a generated ray id.
pub const RAY_ID_LENGTH: usize = 16;

/// Document title used when neither `html_title` nor `title` is set.
pub const DEFAULT_HTML_TITLE: &str = "Internal server error";

/// Returns `length` random lowercase hex characters.
pub fn random_ray_id<R: Rng>(rng: &mut R, length: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    (0..length)
        .map(|_| char::from(HEX[rng.gen_range(0..HEX.len())]))
        .collect()
}

/// Returns a copy of `config` ready for the HTML renderer.
///
/// - a missing, `null` or empty `time` becomes `now` in [`TIME_FORMAT`];
/// - a missing, `null` or empty `ray_id` becomes [`RAY_ID_LENGTH`] random
///   hex characters;
/// - when the error code is not numeric, a missing or `null` `html_title`
///   defaults to the title;
/// - with `allow_html == false`, `what_happened` and `what_can_i_do` are
///   HTML-escaped (absent or `null` text becomes empty).
pub fn fill_params<R: Rng>(
    config: &Configuration,
    allow_html: bool,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Configuration {
    let mut params = config.clone();

    if text(&params.time).map_or(true, str::is_empty) {
        params.time = Some(Some(now.format(TIME_FORMAT).to_string()));
    }
    if text(&params.ray_id).map_or(true, str::is_empty) {
        params.ray_id = Some(Some(random_ray_id(rng, RAY_ID_LENGTH)));
    }
    let numeric = params
        .error_code
        .as_ref()
        .and_then(Option::as_ref)
        .map_or(true, |code| code.is_numeric());
    if !numeric && text(&params.html_title).is_none() {
        let title = text(&params.title)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_HTML_TITLE);
        params.html_title = Some(Some(title.to_string()));
    }
    if !allow_html {
        params.what_happened = Some(Some(escape_html(text(&params.what_happened))));
        params.what_can_i_do = Some(Some(escape_html(text(&params.what_can_i_do))));
    }
    params
}

fn text(field: &Nullable<String>) -> Option<&str> {
    field.as_ref().and_then(Option::as_deref)
}

fn escape_html(text: Option<&str>) -> String {
    handlebars::html_escape(text.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
    }

    fn some(value: &str) -> Nullable<String> {
        Some(Some(value.to_string()))
    }

    #[test]
    fn test_fills_time_and_ray_id() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = fill_params(&Configuration::default(), true, now(), &mut rng);
        assert_eq!(params.time, some("2024-03-09 07:05:01 UTC"));
        let ray_id = params.ray_id.flatten().unwrap();
        assert_eq!(ray_id.len(), RAY_ID_LENGTH);
        assert!(ray_id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_null_is_filled_like_missing() {
        let config = Configuration {
            time: Some(None),
            ray_id: Some(None),
            ..Configuration::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let params = fill_params(&config, true, now(), &mut rng);
        assert_eq!(params.time, some("2024-03-09 07:05:01 UTC"));
        assert_eq!(text(&params.ray_id).map(str::len), Some(RAY_ID_LENGTH));
    }

    #[test]
    fn test_keeps_existing_values() {
        let config = Configuration {
            time: some("yesterday"),
            ray_id: some("0123456789abcdef"),
            ..Configuration::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let params = fill_params(&config, true, now(), &mut rng);
        assert_eq!(params.time, some("yesterday"));
        assert_eq!(params.ray_id, some("0123456789abcdef"));
    }

    #[test]
    fn test_escapes_text_when_html_is_not_allowed() {
        let config = Configuration {
            what_happened: some("<b>Oops</b> & \"more\""),
            ..Configuration::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let params = fill_params(&config, false, now(), &mut rng);
        assert_eq!(
            params.what_happened,
            some("&lt;b&gt;Oops&lt;/b&gt; &amp; &quot;more&quot;")
        );
        assert_eq!(params.what_can_i_do, some(""));

        let trusted = fill_params(&config, true, now(), &mut rng);
        assert_eq!(trusted.what_happened, config.what_happened);
        assert!(trusted.what_can_i_do.is_none());
    }

    #[test]
    fn test_html_title_for_non_numeric_codes() {
        let config = Configuration {
            title: some("The Myth"),
            error_code: Some(Some(ErrorCode::from("lmao"))),
            ..Configuration::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let params = fill_params(&config, true, now(), &mut rng);
        assert_eq!(params.html_title, some("The Myth"));

        let numeric = Configuration {
            error_code: Some(Some(ErrorCode::from("503"))),
            ..config.clone()
        };
        assert!(fill_params(&numeric, true, now(), &mut rng).html_title.is_none());

        let untitled = Configuration {
            title: Some(None),
            ..config
        };
        assert_eq!(
            fill_params(&untitled, true, now(), &mut rng).html_title,
            some(DEFAULT_HTML_TITLE)
        );
    }

    #[test]
    fn test_nan_error_code_gets_html_title() {
        let mut rng = StdRng::seed_from_u64(1);
        for code in ["NaN", "inf"] {
            let config = Configuration {
                title: some("T"),
                error_code: Some(Some(ErrorCode::from(code))),
                ..Configuration::default()
            };
            let params = fill_params(&config, true, now(), &mut rng);
            assert_eq!(params.html_title, some("T"), "{code}");
        }

        let hex = Configuration {
            title: some("T"),
            error_code: Some(Some(ErrorCode::from("0x1f"))),
            ..Configuration::default()
        };
        assert!(fill_params(&hex, true, now(), &mut rng).html_title.is_none());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let config = Configuration::default();
        let mut rng = StdRng::seed_from_u64(3);
        let _ = fill_params(&config, false, now(), &mut rng);
        assert_eq!(config, Configuration::default());
    }
}
