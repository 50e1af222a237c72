// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for FaultPage
//!
//! This module provides the command-line interface for the error page export
//! tool. It handles argument parsing and command execution.
//!
//! # Examples
//!
//! Parsing a `generate` command:
//!
//! ```
//! use faultpage::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "faultpage",
//!     "generate",
//!     "page.json",
//!     "--kind",
//!     "py",
//! ]);
//!
//! let generate = matches.subcommand_matches("generate").unwrap();
//! assert_eq!(generate.get_one::<String>("kind").unwrap(), "py");
//! ```

use crate::core::config::{Config, ConfigBuilder};
use crate::export::{Export, Exporter, OutputKind};
use crate::model::Configuration;
use crate::page::fill_params;
use crate::template::HandlebarsRenderer;
use crate::{FaultPageError, Result};
use chrono::Utc;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The current version of FaultPage, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "FAULTPAGE_";

/// Input path meaning "read from standard input".
pub const STDIN_PATH: &str = "-";

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Configuration JSON file, or '-' for standard input")
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("TOML settings file")
        .value_parser(value_parser!(PathBuf))
}

/// Builds and configures the FaultPage command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("faultpage")
        .author("FaultPage Contributors")
        .about("Exports custom error page configurations as JSON, JavaScript or Python source.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose mode (-v, -vv, etc.)")
                .action(ArgAction::Count)
                .global(true)
        )
        .subcommand(
            Command::new("generate")
                .about("Generate source for one output kind")
                .arg(input_arg())
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .help("Output kind (json, javascript/js, python/py)")
                        .value_parser(["json", "javascript", "js", "python", "py"])
                        .ignore_case(true)
                        .default_value("json")
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Write the export into this directory instead of stdout")
                        .value_parser(value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("templates")
                        .short('t')
                        .long("templates")
                        .help("Directory of *.hbs files replacing the built-in wrappers")
                        .value_parser(value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("keep-transient")
                        .long("keep-transient")
                        .help("Keep time, ray_id and client_ip in the output")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("export")
                .about("Write every configured output kind to a directory")
                .arg(input_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output directory")
                        .value_parser(value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("fill")
                .about("Print the render parameters with per-request values filled in")
                .arg(input_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("no-html")
                        .long("no-html")
                        .help("Escape markup in the free-text fields")
                        .action(ArgAction::SetTrue)
                )
        )
        .after_help(
            "\x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0)."
        )
}

/// Executes the subcommand selected in `matches`.
///
/// # Returns
/// * `Result<()>` - Indicates success, or an error if execution fails.
pub fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("generate", sub_matches)) => {
            let input = required_path(sub_matches, "input")?;
            let kind = sub_matches
                .get_one::<String>("kind")
                .map_or(Ok(OutputKind::Json), |k| k.parse::<OutputKind>())?;
            generate(
                input,
                kind,
                sub_matches.get_one::<PathBuf>("output"),
                sub_matches.get_one::<PathBuf>("templates"),
                !sub_matches.get_flag("keep-transient"),
            )
        }
        Some(("export", sub_matches)) => {
            let input = required_path(sub_matches, "input")?;
            let mut builder = settings_builder(sub_matches);
            if let Some(dir) = sub_matches.get_one::<PathBuf>("output") {
                builder = builder
                    .with_override("output_dir", dir.display().to_string());
            }
            export(input, &builder.build()?)
        }
        Some(("fill", sub_matches)) => {
            let input = required_path(sub_matches, "input")?;
            let settings = settings_builder(sub_matches).build()?;
            fill(
                input,
                settings.allow_html && !sub_matches.get_flag("no-html"),
            )
        }
        _ => Err(FaultPageError::internal_error("Unknown command")),
    }
}

/// Settings from `--config` and `FAULTPAGE_*` variables.
fn settings_builder(matches: &ArgMatches) -> ConfigBuilder {
    let builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);
    match matches.get_one::<PathBuf>("config") {
        Some(path) => builder.with_file(path),
        None => builder,
    }
}

fn required_path<'a>(
    matches: &'a ArgMatches,
    name: &str,
) -> Result<&'a PathBuf> {
    matches.get_one::<PathBuf>(name).ok_or_else(|| {
        FaultPageError::internal_error(format!("missing argument '{}'", name))
    })
}

/// Reads the configuration from `path`, or from stdin when `path` is `-`.
pub fn read_configuration(path: &Path) -> Result<Configuration> {
    let text = if path.as_os_str() == STDIN_PATH {
        let mut buffer = String::new();
        _ = io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| FaultPageError::io_error(path.to_path_buf(), e))?;
        buffer
    } else {
        fs::read_to_string(path)
            .map_err(|e| FaultPageError::io_error(path.to_path_buf(), e))?
    };
    debug!("Read {} bytes of configuration from {:?}", text.len(), path);
    Configuration::from_json(&text)
}

fn renderer(template_dir: Option<&PathBuf>) -> Result<HandlebarsRenderer> {
    let renderer = HandlebarsRenderer::new()?;
    match template_dir {
        Some(dir) => renderer.with_template_dir(dir),
        None => Ok(renderer),
    }
}

/// Generates one kind and prints it, or writes it into `output_dir`.
fn generate(
    input: &Path,
    kind: OutputKind,
    output_dir: Option<&PathBuf>,
    template_dir: Option<&PathBuf>,
    strip_transient: bool,
) -> Result<()> {
    info!("Generating {} from {:?}", kind, input);
    let config = read_configuration(input)?;
    let exporter = Exporter::with_renderer(Arc::new(renderer(template_dir)?))
        .strip_transient(strip_transient);
    let export = exporter.export(&config, kind)?;

    match output_dir {
        Some(dir) => print_written(&export, dir),
        None => {
            print!("{}", export.content);
            Ok(())
        }
    }
}

/// Writes every configured kind into the configured output directory.
fn export(input: &Path, settings: &Config) -> Result<()> {
    info!(
        "Exporting {:?} as {:?} into {:?}",
        input, settings.kinds, settings.output_dir
    );
    let config = read_configuration(input)?;
    let exporter = Exporter::with_renderer(Arc::new(renderer(
        settings.template_dir.as_ref(),
    )?))
    .strip_transient(settings.strip_transient);

    for export in exporter.export_all(&config, &settings.kinds)? {
        print_written(&export, &settings.output_dir)?;
    }
    Ok(())
}

fn print_written(export: &Export, dir: &Path) -> Result<()> {
    let path = export.write_to(dir)?;
    println!("{}", path.display());
    Ok(())
}

/// Prints the render parameters for `input` as pretty JSON.
fn fill(input: &Path, allow_html: bool) -> Result<()> {
    let config = read_configuration(input)?;
    let params =
        fill_params(&config, allow_html, Utc::now(), &mut rand::thread_rng());
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn get_matches(args: Vec<&str>) -> ArgMatches {
        build().get_matches_from(args)
    }

    fn write_input(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("page.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_generate_command() {
        let matches = get_matches(vec![
            "faultpage",
            "generate",
            "page.json",
            "--kind",
            "javascript",
            "--output",
            "out",
        ]);
        let generate_cmd = matches.subcommand_matches("generate").unwrap();

        assert_eq!(
            generate_cmd.get_one::<PathBuf>("input").unwrap(),
            &PathBuf::from("page.json")
        );
        assert_eq!(
            generate_cmd.get_one::<String>("kind").unwrap(),
            "javascript"
        );
        assert!(!generate_cmd.get_flag("keep-transient"));
    }

    #[test]
    fn test_generate_kind_defaults_to_json() {
        let matches = get_matches(vec!["faultpage", "generate", "-"]);
        let generate_cmd = matches.subcommand_matches("generate").unwrap();
        assert_eq!(generate_cmd.get_one::<String>("kind").unwrap(), "json");
    }

    #[test]
    fn test_unknown_kind_is_rejected_by_parser() {
        let result = build().try_get_matches_from(vec![
            "faultpage",
            "generate",
            "page.json",
            "--kind",
            "ruby",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_is_case_insensitive() {
        for kind in ["PY", "Python", "JS", "Json"] {
            let result = build().try_get_matches_from(vec![
                "faultpage",
                "generate",
                "page.json",
                "--kind",
                kind,
            ]);
            assert!(result.is_ok(), "{kind}");
        }
    }

    #[test]
    fn test_fill_command() {
        let matches =
            get_matches(vec!["faultpage", "-v", "fill", "-", "--no-html"]);
        assert_eq!(matches.get_count("verbose"), 1);
        let fill_cmd = matches.subcommand_matches("fill").unwrap();
        assert!(fill_cmd.get_flag("no-html"));
    }

    #[test]
    fn test_run_generate_writes_export() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(temp_dir.path(), r#"{"title": "I'm a teapot", "error_code": 418}"#);
        let out_dir = temp_dir.path().join("out");
        let matches = get_matches(vec![
            "faultpage",
            "generate",
            input.to_str().unwrap(),
            "--kind",
            "py",
            "--output",
            out_dir.to_str().unwrap(),
        ]);

        run(&matches).unwrap();
        let written =
            fs::read_to_string(out_dir.join("i_m_a_teapot_example.py"))
                .unwrap();
        assert!(written.contains("return render_cf_error_page(params), 418"));
    }

    #[test]
    fn test_run_generate_accepts_upper_case_kind() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(temp_dir.path(), r#"{"title": "Down"}"#);
        let out_dir = temp_dir.path().join("out");
        let matches = get_matches(vec![
            "faultpage",
            "generate",
            input.to_str().unwrap(),
            "--kind",
            "PY",
            "--output",
            out_dir.to_str().unwrap(),
        ]);

        run(&matches).unwrap();
        assert!(out_dir.join("down_example.py").exists());
    }

    #[test]
    fn test_run_export_writes_configured_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(temp_dir.path(), r#"{"title": "Down"}"#);
        let settings = temp_dir.path().join("faultpage.toml");
        let out_dir = temp_dir.path().join("exports");
        fs::write(
            &settings,
            format!(
                "output_dir = '{}'\nkinds = ['json', 'js']\n",
                out_dir.display()
            ),
        )
        .unwrap();
        let matches = get_matches(vec![
            "faultpage",
            "export",
            input.to_str().unwrap(),
            "--config",
            settings.to_str().unwrap(),
        ]);

        run(&matches).unwrap();
        assert!(out_dir.join("down.json").exists());
        assert!(out_dir.join("down-example.js").exists());
        assert!(!out_dir.join("down_example.py").exists());
    }

    #[test]
    fn test_read_configuration_reports_missing_file() {
        let err = read_configuration(Path::new("no/such/page.json"))
            .unwrap_err();
        assert!(matches!(err, FaultPageError::IOError { .. }));
    }

    #[test]
    fn test_read_configuration_rejects_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(temp_dir.path(), "{ not json");
        assert!(read_configuration(&input).is_err());
    }
}
