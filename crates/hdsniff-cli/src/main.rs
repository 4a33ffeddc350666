use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use hdsniff_core::{DecodeOptions, RecoveryMode, Report};
use log::{LevelFilter, debug};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HDSNIFF_BUILD_COMMIT"),
    " ",
    env!("HDSNIFF_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "hdsniff")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for Hitec D-series servo programming traffic.",
    long_about = None,
    after_help = "Examples:\n  hdsniff decode capture.bin\n  hdsniff decode capture.bin --json --pretty -o report.json\n  hdsniff decode 'dumps/*.bin' --resync --summary"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a raw UART capture into register reads and writes.
    #[command(alias = "parse")]
    Decode {
        /// Path to a raw binary capture (a glob matching one file is accepted)
        input: PathBuf,

        /// Write output to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Emit the JSON report instead of text lines
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,

        /// After a framing error, skip ahead to the next command marker
        #[arg(long)]
        resync: bool,

        /// Print only error events
        #[arg(long, conflicts_with_all = ["json", "no_errors"])]
        errors_only: bool,

        /// Omit error events from text output
        #[arg(long, conflicts_with = "json")]
        no_errors: bool,

        /// Print a one-line summary to stderr
        #[arg(long)]
        summary: bool,

        /// Exit with a non-zero code on framing errors or bad checksums
        #[arg(long)]
        strict: bool,

        /// Suppress non-error output on stderr
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Debug)]
struct DecodeArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    pretty: bool,
    resync: bool,
    errors_only: bool,
    no_errors: bool,
    summary: bool,
    strict: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            json,
            pretty,
            resync,
            errors_only,
            no_errors,
            summary,
            strict,
            quiet,
        } => {
            init_logging(cli.verbose, quiet);
            cmd_decode(DecodeArgs {
                input,
                output,
                json,
                pretty,
                resync,
                errors_only,
                no_errors,
                summary,
                strict,
                quiet,
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Fails only when a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    if let Some(output) = args.output.as_ref() {
        ensure_distinct_output(&resolved_input, output)?;
    }

    let options = DecodeOptions {
        recovery: if args.resync {
            RecoveryMode::Resync
        } else {
            RecoveryMode::Local
        },
    };
    debug!(
        "decoding {} with {} recovery",
        resolved_input.display(),
        options.recovery.as_str()
    );
    let mut rep = hdsniff_core::decode_capture_file(&resolved_input, options)
        .context("capture decoding failed")?;
    rep.generated_at = now_rfc3339();

    let rendered = if args.json {
        serialize_report(&rep, args.pretty)?
    } else {
        render_lines(&rep, args.errors_only, args.no_errors)
    };

    match args.output.as_ref() {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
        Some(output) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(output, &rendered)
                .with_context(|| format!("Failed to write output: {}", output.display()))?;
            if !args.quiet {
                eprintln!("OK: output written -> {}", output.display());
            }
        }
    }

    if args.summary && !args.quiet {
        eprintln!("{}", summary_line(&rep));
    }
    if args.strict && !rep.summary.is_clean() {
        return Err(CliError::new(
            format!(
                "capture has {} framing errors and {} invalid checksums",
                rep.summary.errors, rep.summary.invalid_checksums
            ),
            Some("use --errors-only to inspect".to_string()),
        ));
    }
    Ok(())
}

fn render_lines(rep: &Report, errors_only: bool, no_errors: bool) -> String {
    let mut text = String::new();
    for event in &rep.events {
        let is_error = event.kind == "error";
        if (errors_only && !is_error) || (no_errors && is_error) {
            continue;
        }
        text.push_str(&event.line);
        text.push('\n');
    }
    text
}

fn summary_line(rep: &Report) -> String {
    let s = &rep.summary;
    let mut line = format!(
        "{} bytes: {} reads, {} writes, {} errors, {} invalid checksums, {} noise bytes",
        s.bytes_total, s.reads, s.writes, s.errors, s.invalid_checksums, s.noise_bytes
    );
    if let Some(resync) = s.resync_bytes {
        line.push_str(&format!(", {} resync bytes", resync));
    }
    if let Some(truncated) = s.truncated {
        line.push_str(&format!(", truncated frame at offset {}", truncated.offset));
    }
    line
}

fn serialize_report(rep: &Report, pretty: bool) -> Result<String, CliError> {
    let mut json = if pretty {
        serde_json::to_string_pretty(rep)
    } else {
        serde_json::to_string(rep)
    }
    .context("JSON serialization failed")?;
    json.push('\n');
    Ok(json)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| hdsniff_core::DEFAULT_GENERATED_AT.to_string())
}

fn ensure_distinct_output(input: &PathBuf, output: &PathBuf) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = output
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing parent directory cannot contain the input.
    let Ok(Some(output_dir)) = output_dir else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw binary UART capture".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a raw binary UART capture".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single capture file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{is_glob_pattern, render_lines, summary_line};
    use hdsniff_core::{DecodeOptions, decode_bytes};

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("dumps/*.bin"));
        assert!(is_glob_pattern("capture?.bin"));
        assert!(!is_glob_pattern("capture.bin"));
    }

    #[test]
    fn render_filters_errors() {
        let capture = [0x42, 0x96, 0x00, 0x46, 0x02, 0x01, 0x00, 0x49];
        let rep = decode_bytes("memory", &capture, DecodeOptions::default());
        assert_eq!(
            render_lines(&rep, false, false),
            "error in start of command! actual=0x42 expected=0x96\nwrite HD_REG_REBOOT=0x0001=1\n"
        );
        assert_eq!(
            render_lines(&rep, true, false),
            "error in start of command! actual=0x42 expected=0x96\n"
        );
        assert_eq!(
            render_lines(&rep, false, true),
            "write HD_REG_REBOOT=0x0001=1\n"
        );
    }

    #[test]
    fn summary_line_mentions_truncation() {
        let rep = decode_bytes("memory", &[0x96, 0x00], DecodeOptions::default());
        let line = summary_line(&rep);
        assert!(line.starts_with("2 bytes: 0 reads"));
        assert!(line.ends_with("truncated frame at offset 0"));
    }
}
