//! CLI parsing and orchestration. Validates args, downloads the episode range, writes the
//! combined HTML file. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::document::{output_file_name, render_novel, write_document, DocumentError};
use crate::model::EpisodeRange;
use crate::scraper::{download_range, DownloadError, DownloadOptions, PoliteClient, NAROU_BASE};
use clap::Parser;
use log::info;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Download(#[from] DownloadError),

    #[error("{0}")]
    Document(#[from] DocumentError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Download(_) => 1,
            CliRunError::Document(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "naroudl", version)]
#[command(about = "Download a range of episodes from ncode.syosetu.com and combine them into one HTML file")]
#[command(
    after_help = "Example: naroudl n9669bk 1 10\n\nConfig file keys (output_dir, base_url, request_delay_secs, timeout_secs, retry_count) are read from ./naroudl.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Novel code as it appears in the URL, e.g. n9669bk.
    pub code: String,

    /// First episode to download (1-based).
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub start: u32,

    /// Last episode to download (inclusive).
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub end: u32,

    /// Directory to write {code}-{start}-{end}.html into. Default: current directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Suppress progress output (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and verbose error chain.
    #[arg(long)]
    pub verbose: bool,
}

/// Novel codes end up in a URL path segment and a file name.
fn validate_code(code: &str) -> Result<(), CliRunError> {
    if code.is_empty() || code.contains(['/', '\\']) || code.chars().any(char::is_whitespace) {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid novel code: '{}'. Expected the code from the novel URL, e.g. n9669bk.",
            code
        )));
    }
    Ok(())
}

fn validate_range(start: u32, end: u32) -> Result<EpisodeRange, CliRunError> {
    EpisodeRange::new(start, end).ok_or_else(|| {
        CliRunError::InvalidInput(format!(
            "Start episode ({}) must be less than or equal to end episode ({}).",
            start, end
        ))
    })
}

fn validate_output_dir(dir: &Path) -> Result<(), CliRunError> {
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(CliRunError::InvalidInput(format!(
            "Cannot write output: {}: directory does not exist.",
            dir.display()
        )));
    }
    Ok(())
}

/// Entry point for the CLI. Loads the optional config file, then runs.
pub fn run(args: &Args) -> Result<PathBuf, CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    run_with_config(args, config.as_ref())
}

/// Validate, download, assemble and write. Returns the path written.
///
/// Nothing is written unless every episode was fetched.
pub fn run_with_config(args: &Args, config: Option<&Config>) -> Result<PathBuf, CliRunError> {
    validate_code(&args.code)?;
    let range = validate_range(args.start, args.end)?;

    let output_dir: PathBuf = args
        .output_dir
        .clone()
        .or_else(|| config.and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    validate_output_dir(&output_dir)?;

    let base_url = config
        .and_then(|c| c.base_url.clone())
        .unwrap_or_else(|| NAROU_BASE.to_string());

    let mut builder = PoliteClient::builder();
    if let Some(secs) = config.and_then(|c| c.request_delay_secs) {
        builder = builder.delay_secs(secs);
    }
    if let Some(secs) = config.and_then(|c| c.timeout_secs) {
        builder = builder.timeout_secs(secs);
    }
    if let Some(n) = config.and_then(|c| c.retry_count) {
        builder = builder.retry_count(n);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    info!(
        "Downloading novel {} from episode {} to {}",
        args.code,
        range.start(),
        range.end()
    );

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: u32, total: u32| {
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n.saturating_sub(1) as u64);
        pb.set_message(format!("Downloading episode {}/{}", n, total));
    };
    let progress: Option<&dyn Fn(u32, u32)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = DownloadOptions {
        base_url: &base_url,
        progress,
    };
    let result = download_range(&mut client, &args.code, range, &options);

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
    let novel = result?;

    info!("Combining {} episodes", novel.fragments.len());
    let html = render_novel(&novel);
    let output_path = output_dir.join(output_file_name(&novel.code, range));
    write_document(&output_path, &html)?;

    info!("Successfully saved to {}", output_path.display());
    info!("Downloaded {} episodes", range.len());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::FetchError;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("naroudl").chain(args.iter().copied()))
    }

    #[test]
    fn parses_positionals_and_flags() {
        let args = parse(&["n9669bk", "1", "10", "-q", "-o", "out"]).unwrap();
        assert_eq!(args.code, "n9669bk");
        assert_eq!(args.start, 1);
        assert_eq!(args.end, 10);
        assert!(args.quiet);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn rejects_missing_and_extra_positionals() {
        assert!(parse(&["n9669bk", "1"]).is_err());
        assert!(parse(&["n9669bk", "1", "2", "3"]).is_err());
    }

    #[test]
    fn rejects_non_integer_and_zero_episodes() {
        assert!(parse(&["n9669bk", "one", "2"]).is_err());
        assert!(parse(&["n9669bk", "1", "2.5"]).is_err());
        assert!(parse(&["n9669bk", "0", "2"]).is_err());
        assert!(parse(&["n9669bk", "-1", "2"]).is_err());
    }

    #[test]
    fn validate_range_rejects_start_after_end() {
        let err = validate_range(5, 2).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("less than or equal"));
        assert_eq!(validate_range(2, 2).unwrap().len(), 1);
    }

    #[test]
    fn reversed_range_fails_before_any_request() {
        let args = parse(&["n9669bk", "3", "1", "-q"]).unwrap();
        let config = Config {
            base_url: Some("http://127.0.0.1:9".to_string()),
            request_delay_secs: Some(0),
            ..Config::default()
        };
        assert!(matches!(
            run_with_config(&args, Some(&config)),
            Err(CliRunError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_code_rejects_path_like_codes() {
        assert!(validate_code("n9669bk").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("../etc").is_err());
        assert!(validate_code("n96 69").is_err());
    }

    #[test]
    fn validate_output_dir_missing() {
        let result = validate_output_dir(Path::new("/nonexistent_dir_naroudl_xyz"));
        match result {
            Err(CliRunError::InvalidInput(msg)) => assert!(msg.contains("does not exist")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(validate_output_dir(&std::env::temp_dir()).is_ok());
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        let download = DownloadError {
            episode: 2,
            url: "https://ncode.syosetu.com/n1a/2/".into(),
            source: FetchError::HttpStatus {
                status: 403,
                url: "https://ncode.syosetu.com/n1a/2/".into(),
            },
        };
        assert_eq!(CliRunError::Download(download).exit_code(), 1);
        let io = DocumentError::Io {
            path: PathBuf::from("x.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(CliRunError::Document(io).exit_code(), 3);
    }
}
