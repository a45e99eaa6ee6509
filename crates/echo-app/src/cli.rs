//! CLI argument definitions for the `echo` harness.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use echo_core::error::{EchoError, Result};

/// Echo - insert report text into a page fixture the way the browser
/// extension would.
#[derive(Parser, Debug)]
#[command(name = "echo", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert text into a page fixture and print the outcome.
    Insert(InsertArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// JSON page fixture to load.
    #[arg(short = 'p', long = "page")]
    pub page: PathBuf,

    /// Report text to insert.
    #[arg(short = 't', long = "text", conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read the report text from a file.
    #[arg(long = "text-file")]
    pub text_file: Option<PathBuf>,

    /// Tab id the request is addressed to.
    #[arg(long = "tab", default_value_t = 1)]
    pub tab: u32,

    /// Start with no content script in the tab, so the first send fails
    /// and the script is injected.
    #[arg(long = "lazy")]
    pub lazy: bool,
}

impl InsertArgs {
    /// The report text, from `--text` or `--text-file`.
    pub fn read_text(&self) -> Result<String> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }
        if let Some(ref path) = self.text_file {
            return Ok(std::fs::read_to_string(path)?);
        }
        Err(EchoError::Config(
            "one of --text or --text-file is required".to_string(),
        ))
    }
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ECHO_CONFIG env var > ~/.echo/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ECHO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the tracing filter directive.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.is_empty() {
                return filter;
            }
        }
        config_level.to_string()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".echo").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".echo").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_insert() {
        let cli = CliArgs::try_parse_from([
            "echo", "insert", "--page", "page.json", "--text", "Nodule 1", "--lazy",
        ])
        .unwrap();

        let Command::Insert(args) = cli.command else {
            panic!("expected insert subcommand");
        };
        assert_eq!(args.page, PathBuf::from("page.json"));
        assert_eq!(args.read_text().unwrap(), "Nodule 1");
        assert_eq!(args.tab, 1);
        assert!(args.lazy);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliArgs::try_parse_from([
            "echo", "config", "--config", "/tmp/echo.toml", "--log-level", "debug",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Config));
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/echo.toml"));
        assert_eq!(cli.resolve_log_filter("info"), "debug");
    }

    #[test]
    fn test_text_and_text_file_conflict() {
        let result = CliArgs::try_parse_from([
            "echo", "insert", "--page", "p.json", "--text", "a", "--text-file", "b.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_text_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Impression: benign").unwrap();

        let args = InsertArgs {
            page: PathBuf::from("p.json"),
            text: None,
            text_file: Some(file.path().to_path_buf()),
            tab: 1,
            lazy: false,
        };
        assert_eq!(args.read_text().unwrap(), "Impression: benign");
    }

    #[test]
    fn test_read_text_requires_a_source() {
        let args = InsertArgs {
            page: PathBuf::from("p.json"),
            text: None,
            text_file: None,
            tab: 1,
            lazy: false,
        };
        assert!(matches!(args.read_text(), Err(EchoError::Config(_))));
    }
}
