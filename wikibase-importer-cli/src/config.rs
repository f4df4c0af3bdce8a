use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};

pub const LOG_FORMAT_ENV: &str = "IMPORT_LOG_FORMAT";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line human readable output
    Pretty,
}

/// Command-line configuration.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikibase-import",
    about = "Import a d:swarm GDM JSON export into a Wikibase instance"
)]
pub struct Config {
    /// GDM JSON file to import
    pub input_path: Option<PathBuf>,

    /// Log output format
    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Json,
        ignore_case = true
    )]
    pub log_format: LogFormat,
}

impl Config {
    /// Parse the process arguments, exiting on usage errors.
    ///
    /// An unusable `IMPORT_LOG_FORMAT` falls back to JSON. The second value is
    /// a warning to log once the subscriber is installed.
    pub fn load() -> (Self, Option<String>) {
        Self::load_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// `args` includes the program name.
    pub fn load_from<I, T>(args: I) -> Result<(Self, Option<String>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let err = match Self::try_parse_from(args.clone()) {
            Ok(config) => return Ok((config, None)),
            Err(e) => e,
        };
        let raw = match std::env::var_os(LOG_FORMAT_ENV) {
            Some(raw) if err.kind() == ErrorKind::InvalidValue => raw,
            _ => return Err(err),
        };

        // Retry without the environment fallback; a bad --log-format still fails.
        let matches = Self::command()
            .mut_arg("log_format", |arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;
        let config = Self::from_arg_matches(&matches)?;

        let warning = format!(
            "ignoring {LOG_FORMAT_ENV}={:?}, expected 'json' or 'pretty'",
            raw.to_string_lossy()
        );
        Ok((config, Some(warning)))
    }
}
