use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::errors::BestOfError;
use crate::runner::RunConfig;
use crate::types::{OutputFormat, TimeUnit};

pub const DEFAULT_RUNS: usize = 10;
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "BEST_OF_CONFIG";

/// Defaults read from `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub runs: Option<usize>,
    pub concurrency: Option<usize>,
    pub unit: Option<TimeUnit>,
    pub percentiles: Option<bool>,
    pub progress: Option<bool>,
    pub quiet: Option<bool>,
    pub color: Option<bool>,
    /// Humantime string such as `"250ms"`.
    pub wait: Option<String>,
}

/// Where the config file lives: `$BEST_OF_CONFIG`, else the platform config dir.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("best-of").join("config.toml"))
}

/// Load the config file at `path`. A missing file yields the empty config.
pub fn load(path: &Path) -> Result<FileConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(FileConfig::default());
        }
        Err(source) => {
            return Err(BestOfError::ConfigReadError {
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
    };

    tracing::debug!(path = %path.display(), "loading config file");
    parse(&contents, path)
}

pub fn parse(contents: &str, path: &Path) -> Result<FileConfig> {
    toml::from_str(contents).map_err(|err: toml::de::Error| {
        BestOfError::ConfigParseError {
            path: path.to_path_buf(),
            detail: err.message().to_string(),
        }
        .into()
    })
}

/// Values given on the command line. `None`/`false` defers to the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub runs: Option<usize>,
    pub concurrency: Option<usize>,
    pub unit: Option<TimeUnit>,
    pub wait: Option<Duration>,
    pub quiet: bool,
    pub percentiles: bool,
    pub progress: bool,
    pub no_color: bool,
    pub json: bool,
    pub csv: bool,
}

/// Everything a session needs, merged and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub run: RunConfig,
    pub unit: TimeUnit,
    pub format: OutputFormat,
    pub percentiles: bool,
    pub progress: bool,
    pub color: bool,
}

impl Settings {
    /// Merge command-line values over the config file over built-in defaults.
    pub fn resolve(
        program: String,
        args: Vec<String>,
        cli: &Overrides,
        file: &FileConfig,
    ) -> Result<Settings> {
        let wait = match (cli.wait, &file.wait) {
            (Some(wait), _) => wait,
            (None, Some(value)) => {
                humantime::parse_duration(value).map_err(|err| BestOfError::InvalidWait {
                    value: value.clone(),
                    detail: err.to_string(),
                })?
            }
            (None, None) => Duration::ZERO,
        };

        let format = if cli.json {
            OutputFormat::Json
        } else if cli.csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Text
        };

        let run = RunConfig {
            program,
            args,
            runs: cli.runs.or(file.runs).unwrap_or(DEFAULT_RUNS),
            concurrency: cli
                .concurrency
                .or(file.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            quiet: cli.quiet || file.quiet.unwrap_or(false),
            wait,
        };
        run.validate()?;

        Ok(Settings {
            run,
            unit: cli.unit.or(file.unit).unwrap_or_default(),
            format,
            percentiles: cli.percentiles || file.percentiles.unwrap_or(false),
            progress: cli.progress || file.progress.unwrap_or(false),
            color: !cli.no_color && file.color.unwrap_or(true),
        })
    }
}
