use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BestOfError {
    #[error("Run count must be at least 1")]
    ZeroRuns,

    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("Unknown output unit '{unit}'. Supported: m, s, ms, ns")]
    UnknownUnit { unit: String },

    #[error("Cannot compute statistics over an empty sample")]
    EmptySample,

    #[error("Percentile {percentile} is outside the range 0\u{2013}100")]
    PercentileOutOfRange { percentile: f64 },

    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParseError { path: PathBuf, detail: String },

    #[error("Invalid wait duration '{value}': {detail}")]
    InvalidWait { value: String, detail: String },

    #[error("Permit pool closed before all trials were scheduled")]
    PermitPoolClosed,
}
