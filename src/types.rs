use std::process::ExitStatus;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::BestOfError;

/// How a single trial ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    Success,
    /// The process ran and exited with a non-zero status.
    ExitFailure(ExitStatus),
    /// The process could not be started at all.
    LaunchFailure(String),
}

impl TrialOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, TrialOutcome::Success)
    }
}

/// One timed execution of the target command.
#[derive(Debug, Clone)]
pub struct Trial {
    pub index: usize,
    pub elapsed: Duration,
    pub outcome: TrialOutcome,
}

impl Trial {
    /// A slot awaiting its run. Overwritten exactly once by the task that owns it.
    pub fn pending(index: usize) -> Self {
        Trial {
            index,
            elapsed: Duration::ZERO,
            outcome: TrialOutcome::Success,
        }
    }
}

/// Every trial of a session, in index order. Failed trials are kept.
#[derive(Debug, Clone)]
pub struct Sample {
    trials: Vec<Trial>,
}

impl Sample {
    pub fn new(trials: Vec<Trial>) -> Self {
        Sample { trials }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.trials.iter().map(|t| t.elapsed).collect()
    }

    pub fn failures(&self) -> usize {
        self.trials.iter().filter(|t| t.outcome.is_failure()).count()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

/// A labeled summary statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: Duration,
}

impl Stat {
    pub fn new(label: &'static str, value: Duration) -> Self {
        Stat { label, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeUnit {
    #[value(name = "m")]
    Minutes,
    #[default]
    #[value(name = "s")]
    Seconds,
    #[value(name = "ms")]
    Milliseconds,
    #[value(name = "ns")]
    Nanoseconds,
}

impl TimeUnit {
    pub fn convert(self, duration: Duration) -> f64 {
        match self {
            TimeUnit::Minutes => duration.as_secs_f64() / 60.0,
            TimeUnit::Seconds => duration.as_secs_f64(),
            TimeUnit::Milliseconds => 1e3 * duration.as_secs_f64(),
            TimeUnit::Nanoseconds => 1e9 * duration.as_secs_f64(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Nanoseconds => "nanoseconds",
        }
    }
}

impl std::str::FromStr for TimeUnit {
    type Err = BestOfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(TimeUnit::Minutes),
            "s" => Ok(TimeUnit::Seconds),
            "ms" => Ok(TimeUnit::Milliseconds),
            "ns" => Ok(TimeUnit::Nanoseconds),
            _ => Err(BestOfError::UnknownUnit {
                unit: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TimeUnit {
    type Error = BestOfError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}
