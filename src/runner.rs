use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{Receiver, bounded};
use owo_colors::{OwoColorize, Stream};

use crate::errors::BestOfError;
use crate::progress::TrialProgress;
use crate::types::{Sample, Trial, TrialOutcome};

/// What to run and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub program: String,
    pub args: Vec<String>,
    pub runs: usize,
    pub concurrency: usize,
    /// Discard the child's stdout and stderr instead of inheriting them.
    pub quiet: bool,
    /// Sleep before each trial, outside the timed interval.
    pub wait: Duration,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), BestOfError> {
        if self.runs == 0 {
            return Err(BestOfError::ZeroRuns);
        }
        if self.concurrency == 0 {
            return Err(BestOfError::ZeroConcurrency);
        }
        Ok(())
    }
}

/// Run the configured command `runs` times, at most `concurrency` at once.
///
/// Every trial is recorded, including those whose command failed to start or
/// exited non-zero; each failure is also reported on stderr as it happens.
pub fn run_trials(config: &RunConfig, progress: Option<&TrialProgress>) -> Result<Sample> {
    tracing::debug!(
        program = %config.program,
        runs = config.runs,
        concurrency = config.concurrency,
        "starting session"
    );

    let sample = schedule(
        config.runs,
        config.concurrency,
        config.wait,
        progress,
        |_| launch(config),
        |trial| {
            if let Some(notice) = failure_notice(&config.program, &trial.outcome) {
                eprintln!(
                    "{}",
                    notice.if_supports_color(Stream::Stderr, |s| s.red())
                );
            }
        },
    )?;

    tracing::debug!(
        trials = sample.len(),
        failures = sample.failures(),
        "session finished"
    );
    Ok(sample)
}

/// Human-readable notice for a failed trial, `None` on success.
pub fn failure_notice(program: &str, outcome: &TrialOutcome) -> Option<String> {
    match outcome {
        TrialOutcome::Success => None,
        TrialOutcome::ExitFailure(status) => {
            Some(format!("Command {} exited with error: {}", program, status))
        }
        TrialOutcome::LaunchFailure(err) => {
            Some(format!("Failed to run command {}: {}", program, err))
        }
    }
}

fn launch(config: &RunConfig) -> TrialOutcome {
    let mut command = Command::new(&config.program);
    command.args(&config.args).stdin(Stdio::null());
    if config.quiet {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    match command.status() {
        Ok(status) if status.success() => TrialOutcome::Success,
        Ok(status) => TrialOutcome::ExitFailure(status),
        Err(err) => TrialOutcome::LaunchFailure(err.to_string()),
    }
}

/// Releases its concurrency permit when dropped, however the trial ended.
struct Permit<'a>(&'a Receiver<()>);

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let _ = self.0.recv();
    }
}

/// Bounded-parallel trial loop.
///
/// `body` performs one trial and is timed from just after the `wait` sleep
/// until it returns. `finished` sees the recorded trial, outside the timed
/// interval. Each trial runs on its own scoped thread and owns a disjoint
/// slot of the result buffer. The permit channel holds one token per
/// in-flight trial; sending blocks while all tokens are out. No more than
/// `runs` trials can ever be in flight, so the pool is capped there.
pub(crate) fn schedule<F, N>(
    runs: usize,
    concurrency: usize,
    wait: Duration,
    progress: Option<&TrialProgress>,
    body: F,
    finished: N,
) -> Result<Sample>
where
    F: Fn(usize) -> TrialOutcome + Sync,
    N: Fn(&Trial) + Sync,
{
    if runs == 0 {
        return Err(BestOfError::ZeroRuns.into());
    }
    if concurrency == 0 {
        return Err(BestOfError::ZeroConcurrency.into());
    }

    let mut trials: Vec<Trial> = (0..runs).map(Trial::pending).collect();
    let capacity = concurrency.min(runs);
    let (permits, released) = bounded::<()>(capacity);
    let body = &body;
    let finished = &finished;

    thread::scope(|scope| -> Result<(), BestOfError> {
        for slot in trials.iter_mut() {
            permits
                .send(())
                .map_err(|_| BestOfError::PermitPoolClosed)?;
            let released = &released;
            scope.spawn(move || {
                let _permit = Permit(released);
                if !wait.is_zero() {
                    thread::sleep(wait);
                }
                let start = Instant::now();
                let outcome = body(slot.index);
                slot.elapsed = start.elapsed();
                slot.outcome = outcome;
                tracing::debug!(
                    trial = slot.index,
                    elapsed = ?slot.elapsed,
                    failed = slot.outcome.is_failure(),
                    "trial finished"
                );
                finished(slot);
                if let Some(bar) = progress {
                    bar.advance();
                }
            });
        }

        // Join barrier: every permit must come back before the sample is complete.
        for _ in 0..capacity {
            permits
                .send(())
                .map_err(|_| BestOfError::PermitPoolClosed)?;
        }
        Ok(())
    })?;

    if let Some(bar) = progress {
        bar.finish();
    }
    Ok(Sample::new(trials))
}
