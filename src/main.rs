use std::io::IsTerminal;
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use best_of::config::{self, FileConfig, Overrides, Settings};
use best_of::display;
use best_of::progress::TrialProgress;
use best_of::runner;
use best_of::stats;
use best_of::types::TimeUnit;

const EXAMPLES: &str = "\
Examples:
  best-of -n 5 -- grep -r \"foo\" .
  best-of -o ms -q -- curl https://example.com
  best-of -p -c 10 --progress -- find . -name \"*.rs\"";

#[derive(Parser)]
#[command(
    name = "best-of",
    version,
    about = "Measure execution time of commands",
    after_help = EXAMPLES
)]
struct Cli {
    /// Number of times to run the command [default: 10]
    #[arg(short = 'n', long = "runs")]
    runs: Option<usize>,

    /// Output unit [default: s]
    #[arg(short = 'o', long = "unit")]
    unit: Option<TimeUnit>,

    /// Suppress output of the command
    #[arg(short, long)]
    quiet: bool,

    /// Number of commands to run in parallel [default: 1]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Print percentile values
    #[arg(short, long)]
    percentiles: bool,

    /// Wait time before each run, e.g. 250ms or 2s
    #[arg(short, long, value_parser = humantime::parse_duration)]
    wait: Option<Duration>,

    /// Show progress bar
    #[arg(long)]
    progress: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Output results in CSV format
    #[arg(long)]
    csv: bool,

    /// Command to benchmark, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            runs: self.runs,
            concurrency: self.concurrency,
            unit: self.unit,
            wait: self.wait,
            quiet: self.quiet,
            percentiles: self.percentiles,
            progress: self.progress,
            no_color: self.no_color,
            json: self.json,
            csv: self.csv,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BEST_OF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some((program, args)) = cli.command.split_first() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let file = match config::config_path() {
        Some(path) => config::load(&path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(program.clone(), args.to_vec(), &cli.overrides(), &file)?;

    if !settings.color {
        owo_colors::set_override(false);
    }

    let progress = if settings.progress {
        let styled = settings.color && std::io::stderr().is_terminal();
        Some(TrialProgress::new(settings.run.runs, styled)?)
    } else {
        None
    };
    let sample = runner::run_trials(&settings.run, progress.as_ref())?;

    let results = stats::summarize(&sample.durations(), settings.percentiles)?;
    print!("{}", display::render(&results, settings.unit, settings.format));

    if let Some(summary) = display::format_failure_summary(sample.failures(), sample.len()) {
        eprintln!("{}", summary);
    }

    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
