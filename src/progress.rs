//! Trial progress bar.
//!
//! A 50-cell bar (2% per cell) redrawn on stderr as trials complete. Drawing
//! is delegated to indicatif, which stays silent when stderr is not a
//! terminal.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Number of cells in the bar; each cell stands for 2%.
pub const BAR_WIDTH: usize = 50;

/// High enough that every trial completion gets its own redraw.
const REFRESH_HZ: u8 = u8::MAX;

/// Bar layout: `[=====     ] 50%`, or a green block fill when styled.
pub fn bar_style(styled: bool) -> Result<ProgressStyle> {
    let style = if styled {
        ProgressStyle::with_template("[{bar:50.green}] {percent:.yellow}%")?
            .progress_chars("\u{2588} ")
    } else {
        ProgressStyle::with_template("[{bar:50}] {percent}%")?.progress_chars("= ")
    };
    Ok(style)
}

/// Completion counter shared by reference across trial threads.
pub struct TrialProgress {
    bar: ProgressBar,
}

impl TrialProgress {
    /// Create a bar on stderr and draw it at 0%.
    pub fn new(total: usize, styled: bool) -> Result<Self> {
        Self::with_target(total, ProgressDrawTarget::stderr_with_hz(REFRESH_HZ), styled)
    }

    pub fn with_target(total: usize, target: ProgressDrawTarget, styled: bool) -> Result<Self> {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        bar.set_style(bar_style(styled)?);
        bar.tick();
        Ok(TrialProgress { bar })
    }

    /// Record one more completed trial.
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Leave the bar at its final state on its own line.
    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn completed(&self) -> u64 {
        self.bar.position()
    }
}
