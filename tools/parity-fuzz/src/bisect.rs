//! Locating the first diverging command.
//!
//! Given a run of `count` commands whose images differ, bisection searches for
//! the largest prefix that still renders identically. Each probe replays a
//! prefix from a fresh seed on both sides. The search assumes that once the
//! images diverge they stay diverged; a later command painting over an earlier
//! divergence can hide it.

use std::fmt;

use raster_pipe::{Command, RenderError, Style};
use tracing::info;

use crate::compare::Comparison;
use crate::recorder::MismatchRecorder;
use crate::runner::{DualBackendRunner, RunConfig};

// ============================================================================
// BisectionState
// ============================================================================

/// A prefix length to render and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Commands known to match before this probe.
    pub base: usize,
    /// Prefix length to render.
    pub end: usize,
    half: usize,
}

/// Search window over `[0, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectionState {
    base: usize,
    size: usize,
}

impl BisectionState {
    pub fn new(count: usize) -> Self {
        Self { base: 0, size: count }
    }

    /// Largest prefix length known to render identically.
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Narrow the window and return the prefix to probe, or `None` once the
    /// window holds a single command.
    pub fn next_probe(&mut self) -> Option<Probe> {
        let half = self.size / 2;
        if half == 0 {
            return None;
        }
        self.size -= half;
        Some(Probe {
            base: self.base,
            end: self.base + self.size,
            half,
        })
    }

    /// Feed back whether `probe` rendered identically.
    pub fn record(&mut self, probe: Probe, identical: bool) {
        if identical {
            self.base = probe.base + probe.half;
        }
    }
}

/// Run the search with `identical(probe)` telling whether the first
/// `probe.end` commands match. Returns the index of the first diverging
/// command, or the first error `identical` raises.
pub fn bisect<E, F>(count: usize, mut identical: F) -> Result<usize, E>
where
    F: FnMut(Probe) -> Result<bool, E>,
{
    let mut state = BisectionState::new(count);
    while let Some(probe) = state.next_probe() {
        let ok = identical(probe)?;
        state.record(probe, ok);
    }
    Ok(state.base())
}

// ============================================================================
// BisectionLocalizer
// ============================================================================

/// One probe and how it compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRecord {
    pub start: usize,
    pub end: usize,
    pub comparison: Comparison,
}

/// Where a failing run first diverges.
#[derive(Debug, Clone, PartialEq)]
pub struct BisectionReport {
    /// Zero-based index of the first diverging command.
    pub index: usize,
    pub probes: Vec<ProbeRecord>,
    /// The command at `index` and the style it was filled with.
    pub command: Option<Command>,
    pub style: Option<Style>,
    /// Comparison after replaying `index + 1` commands.
    pub replay: Comparison,
}

impl BisectionReport {
    /// The replay reproduced the mismatch.
    pub fn confirmed(&self) -> bool {
        self.replay.is_mismatch()
    }
}

impl fmt::Display for BisectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command #{}", self.index)?;
        if let Some(command) = &self.command {
            write!(f, " {}", command)?;
        }
        if let Some(style) = &self.style {
            write!(f, " with {}", style)?;
        }
        write!(f, ": {}", self.replay)
    }
}

/// Bisects a failing comparison and replays the culprit.
pub struct BisectionLocalizer<'a> {
    runner: &'a mut DualBackendRunner,
    recorder: &'a mut MismatchRecorder,
}

impl<'a> BisectionLocalizer<'a> {
    pub fn new(runner: &'a mut DualBackendRunner, recorder: &'a mut MismatchRecorder) -> Self {
        Self { runner, recorder }
    }

    /// Narrow a mismatch over `count` commands of `config` to one command.
    ///
    /// Probes run with both sides silenced and every probe comparison goes
    /// through the recorder under `prefix`. Side verbosities are restored
    /// afterwards, also on error.
    pub fn localize(
        &mut self,
        prefix: &str,
        config: &RunConfig,
        count: usize,
    ) -> Result<BisectionReport, RenderError> {
        info!("Bisecting to match the problematic command...");
        let previous = self.runner.silence();
        let result = self.search(prefix, config, count);
        self.runner.restore(previous);
        result
    }

    fn search(
        &mut self,
        prefix: &str,
        config: &RunConfig,
        count: usize,
    ) -> Result<BisectionReport, RenderError> {
        let runner = &mut *self.runner;
        let recorder = &mut *self.recorder;
        let mut probes = Vec::new();

        let index = bisect::<RenderError, _>(count, |probe| {
            info!("Verifying range [{} {})", probe.base, probe.end);
            let (a, b) = runner.run(config, probe.end)?;
            let comparison = recorder.check(prefix, a, b);
            probes.push(ProbeRecord {
                start: probe.base,
                end: probe.end,
                comparison,
            });
            Ok(comparison.is_identical())
        })?;
        info!("Mismatch command index: {}", index);

        self.runner.replay(config, index)?;
        let (a, b) = self.runner.images();
        let replay = self.recorder.check(prefix, a, b);
        let last = self.runner.a().last_scenario();

        Ok(BisectionReport {
            index,
            probes,
            command: last.map(|s| s.command.clone()),
            style: last.map(|s| s.style.clone()),
            replay,
        })
    }
}
