//! Driving renderers with generated scenarios.
//!
//! A [`ContextFuzzer`] is one side of a comparison: a renderer, the
//! generator feeding it and a second random stream deciding when to flush
//! early. A [`DualBackendRunner`] runs two sides through the same
//! [`RunConfig`] so their images can be compared.

use std::fmt;

use raster_pipe::{Image, RenderError, Renderer};
use tracing::info;

use crate::compare::{self, Comparison};
use crate::generator::{Scenario, ScenarioGenerator};
use crate::options::{FuzzerCommand, FuzzerStyle};
use crate::random::RandomStream;

/// Seed of the stream deciding flush points when flush-sync is enabled.
pub const FLUSH_SYNC_SEED: u64 = 0xA29C_F911_A3B7_29AF;

/// A draw from the flush-sync stream above this flushes synchronously.
pub const FLUSH_SYNC_THRESHOLD: u32 = 0xF000_0000;

/// How much a side logs. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Every submitted command.
    Debug,
    /// Start of each run.
    Info,
    Silent,
}

/// Parameters of one comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub seed: u64,
    pub command: FuzzerCommand,
    pub style: FuzzerStyle,
    pub flush_sync: bool,
}

// ============================================================================
// ContextFuzzer
// ============================================================================

/// One renderer plus the random streams that drive it.
pub struct ContextFuzzer {
    label: &'static str,
    renderer: Box<dyn Renderer>,
    generator: ScenarioGenerator,
    sync: RandomStream,
    verbosity: Verbosity,
    last: Option<Scenario>,
}

impl ContextFuzzer {
    /// `label` prefixes every log line of this side.
    pub fn new(label: &'static str, renderer: Box<dyn Renderer>, verbosity: Verbosity) -> Self {
        let (width, height) = renderer.image().size();
        Self {
            label,
            renderer,
            generator: ScenarioGenerator::new(width, height),
            sync: RandomStream::new(FLUSH_SYNC_SEED),
            verbosity,
            last: None,
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Returns the previous verbosity.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) -> Verbosity {
        std::mem::replace(&mut self.verbosity, verbosity)
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn image(&self) -> &Image {
        self.renderer.image()
    }

    /// The most recently submitted scenario.
    pub fn last_scenario(&self) -> Option<&Scenario> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.renderer.clear();
        self.last = None;
    }

    /// Restart the geometry stream for `config`.
    pub fn seed(&mut self, config: &RunConfig) {
        self.generator.configure(config.command, config.style);
        self.generator.seed(config.seed);
    }

    /// Submit the next `count` scenarios and flush.
    ///
    /// The flush-sync stream restarts on every call; the geometry stream
    /// continues from wherever the previous call left it.
    pub fn fuzz(&mut self, config: &RunConfig, count: usize) -> Result<(), RenderError> {
        self.info(format_args!("Running '{}'", config.command));
        self.sync.reset(FLUSH_SYNC_SEED);

        for _ in 0..count {
            let scenario = self.generator.next_scenario();
            if let Some(quality) = scenario.category.gradient_quality() {
                self.renderer.set_gradient_quality(quality);
            }
            self.debug(format_args!("{} {}", scenario.command, scenario.style));
            self.renderer.submit(&scenario.command, &scenario.style)?;
            self.last = Some(scenario);

            if config.flush_sync && self.sync.next_u32() > FLUSH_SYNC_THRESHOLD {
                self.renderer.flush()?;
            }
        }

        self.renderer.flush()
    }

    /// Clear, reseed and render the first `count` scenarios of `config`.
    pub fn run(&mut self, config: &RunConfig, count: usize) -> Result<(), RenderError> {
        self.clear();
        self.seed(config);
        self.fuzz(config, count)
    }

    // Lines are emitted at info level so a side switched to `Debug` shows its
    // commands under the default log filter.
    fn debug(&self, args: fmt::Arguments<'_>) {
        if self.verbosity <= Verbosity::Debug {
            info!("[{}] {}", self.label, args);
        }
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        if self.verbosity <= Verbosity::Info {
            info!("[{}] {}", self.label, args);
        }
    }
}

impl fmt::Debug for ContextFuzzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFuzzer")
            .field("label", &self.label)
            .field("renderer", &self.renderer.name())
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DualBackendRunner
// ============================================================================

/// Two sides driven through identical scenarios.
#[derive(Debug)]
pub struct DualBackendRunner {
    a: ContextFuzzer,
    b: ContextFuzzer,
}

impl DualBackendRunner {
    pub fn new(a: ContextFuzzer, b: ContextFuzzer) -> Self {
        Self { a, b }
    }

    pub fn a(&self) -> &ContextFuzzer {
        &self.a
    }

    pub fn b(&self) -> &ContextFuzzer {
        &self.b
    }

    pub fn images(&self) -> (&Image, &Image) {
        (self.a.image(), self.b.image())
    }

    /// Render the first `count` scenarios of `config` on both sides, A first.
    pub fn run(&mut self, config: &RunConfig, count: usize) -> Result<(&Image, &Image), RenderError> {
        self.a.run(config, count)?;
        self.b.run(config, count)?;
        Ok(self.images())
    }

    pub fn compare(&self) -> Comparison {
        compare::compare(self.a.image(), self.b.image())
    }

    /// Silence both sides, returning their previous verbosities.
    pub fn silence(&mut self) -> (Verbosity, Verbosity) {
        (
            self.a.set_verbosity(Verbosity::Silent),
            self.b.set_verbosity(Verbosity::Silent),
        )
    }

    pub fn restore(&mut self, previous: (Verbosity, Verbosity)) {
        self.a.set_verbosity(previous.0);
        self.b.set_verbosity(previous.1);
    }

    /// Render `base` scenarios silently, then one more with every command
    /// logged. Verbosities are left silent afterwards.
    pub fn replay(&mut self, config: &RunConfig, base: usize) -> Result<(), RenderError> {
        for side in [&mut self.a, &mut self.b] {
            side.set_verbosity(Verbosity::Silent);
            side.run(config, base)?;
            side.set_verbosity(Verbosity::Debug);
            side.fuzz(config, 1)?;
            side.set_verbosity(Verbosity::Silent);
        }
        Ok(())
    }
}
