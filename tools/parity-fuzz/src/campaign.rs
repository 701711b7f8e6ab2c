//! Running every selected comparison of a fuzzer mode.
//!
//! A campaign expands the options into [`Configuration`]s (one per CPU level
//! in jit mode, one otherwise), builds the renderers of each configuration
//! once, and runs every selected command category through them:
//!
//! - identical images pass
//! - differing images fail and are bisected to the diverging command
//! - images that cannot be compared are counted as inconclusive
//!
//! Simple mode compares nothing; its categories are only counted as rendered.

use raster_pipe::{create_renderer, cpu, PixelFormat, RenderError, Renderer, RendererConfig, SimdLevel};
use thiserror::Error;
use tracing::{error, info};

use crate::bisect::{BisectionLocalizer, BisectionReport};
use crate::compare::Comparison;
use crate::options::{FuzzerCommand, FuzzerMode, FuzzerOptions, SimdSelection};
use crate::recorder::MismatchRecorder;
use crate::runner::{ContextFuzzer, DualBackendRunner, RunConfig, Verbosity};
use crate::store::ImageStore;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("failed to initialize the {side} renderer: {source}")]
    RendererInit {
        side: &'static str,
        #[source]
        source: RenderError,
    },
}

/// How to build one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideSpec {
    /// Log label and artifact suffix.
    pub label: &'static str,
    pub renderer: RendererConfig,
}

/// Builds the renderer of one side at the campaign's canvas size.
pub type RendererFactory =
    Box<dyn Fn(&SideSpec, u32, u32) -> Result<Box<dyn Renderer>, RenderError>>;

/// One set of renderers every selected category runs through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// CPU level name used in log lines and artifact names.
    pub tag: String,
    pub a: SideSpec,
    /// Absent in simple mode, which renders without comparing.
    pub b: Option<SideSpec>,
}

/// Aggregate outcome of a campaign.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignSummary {
    /// Categories rendered without a comparison (simple mode).
    pub rendered: u32,
    pub passed: u32,
    pub failed: u32,
    pub inconclusive: u32,
    /// Categories aborted by a renderer error.
    pub errors: u32,
    pub mismatches: u64,
    pub reports: Vec<BisectionReport>,
}

impl CampaignSummary {
    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.inconclusive + self.errors
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.inconclusive == 0 && self.errors == 0
    }

    /// Process exit code: 0 only if every comparison passed.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl std::fmt::Display for CampaignSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_success() && self.total() == 0 && self.rendered > 0 {
            write!(f, "Fuzzing finished... ({} categories rendered)", self.rendered)
        } else if self.is_success() {
            write!(f, "[PASSED] {} tests passed", self.passed)
        } else {
            write!(
                f,
                "[FAILED] {} tests out of {} failed ({} mismatches, {} inconclusive, {} errors)",
                self.total() - self.passed,
                self.total(),
                self.mismatches,
                self.inconclusive,
                self.errors
            )
        }
    }
}

// ============================================================================
// CampaignController
// ============================================================================

pub struct CampaignController {
    mode: FuzzerMode,
    options: FuzzerOptions,
    factory: RendererFactory,
}

impl CampaignController {
    pub fn new(mode: FuzzerMode, options: FuzzerOptions) -> Self {
        Self {
            mode,
            options,
            factory: Box::new(default_renderer),
        }
    }

    /// Build renderers through `factory` instead of [`create_renderer`].
    pub fn with_renderer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&SideSpec, u32, u32) -> Result<Box<dyn Renderer>, RenderError> + 'static,
    {
        self.factory = Box::new(factory);
        self
    }

    pub fn mode(&self) -> FuzzerMode {
        self.mode
    }

    pub fn options(&self) -> &FuzzerOptions {
        &self.options
    }

    /// Renderer configurations of this campaign, in run order.
    pub fn configurations(&self) -> Vec<Configuration> {
        let opts = &self.options;
        match self.mode {
            FuzzerMode::Simple => vec![Configuration {
                tag: "native".into(),
                a: SideSpec {
                    label: "simple",
                    renderer: RendererConfig::threaded(opts.thread_count),
                },
                b: None,
            }],
            FuzzerMode::Mt => vec![Configuration {
                tag: "native".into(),
                a: SideSpec {
                    label: "st",
                    renderer: RendererConfig::pipeline(None),
                },
                b: Some(SideSpec {
                    label: "mt",
                    renderer: RendererConfig::threaded(opts.thread_count),
                }),
            }],
            FuzzerMode::Jit => {
                let levels: Vec<Option<SimdLevel>> = match opts.simd {
                    SimdSelection::Native => vec![None],
                    SimdSelection::Level(level) => vec![Some(level)],
                    SimdSelection::All => cpu::supported_levels()
                        .into_iter()
                        .map(Some)
                        .chain(std::iter::once(None))
                        .collect(),
                };
                levels.into_iter().map(jit_configuration).collect()
            }
        }
    }

    /// Run every configuration. Renderer construction failures abort the
    /// campaign; everything else is tallied in the summary.
    pub fn run(&self) -> Result<CampaignSummary, CampaignError> {
        let mut summary = CampaignSummary::default();
        for configuration in self.configurations() {
            match &configuration.b {
                None => self.run_simple(&configuration, &mut summary)?,
                Some(b) => self.run_pair(&configuration, b, &mut summary)?,
            }
        }
        info!("{}", summary);
        Ok(summary)
    }

    fn create_side(&self, side: &SideSpec, verbosity: Verbosity) -> Result<ContextFuzzer, CampaignError> {
        let renderer = (self.factory)(side, self.options.width, self.options.height).map_err(|source| CampaignError::RendererInit {
            side: side.label,
            source,
        })?;
        Ok(ContextFuzzer::new(side.label, renderer, verbosity))
    }

    fn run_config(&self, command: FuzzerCommand) -> RunConfig {
        RunConfig {
            seed: self.options.seed,
            command,
            style: self.options.style,
            flush_sync: self.options.flush_sync,
        }
    }

    fn store(&self) -> Option<ImageStore> {
        self.options
            .store_images
            .then(|| ImageStore::new(self.options.output_dir.clone()))
    }

    fn primary_verbosity(&self) -> Verbosity {
        if self.options.verbose {
            Verbosity::Debug
        } else {
            Verbosity::Info
        }
    }

    // ------------------------------------------------------------------------
    // Simple mode
    // ------------------------------------------------------------------------

    fn run_simple(
        &self,
        configuration: &Configuration,
        summary: &mut CampaignSummary,
    ) -> Result<(), CampaignError> {
        let mut side = self.create_side(&configuration.a, self.primary_verbosity())?;
        let store = self.store();
        let count = self.options.count as usize;

        for command in self.options.command.categories() {
            let config = self.run_config(command);
            if let Err(e) = side.run(&config, count) {
                error!("{}: renderer failed: {}", command, e);
                summary.errors += 1;
                continue;
            }
            summary.rendered += 1;
            if let Some(store) = &store {
                let name = format!("fuzz-simple-{}", command);
                match store.save(&name, side.image()) {
                    Ok(path) => info!("Storing: {}", path.display()),
                    Err(e) => error!("{}", e),
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Comparing modes
    // ------------------------------------------------------------------------

    fn run_pair(
        &self,
        configuration: &Configuration,
        b: &SideSpec,
        summary: &mut CampaignSummary,
    ) -> Result<(), CampaignError> {
        let a = self.create_side(&configuration.a, self.primary_verbosity())?;
        let b_side = self.create_side(b, Verbosity::Info)?;
        let mut runner = DualBackendRunner::new(a, b_side);
        let mut recorder = MismatchRecorder::new(self.store(), [configuration.a.label, b.label]);
        let count = self.options.count as usize;

        for command in self.options.command.categories() {
            let config = self.run_config(command);
            let prefix = format!("{}-{}-{}", command, self.options.style, configuration.tag);
            info!("Testing [{} | {} | {}]:", command, self.options.style, configuration.tag);

            let comparison = match runner.run(&config, count) {
                Ok((img_a, img_b)) => recorder.check(&prefix, img_a, img_b),
                Err(e) => {
                    error!("{}: renderer failed: {}", prefix, e);
                    summary.errors += 1;
                    continue;
                }
            };

            match comparison {
                Comparison::Identical => summary.passed += 1,
                Comparison::Inconclusive { .. } => summary.inconclusive += 1,
                Comparison::Mismatch(_) => {
                    summary.failed += 1;
                    let mut localizer = BisectionLocalizer::new(&mut runner, &mut recorder);
                    match localizer.localize(&prefix, &config, count) {
                        Ok(report) => {
                            info!("Failing {}", report);
                            summary.reports.push(report);
                        }
                        Err(e) => {
                            error!("{}: renderer failed while bisecting: {}", prefix, e);
                            summary.errors += 1;
                        }
                    }
                }
            }
        }

        if recorder.mismatches() > 0 {
            info!("Found {} mismatches!", recorder.mismatches());
        }
        summary.mismatches += recorder.mismatches();
        Ok(())
    }
}

fn default_renderer(side: &SideSpec, width: u32, height: u32) -> Result<Box<dyn Renderer>, RenderError> {
    create_renderer(width, height, PixelFormat::Prgb32, &side.renderer)
}

/// Reference kernel against pipelines for `level`, or the detected level with
/// the shared cache when `level` is `None`.
fn jit_configuration(level: Option<SimdLevel>) -> Configuration {
    let pipeline = match level {
        Some(level) => RendererConfig {
            cpu_features: Some(level),
            isolated_runtime: true,
            ..RendererConfig::default()
        },
        None => RendererConfig::pipeline(None),
    };
    Configuration {
        tag: level.map_or("native", SimdLevel::name).to_string(),
        a: SideSpec {
            label: "ref",
            renderer: RendererConfig::reference(),
        },
        b: Some(SideSpec {
            label: "jit",
            renderer: pipeline,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FuzzerStyle;

    fn options(mode: FuzzerMode) -> FuzzerOptions {
        FuzzerOptions {
            width: 64,
            height: 48,
            count: 24,
            ..FuzzerOptions::defaults(mode)
        }
    }

    #[test]
    fn test_jit_all_ends_with_native() {
        let controller = CampaignController::new(FuzzerMode::Jit, options(FuzzerMode::Jit));
        let configs = controller.configurations();
        let supported = cpu::supported_levels();
        assert_eq!(configs.len(), supported.len() + 1);
        for (config, level) in configs.iter().zip(&supported) {
            assert_eq!(config.tag, level.name());
            let b = config.b.as_ref().unwrap();
            assert_eq!(b.renderer.cpu_features, Some(*level));
            assert!(b.renderer.isolated_runtime);
            assert!(config.a.renderer.disable_pipeline);
        }
        let native = configs.last().unwrap();
        assert_eq!(native.tag, "native");
        assert_eq!(native.b.as_ref().unwrap().renderer, RendererConfig::pipeline(None));
    }

    #[test]
    fn test_mt_uses_thread_count() {
        let mut opts = options(FuzzerMode::Mt);
        opts.thread_count = 3;
        let configs = CampaignController::new(FuzzerMode::Mt, opts).configurations();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].a.renderer.thread_count, 0);
        assert_eq!(configs[0].b.as_ref().unwrap().renderer.thread_count, 3);
    }

    #[test]
    fn test_mt_campaign_passes() {
        let mut opts = options(FuzzerMode::Mt);
        opts.style = FuzzerStyle::Random;
        opts.flush_sync = true;
        let summary = CampaignController::new(FuzzerMode::Mt, opts).run().unwrap();
        assert_eq!(summary.passed, 7);
        assert_eq!(summary.exit_code(), 0);
        assert!(summary.reports.is_empty());
    }

    #[test]
    fn test_jit_native_campaign_passes() {
        let mut opts = options(FuzzerMode::Jit);
        opts.simd = SimdSelection::Native;
        opts.command = FuzzerCommand::FillPathCubic;
        opts.style = FuzzerStyle::GradientConic;
        let summary = CampaignController::new(FuzzerMode::Jit, opts).run().unwrap();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn test_simple_campaign_counts_categories() {
        let opts = options(FuzzerMode::Simple);
        let summary = CampaignController::new(FuzzerMode::Simple, opts).run().unwrap();
        assert_eq!(summary.rendered, 7);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.to_string(), "Fuzzing finished... (7 categories rendered)");
    }

    #[test]
    fn test_renderer_init_failure_aborts() {
        let mut opts = options(FuzzerMode::Mt);
        opts.width = 0;
        let err = CampaignController::new(FuzzerMode::Mt, opts).run().unwrap_err();
        assert!(matches!(err, CampaignError::RendererInit { side: "st", .. }));
    }

    #[test]
    fn test_summary_exit_code() {
        let mut s = CampaignSummary {
            passed: 3,
            ..CampaignSummary::default()
        };
        assert_eq!(s.exit_code(), 0);
        s.inconclusive = 1;
        assert_eq!(s.exit_code(), 1);
        assert!(s.to_string().starts_with("[FAILED] 1 tests out of 4"));
    }

    #[test]
    fn test_factory_receives_sides_and_size() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut opts = options(FuzzerMode::Mt);
        opts.command = FuzzerCommand::FillRectD;
        let summary = CampaignController::new(FuzzerMode::Mt, opts)
            .with_renderer_factory(move |side, w, h| {
                log.borrow_mut().push((side.label, w, h));
                default_renderer(side, w, h)
            })
            .run()
            .unwrap();
        assert_eq!(summary.passed, 1);
        assert_eq!(*seen.borrow(), vec![("st", 64, 48), ("mt", 64, 48)]);
    }
}
