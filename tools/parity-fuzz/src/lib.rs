//! # parity-fuzz
//!
//! Differential verification for the `raster-pipe` backends.
//!
//! Two renderers are driven through the same seeded stream of fill commands
//! and their images are compared pixel by pixel. When they differ, the run is
//! bisected down to the first command that makes them diverge, and that
//! command is replayed with verbose logging.
//!
//! ## Architecture
//!
//! 1. **[`generator`]**: seeded commands and styles for one command category
//! 2. **[`runner`]**: two [`runner::ContextFuzzer`] sides fed the same scenario
//! 3. **[`compare`]**: pixel-exact difference summary and visual diff
//! 4. **[`bisect`]**: minimal failing prefix search and replay
//! 5. **[`campaign`]**: iterates categories, CPU levels and thread counts for
//!    one fuzzer mode and aggregates the outcome

pub mod bisect;
pub mod campaign;
pub mod compare;
pub mod generator;
pub mod logging;
pub mod options;
pub mod random;
pub mod recorder;
pub mod runner;
pub mod store;

pub use bisect::{BisectionLocalizer, BisectionReport, BisectionState};
pub use campaign::{CampaignController, CampaignError, CampaignSummary, RendererFactory, SideSpec};
pub use compare::{compare, diff_image, diff_info, Comparison, DiffResult};
pub use generator::{Scenario, ScenarioGenerator};
pub use options::{CmdLine, ConfigError, FuzzerCommand, FuzzerMode, FuzzerOptions, FuzzerStyle};
pub use recorder::MismatchRecorder;
pub use runner::{ContextFuzzer, DualBackendRunner, RunConfig, Verbosity};
pub use store::{ImageStore, StoreError};
