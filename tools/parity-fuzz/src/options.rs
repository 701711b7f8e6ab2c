//! Fuzzer modes, command and style categories, and command-line options.
//!
//! Arguments use the `--key=value` form. Flags are bare `--key`. Category and
//! SIMD level names are matched case-insensitively.

use std::path::PathBuf;

use raster_pipe::{GradientQuality, SimdLevel};
use thiserror::Error;

/// Rejected command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no fuzzer mode given (expected simple, mt or jit)")]
    MissingMode,

    #[error("unknown fuzzer mode '{0}' - please use --help to list all available modes")]
    UnknownMode(String),

    #[error("unknown command '{0}' - please use --help to list all available commands")]
    UnknownCommand(String),

    #[error("unknown style '{0}' - please use --help to list all available styles")]
    UnknownStyle(String),

    #[error("unknown simd-level '{0}' - please use --help to list all available simd levels")]
    UnknownSimdLevel(String),

    #[error("invalid value '{value}' for {key}: expected an unsigned integer")]
    InvalidNumber { key: String, value: String },
}

// ============================================================================
// FuzzerMode
// ============================================================================

/// Which pair of backends a campaign compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzerMode {
    /// Smoke-runs every category on one backend.
    Simple,
    /// Single-threaded pipelines against the band-parallel backend.
    Mt,
    /// Reference kernel against pipelines compiled for each SIMD level.
    Jit,
}

impl FuzzerMode {
    pub const ALL: [FuzzerMode; 3] = [FuzzerMode::Simple, FuzzerMode::Mt, FuzzerMode::Jit];

    pub const fn name(self) -> &'static str {
        match self {
            FuzzerMode::Simple => "simple",
            FuzzerMode::Mt => "mt",
            FuzzerMode::Jit => "jit",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            FuzzerMode::Simple => "Renders every command category once on a single backend",
            FuzzerMode::Mt => "Compares single-threaded and multi-threaded rendering",
            FuzzerMode::Jit => "Compares the reference kernel with SIMD pipelines",
        }
    }

    pub fn parse(s: &str) -> Option<FuzzerMode> {
        Self::ALL.into_iter().find(|m| m.name().eq_ignore_ascii_case(s))
    }
}

// ============================================================================
// FuzzerCommand
// ============================================================================

/// Command category to fuzz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzerCommand {
    FillRectI,
    FillRectD,
    FillTriangle,
    FillPoly10,
    FillPathQuad,
    FillPathCubic,
    FillText,
    /// Every category above, in declaration order.
    All,
}

impl FuzzerCommand {
    /// Concrete categories in the order campaigns run them.
    pub const CATEGORIES: [FuzzerCommand; 7] = [
        FuzzerCommand::FillRectI,
        FuzzerCommand::FillRectD,
        FuzzerCommand::FillTriangle,
        FuzzerCommand::FillPoly10,
        FuzzerCommand::FillPathQuad,
        FuzzerCommand::FillPathCubic,
        FuzzerCommand::FillText,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FuzzerCommand::FillRectI => "fill-rect-i",
            FuzzerCommand::FillRectD => "fill-rect-d",
            FuzzerCommand::FillTriangle => "fill-triangle",
            FuzzerCommand::FillPoly10 => "fill-poly-10",
            FuzzerCommand::FillPathQuad => "fill-path-quad",
            FuzzerCommand::FillPathCubic => "fill-path-cubic",
            FuzzerCommand::FillText => "fill-text",
            FuzzerCommand::All => "all",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            FuzzerCommand::FillRectI => "Fills aligned rectangles (int coordinates)",
            FuzzerCommand::FillRectD => "Fills unaligned rectangles (float coordinates)",
            FuzzerCommand::FillTriangle => "Fills triangles",
            FuzzerCommand::FillPoly10 => "Fills polygons having 10 vertices",
            FuzzerCommand::FillPathQuad => "Fills path having quadratic curves",
            FuzzerCommand::FillPathCubic => "Fills path having cubic curves",
            FuzzerCommand::FillText => "Fills text runs",
            FuzzerCommand::All => "Executes all commands",
        }
    }

    pub fn parse(s: &str) -> Option<FuzzerCommand> {
        Self::CATEGORIES
            .into_iter()
            .chain(std::iter::once(FuzzerCommand::All))
            .find(|c| c.name().eq_ignore_ascii_case(s))
    }

    /// Whether running `self` includes the concrete category `category`.
    pub fn selects(self, category: FuzzerCommand) -> bool {
        self == FuzzerCommand::All || self == category
    }

    /// Concrete categories selected by `self`.
    pub fn categories(self) -> impl Iterator<Item = FuzzerCommand> {
        Self::CATEGORIES.into_iter().filter(move |&c| self.selects(c))
    }
}

impl std::fmt::Display for FuzzerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FuzzerStyle
// ============================================================================

/// Style category used for every generated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzerStyle {
    Solid,
    SolidOpaque,
    GradientLinear,
    GradientLinearDither,
    GradientRadial,
    GradientRadialDither,
    GradientConic,
    GradientConicDither,
    /// Reserved; resolves to a solid color.
    PatternAligned,
    /// Reserved; resolves to a solid color.
    PatternUnaligned,
    /// Reserved; resolves to a solid color.
    PatternAffine,
    /// A uniformly chosen concrete category per command.
    Random,
}

impl FuzzerStyle {
    pub const ALL: [FuzzerStyle; 12] = [
        FuzzerStyle::Solid,
        FuzzerStyle::SolidOpaque,
        FuzzerStyle::GradientLinear,
        FuzzerStyle::GradientLinearDither,
        FuzzerStyle::GradientRadial,
        FuzzerStyle::GradientRadialDither,
        FuzzerStyle::GradientConic,
        FuzzerStyle::GradientConicDither,
        FuzzerStyle::PatternAligned,
        FuzzerStyle::PatternUnaligned,
        FuzzerStyle::PatternAffine,
        FuzzerStyle::Random,
    ];

    /// Number of categories `Random` chooses from.
    pub const CONCRETE_COUNT: u32 = 11;

    pub const fn name(self) -> &'static str {
        match self {
            FuzzerStyle::Solid => "solid",
            FuzzerStyle::SolidOpaque => "solid-opaque",
            FuzzerStyle::GradientLinear => "gradient-linear",
            FuzzerStyle::GradientLinearDither => "gradient-linear-dither",
            FuzzerStyle::GradientRadial => "gradient-radial",
            FuzzerStyle::GradientRadialDither => "gradient-radial-dither",
            FuzzerStyle::GradientConic => "gradient-conic",
            FuzzerStyle::GradientConicDither => "gradient-conic-dither",
            FuzzerStyle::PatternAligned => "pattern-aligned",
            FuzzerStyle::PatternUnaligned => "pattern-unaligned",
            FuzzerStyle::PatternAffine => "pattern-affine",
            FuzzerStyle::Random => "random",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            FuzzerStyle::Solid => "Solid color",
            FuzzerStyle::SolidOpaque => "Opaque solid color",
            FuzzerStyle::GradientLinear => "Linear gradient",
            FuzzerStyle::GradientLinearDither => "Linear gradient (dithered)",
            FuzzerStyle::GradientRadial => "Radial gradient",
            FuzzerStyle::GradientRadialDither => "Radial gradient (dithered)",
            FuzzerStyle::GradientConic => "Conic gradient",
            FuzzerStyle::GradientConicDither => "Conic gradient (dithered)",
            FuzzerStyle::PatternAligned => "Pattern with aligned translation (solid for now)",
            FuzzerStyle::PatternUnaligned => "Pattern with fractional translation (solid for now)",
            FuzzerStyle::PatternAffine => "Pattern with affine transformation (solid for now)",
            FuzzerStyle::Random => "Every render call uses a random style",
        }
    }

    pub fn parse(s: &str) -> Option<FuzzerStyle> {
        Self::ALL.into_iter().find(|st| st.name().eq_ignore_ascii_case(s))
    }

    /// Concrete category for a random draw.
    pub fn from_random(value: u32) -> FuzzerStyle {
        Self::ALL[(value % Self::CONCRETE_COUNT) as usize]
    }

    /// Gradient quality the renderer must use for this category, if any.
    pub fn gradient_quality(self) -> Option<GradientQuality> {
        match self {
            FuzzerStyle::GradientLinear | FuzzerStyle::GradientRadial | FuzzerStyle::GradientConic => {
                Some(GradientQuality::Nearest)
            }
            FuzzerStyle::GradientLinearDither
            | FuzzerStyle::GradientRadialDither
            | FuzzerStyle::GradientConicDither => Some(GradientQuality::Dither),
            _ => None,
        }
    }
}

impl std::fmt::Display for FuzzerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SimdSelection
// ============================================================================

/// CPU feature levels a jit campaign compiles pipelines for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdSelection {
    /// Whatever the runtime detects, with the shared pipeline cache.
    Native,
    /// Every supported level in ascending order, then native.
    All,
    Level(SimdLevel),
}

impl SimdSelection {
    pub fn parse(s: &str) -> Option<SimdSelection> {
        if s.eq_ignore_ascii_case("native") {
            Some(SimdSelection::Native)
        } else if s.eq_ignore_ascii_case("all") {
            Some(SimdSelection::All)
        } else {
            SimdLevel::parse(s).map(SimdSelection::Level)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimdSelection::Native => "native",
            SimdSelection::All => "all",
            SimdSelection::Level(level) => level.name(),
        }
    }
}

// ============================================================================
// CmdLine
// ============================================================================

/// Lookup over raw `--key=value` arguments.
#[derive(Debug, Clone, Default)]
pub struct CmdLine {
    args: Vec<String>,
}

impl CmdLine {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// First argument that is not an option.
    pub fn positional(&self) -> Option<&str> {
        self.args.iter().map(String::as_str).find(|a| !a.starts_with("--"))
    }

    pub fn has_arg(&self, key: &str) -> bool {
        self.args.iter().any(|a| a == key)
    }

    /// Value of the first `key=value` argument.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.args.iter().find_map(|a| {
            a.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }

    pub fn value_as_u32(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        self.parse_number(key, default)
    }

    pub fn value_as_u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.parse_number(key, default)
    }

    fn parse_number<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.value_of(key) {
            None | Some("") => Ok(default),
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value: v.to_string(),
            }),
        }
    }
}

// ============================================================================
// FuzzerOptions
// ============================================================================

/// Settings shared by every comparison of a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzerOptions {
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub thread_count: u32,
    pub seed: u64,
    pub command: FuzzerCommand,
    pub style: FuzzerStyle,
    pub simd: SimdSelection,
    pub verbose: bool,
    pub flush_sync: bool,
    pub store_images: bool,
    pub output_dir: PathBuf,
}

impl FuzzerOptions {
    /// Defaults for `mode`.
    pub fn defaults(mode: FuzzerMode) -> Self {
        Self {
            width: 513,
            height: 513,
            count: 1000,
            thread_count: if mode == FuzzerMode::Mt { 2 } else { 0 },
            seed: 1,
            command: FuzzerCommand::All,
            style: FuzzerStyle::GradientLinearDither,
            simd: if mode == FuzzerMode::Jit {
                SimdSelection::All
            } else {
                SimdSelection::Native
            },
            verbose: false,
            flush_sync: false,
            store_images: false,
            output_dir: PathBuf::from("."),
        }
    }

    /// Options for `mode` with overrides from `cmd`.
    pub fn parse(mode: FuzzerMode, cmd: &CmdLine) -> Result<Self, ConfigError> {
        let defaults = Self::defaults(mode);

        let command = match cmd.value_of("--command") {
            None => defaults.command,
            Some(s) => FuzzerCommand::parse(s).ok_or_else(|| ConfigError::UnknownCommand(s.into()))?,
        };
        let style = match cmd.value_of("--style") {
            None => defaults.style,
            Some(s) => FuzzerStyle::parse(s).ok_or_else(|| ConfigError::UnknownStyle(s.into()))?,
        };
        let simd = match (mode, cmd.value_of("--simd-level")) {
            (FuzzerMode::Jit, Some(s)) => {
                SimdSelection::parse(s).ok_or_else(|| ConfigError::UnknownSimdLevel(s.into()))?
            }
            _ => defaults.simd,
        };

        Ok(Self {
            width: cmd.value_as_u32("--width", defaults.width)?,
            height: cmd.value_as_u32("--height", defaults.height)?,
            count: cmd.value_as_u32("--count", defaults.count)?,
            thread_count: cmd.value_as_u32("--thread-count", defaults.thread_count)?,
            seed: cmd.value_as_u64("--seed", defaults.seed)?,
            command,
            style,
            simd,
            verbose: cmd.has_arg("--verbose") || defaults.verbose,
            flush_sync: cmd.has_arg("--flush-sync") || defaults.flush_sync,
            store_images: cmd.has_arg("--store") || defaults.store_images,
            output_dir: cmd
                .value_of("--output")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }
}
