//! CPU feature levels and detection.
//!
//! A [`SimdLevel`] names an instruction-set tier a pipeline may be compiled
//! for. Each tier maps to a lane width used by the span kernels. Only the
//! tiers of the current architecture are nameable.

use once_cell::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimdLevel {
    Sse2,
    Sse3,
    Ssse3,
    Sse41,
    Sse42,
    Avx,
    Avx2,
    Avx512,
    Asimd,
    /// Architectures without a dedicated tier.
    Portable,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const LADDER: &[SimdLevel] = &[
    SimdLevel::Sse2,
    SimdLevel::Sse3,
    SimdLevel::Ssse3,
    SimdLevel::Sse41,
    SimdLevel::Sse42,
    SimdLevel::Avx,
    SimdLevel::Avx2,
    SimdLevel::Avx512,
];

#[cfg(target_arch = "aarch64")]
const LADDER: &[SimdLevel] = &[SimdLevel::Asimd];

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
const LADDER: &[SimdLevel] = &[SimdLevel::Portable];

impl SimdLevel {
    pub const fn name(self) -> &'static str {
        match self {
            SimdLevel::Sse2 => "sse2",
            SimdLevel::Sse3 => "sse3",
            SimdLevel::Ssse3 => "ssse3",
            SimdLevel::Sse41 => "sse4.1",
            SimdLevel::Sse42 => "sse4.2",
            SimdLevel::Avx => "avx",
            SimdLevel::Avx2 => "avx2",
            SimdLevel::Avx512 => "avx512",
            SimdLevel::Asimd => "asimd",
            SimdLevel::Portable => "portable",
        }
    }

    /// Human-readable description for help output.
    pub const fn description(self) -> &'static str {
        match self {
            SimdLevel::Sse2 => "SSE2 [128-bit SIMD]",
            SimdLevel::Sse3 => "SSE3 [128-bit SIMD]",
            SimdLevel::Ssse3 => "SSSE3 [128-bit SIMD]",
            SimdLevel::Sse41 => "SSE4.1 [128-bit SIMD]",
            SimdLevel::Sse42 => "SSE4.2 [128-bit SIMD]",
            SimdLevel::Avx => "AVX [128-bit SIMD]",
            SimdLevel::Avx2 => "AVX2 [256-bit SIMD]",
            SimdLevel::Avx512 => "AVX512 [512-bit SIMD]",
            SimdLevel::Asimd => "ASIMD [128-bit SIMD]",
            SimdLevel::Portable => "portable [128-bit lanes]",
        }
    }

    /// Pixels processed per kernel step.
    pub const fn lanes(self) -> usize {
        match self {
            SimdLevel::Avx2 => 8,
            SimdLevel::Avx512 => 16,
            _ => 4,
        }
    }

    /// Parse a level name of the current architecture, ignoring case.
    pub fn parse(name: &str) -> Option<SimdLevel> {
        LADDER
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }

    /// All levels of the current architecture, lowest first.
    pub fn ladder() -> &'static [SimdLevel] {
        LADDER
    }

    pub fn is_supported(self) -> bool {
        detect(self)
    }

    /// Highest supported level of the current CPU.
    pub fn native() -> SimdLevel {
        static NATIVE: OnceCell<SimdLevel> = OnceCell::new();
        *NATIVE.get_or_init(|| {
            supported_levels()
                .last()
                .copied()
                .unwrap_or(LADDER[0])
        })
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported levels in ascending order, stopping at the first unsupported one.
pub fn supported_levels() -> Vec<SimdLevel> {
    LADDER
        .iter()
        .copied()
        .take_while(|l| l.is_supported())
        .collect()
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect(level: SimdLevel) -> bool {
    match level {
        SimdLevel::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
        SimdLevel::Sse3 => std::arch::is_x86_feature_detected!("sse3"),
        SimdLevel::Ssse3 => std::arch::is_x86_feature_detected!("ssse3"),
        SimdLevel::Sse41 => std::arch::is_x86_feature_detected!("sse4.1"),
        SimdLevel::Sse42 => std::arch::is_x86_feature_detected!("sse4.2"),
        SimdLevel::Avx => std::arch::is_x86_feature_detected!("avx"),
        SimdLevel::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
        SimdLevel::Avx512 => {
            std::arch::is_x86_feature_detected!("avx512f")
                && std::arch::is_x86_feature_detected!("avx512bw")
        }
        SimdLevel::Asimd | SimdLevel::Portable => false,
    }
}

#[cfg(target_arch = "aarch64")]
fn detect(level: SimdLevel) -> bool {
    match level {
        SimdLevel::Asimd => std::arch::is_aarch64_feature_detected!("neon"),
        _ => false,
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn detect(level: SimdLevel) -> bool {
    level == SimdLevel::Portable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_ladder_names() {
        for &level in SimdLevel::ladder() {
            assert_eq!(SimdLevel::parse(level.name()), Some(level));
            assert_eq!(SimdLevel::parse(&level.name().to_uppercase()), Some(level));
        }
        assert_eq!(SimdLevel::parse("mmx"), None);
    }

    #[test]
    fn test_native_is_supported() {
        let native = SimdLevel::native();
        assert!(SimdLevel::ladder().contains(&native));
        if !supported_levels().is_empty() {
            assert!(native.is_supported());
        }
    }

    #[test]
    fn test_native_is_detected_once() {
        let first = SimdLevel::native();
        assert_eq!(SimdLevel::native(), first);
        assert_eq!(supported_levels().last().copied().unwrap_or(SimdLevel::ladder()[0]), first);
    }

    #[test]
    fn test_supported_levels_are_a_ladder_prefix() {
        let levels = supported_levels();
        assert_eq!(&SimdLevel::ladder()[..levels.len()], levels.as_slice());
    }

    #[test]
    fn test_lane_widths() {
        assert_eq!(SimdLevel::Sse2.lanes(), 4);
        assert_eq!(SimdLevel::Avx.lanes(), 4);
        assert_eq!(SimdLevel::Avx2.lanes(), 8);
        assert_eq!(SimdLevel::Avx512.lanes(), 16);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse2_always_present_on_x86_64() {
        assert!(SimdLevel::Sse2.is_supported());
        assert_eq!(SimdLevel::parse("sse4.1"), Some(SimdLevel::Sse41));
        assert_eq!(SimdLevel::parse("asimd"), None);
    }
}
