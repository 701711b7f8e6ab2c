//! Fill pipelines and the pipeline runtime.
//!
//! A [`Pipeline`] is a span kernel specialized for one [`PipelineSignature`]:
//! fetch kind, gradient quality, pixel format and SIMD level (which fixes the
//! lane width). Pipelines are compiled on first use and cached by a
//! [`PipelineRuntime`]. Renderers share the process-global runtime unless they
//! ask for an isolated one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::basics::CoverType;
use crate::compose::{blend_span_lanes, fill_solid_lanes, force_opaque};
use crate::cpu::SimdLevel;
use crate::fill::{SpanKernel, SpanRequest};
use crate::gradient::{GradientKind, GradientQuality};
use crate::image::PixelFormat;
use crate::style::{Paint, Style};

/// Source of the pixels a pipeline composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Solid,
    Linear,
    Radial,
    Conic,
}

impl FetchKind {
    pub fn of(style: &Style) -> Self {
        match style {
            Style::Solid(_) => FetchKind::Solid,
            Style::Gradient(g) => match g.kind() {
                GradientKind::Linear { .. } => FetchKind::Linear,
                GradientKind::Radial { .. } => FetchKind::Radial,
                GradientKind::Conic { .. } => FetchKind::Conic,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineSignature {
    pub fetch: FetchKind,
    pub quality: GradientQuality,
    pub format: PixelFormat,
    pub simd: SimdLevel,
}

type SolidFn = fn(&mut [u32], u32, &[CoverType]);
type BlendFn = fn(&mut [u32], &[u32], &[CoverType]);

// ============================================================================
// Pipeline
// ============================================================================

pub struct Pipeline {
    signature: PipelineSignature,
    lanes: usize,
    solid: SolidFn,
    blend: BlendFn,
}

impl Pipeline {
    pub fn compile(signature: PipelineSignature) -> Self {
        let lanes = signature.simd.lanes();
        let (solid, blend): (SolidFn, BlendFn) = match lanes {
            16 => (fill_solid_lanes::<16>, blend_span_lanes::<16>),
            8 => (fill_solid_lanes::<8>, blend_span_lanes::<8>),
            _ => (fill_solid_lanes::<4>, blend_span_lanes::<4>),
        };
        Self {
            signature,
            lanes,
            solid,
            blend,
        }
    }

    pub fn signature(&self) -> &PipelineSignature {
        &self.signature
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }
}

impl SpanKernel for Pipeline {
    fn fill_span(&self, dst: &mut [u32], req: &SpanRequest<'_>, scratch: &mut Vec<u32>) {
        match req.paint {
            Paint::Solid(color) => (self.solid)(dst, *color, req.covers),
            Paint::Gradient(g) => {
                scratch.clear();
                scratch.resize(dst.len(), 0);
                g.generate(scratch, req.x, req.y, self.signature.quality);
                (self.blend)(dst, scratch, req.covers);
            }
        }
        if self.signature.format == PixelFormat::Xrgb32 {
            force_opaque(dst);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("signature", &self.signature)
            .field("lanes", &self.lanes)
            .finish()
    }
}

// ============================================================================
// PipelineRuntime
// ============================================================================

static GLOBAL_RUNTIME: Lazy<Arc<PipelineRuntime>> = Lazy::new(|| Arc::new(PipelineRuntime::new()));

/// Compiles and caches pipelines.
pub struct PipelineRuntime {
    cache: Mutex<HashMap<PipelineSignature, Arc<Pipeline>>>,
    compiled: AtomicUsize,
}

impl PipelineRuntime {
    /// A new, empty runtime.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            compiled: AtomicUsize::new(0),
        }
    }

    /// The process-global runtime.
    pub fn global() -> Arc<PipelineRuntime> {
        Arc::clone(&GLOBAL_RUNTIME)
    }

    /// Cached pipeline for `signature`, compiling it on first use.
    pub fn get(&self, signature: PipelineSignature) -> Arc<Pipeline> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(p) = cache.get(&signature) {
            return Arc::clone(p);
        }
        debug!(?signature, "compiling pipeline");
        let pipeline = Arc::new(Pipeline::compile(signature));
        self.compiled.fetch_add(1, Ordering::Relaxed);
        cache.insert(signature, Arc::clone(&pipeline));
        pipeline
    }

    /// Number of pipelines compiled by this runtime.
    pub fn compiled_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }
}

impl Default for PipelineRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba32;
    use crate::gradient::Gradient;

    fn signature(simd: SimdLevel) -> PipelineSignature {
        PipelineSignature {
            fetch: FetchKind::Solid,
            quality: GradientQuality::Nearest,
            format: PixelFormat::Prgb32,
            simd,
        }
    }

    #[test]
    fn test_fetch_kind_of_style() {
        assert_eq!(FetchKind::of(&Style::Solid(Rgba32::WHITE)), FetchKind::Solid);
        let g = Gradient::conic(0.0, 0.0, 0.0);
        assert_eq!(FetchKind::of(&Style::Gradient(g)), FetchKind::Conic);
    }

    #[test]
    fn test_compile_picks_lane_width() {
        assert_eq!(Pipeline::compile(signature(SimdLevel::Sse2)).lanes(), 4);
        assert_eq!(Pipeline::compile(signature(SimdLevel::Avx2)).lanes(), 8);
        assert_eq!(Pipeline::compile(signature(SimdLevel::Avx512)).lanes(), 16);
    }

    #[test]
    fn test_runtime_caches() {
        let rt = PipelineRuntime::new();
        let a = rt.get(signature(SimdLevel::Sse2));
        let b = rt.get(signature(SimdLevel::Sse2));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(rt.compiled_count(), 1);
        rt.get(signature(SimdLevel::Avx2));
        assert_eq!(rt.compiled_count(), 2);
    }

    #[test]
    fn test_isolated_runtimes_do_not_share() {
        let a = PipelineRuntime::new();
        let b = PipelineRuntime::new();
        let pa = a.get(signature(SimdLevel::Sse42));
        let pb = b.get(signature(SimdLevel::Sse42));
        assert!(!Arc::ptr_eq(&pa, &pb));
        assert_eq!(b.compiled_count(), 1);
    }

    #[test]
    fn test_global_runtime_is_shared() {
        assert!(Arc::ptr_eq(&PipelineRuntime::global(), &PipelineRuntime::global()));
    }

    #[test]
    fn test_xrgb_pipeline_forces_alpha() {
        let mut sig = signature(SimdLevel::Sse2);
        sig.format = PixelFormat::Xrgb32;
        let p = Pipeline::compile(sig);
        let paint = Paint::Solid(0x8040_2010);
        let covers = [255u8; 3];
        let req = SpanRequest {
            x: 0,
            y: 0,
            covers: &covers,
            paint: &paint,
            quality: GradientQuality::Nearest,
            format: PixelFormat::Xrgb32,
        };
        let mut dst = [0u32; 3];
        p.fill_span(&mut dst, &req, &mut Vec::new());
        assert!(dst.iter().all(|&px| px >> 24 == 0xFF));
    }
}
