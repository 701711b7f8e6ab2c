//! Errors raised while creating or driving a renderer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to allocate {bytes} bytes of pixel storage")]
    OutOfMemory { bytes: usize },

    #[error("failed to start render workers: {0}")]
    ThreadPool(String),

    #[error("SIMD level '{0}' is not supported by this CPU")]
    UnsupportedSimdLevel(&'static str),
}
