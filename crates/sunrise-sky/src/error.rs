//! Scene error types.

/// Errors raised while building the scene.
#[derive(Debug, thiserror::Error)]
pub enum SkyError {
    /// The pixel buffer backing a patch image could not be allocated.
    #[error("failed to allocate {width}x{height} patch image")]
    ImageAllocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}
