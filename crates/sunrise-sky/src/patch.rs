//! Translucent rectangular patches: the building block of the nebula field
//! and of cloud flocks.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

use crate::color::{Color, WHITE, to_rgba8};
use crate::error::SkyError;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// An RGBA8 pixel buffer of a single color at constant alpha.
///
/// Each image carries a process-unique id so backends can cache uploads.
#[derive(Debug)]
pub struct PatchImage {
    id: u64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PatchImage {
    /// Fill a `width × height` box with `color` at `alpha`.
    ///
    /// Fails only if the pixel buffer cannot be allocated.
    pub fn alpha_box(color: Color, width: u32, height: u32, alpha: u8) -> Result<Self, SkyError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SkyError::ImageAllocation { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| SkyError::ImageAllocation { width, height })?;

        let texel = to_rgba8(color, alpha);
        for _ in 0..(len / 4) {
            pixels.extend_from_slice(&texel);
        }

        Ok(Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels,
        })
    }

    /// Process-unique image id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixels, unpremultiplied.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A white translucent patch. Owns its image; patches are never shared.
#[derive(Debug)]
pub struct NebulaPatch {
    /// Top-left corner. Absolute for the nebula field, relative to the cloud
    /// for flocks.
    pub position: Vec2,
    /// Opacity, doubling as the threshold at which a flock materializes.
    pub threshold: u8,
    image: PatchImage,
}

impl NebulaPatch {
    /// Create a patch and its backing image.
    pub fn new(position: Vec2, width: u32, height: u32, threshold: u8) -> Result<Self, SkyError> {
        Ok(Self {
            position,
            threshold,
            image: PatchImage::alpha_box(WHITE, width, height, threshold)?,
        })
    }

    /// Backing image.
    pub fn image(&self) -> &PatchImage {
        &self.image
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
