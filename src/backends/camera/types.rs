// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for capture backends and the frame pipeline

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// A captured or processed image buffer.
///
/// An empty frame is a real value (zero-sized buffer), not an absent one, so
/// every stage can test for "no data" without special-casing `Option`.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// The "no data" sentinel
    pub fn empty() -> Self {
        Self {
            image: RgbImage::new(0, 0),
        }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Wrap a single-channel image, replicating luma into all three channels
    pub fn from_luma(gray: &GrayImage) -> Self {
        let image = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            image::Rgb([v, v, v])
        });
        Self { image }
    }

    /// Build a frame from tightly packed RGB bytes
    pub fn from_raw_rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(Self::from_rgb)
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Replace this buffer's contents with a copy of `other`
    pub fn copy_from(&mut self, other: &Frame) {
        self.image = other.image.clone();
    }

    /// RGB value at the given pixel, clamped to the image bounds
    pub fn sample(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.is_empty() {
            return (0, 0, 0);
        }
        let x = x.min(self.width() - 1);
        let y = y.min(self.height() - 1);
        let [r, g, b] = self.image.get_pixel(x, y).0;
        (r, g, b)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "Frame(empty)")
        } else {
            write!(f, "Frame({}x{})", self.width(), self.height())
        }
    }
}

/// One of the three display surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderTarget {
    Main,
    Alpha,
    Beta,
}

impl RenderTarget {
    pub const ALL: [RenderTarget; 3] = [RenderTarget::Main, RenderTarget::Alpha, RenderTarget::Beta];

    pub fn index(self) -> usize {
        match self {
            RenderTarget::Main => 0,
            RenderTarget::Alpha => 1,
            RenderTarget::Beta => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RenderTarget::Main => "Main",
            RenderTarget::Alpha => "Alpha",
            RenderTarget::Beta => "Beta",
        }
    }
}

impl std::fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The three buffers produced by one tick
#[derive(Debug, Clone, Default)]
pub struct FrameTriple {
    pub main: Frame,
    pub alpha: Frame,
    pub beta: Frame,
}

impl FrameTriple {
    /// Start a tick from a captured frame with two fresh auxiliary buffers
    pub fn from_capture(main: Frame) -> Self {
        Self {
            main,
            alpha: Frame::empty(),
            beta: Frame::empty(),
        }
    }

    /// Consume the triple, yielding every non-empty buffer with its target
    pub fn into_non_empty(self) -> impl Iterator<Item = (RenderTarget, Frame)> {
        [
            (RenderTarget::Main, self.main),
            (RenderTarget::Alpha, self.alpha),
            (RenderTarget::Beta, self.beta),
        ]
        .into_iter()
        .filter(|(_, frame)| !frame.is_empty())
    }
}

/// Capture device summary for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Index passed to `open`
    pub index: u32,
    /// Human readable name (V4L2 card)
    pub name: String,
    /// Device node path (e.g. /dev/video0)
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_is_empty() {
        let frame = Frame::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.sample(3, 3), (0, 0, 0));
        assert_eq!(format!("{:?}", frame), "Frame(empty)");
    }

    #[test]
    fn luma_frames_replicate_channels() {
        let gray = GrayImage::from_pixel(4, 2, image::Luma([77]));
        let frame = Frame::from_luma(&gray);
        assert_eq!((frame.width(), frame.height()), (4, 2));
        assert_eq!(frame.sample(1, 1), (77, 77, 77));
    }

    #[test]
    fn triple_skips_empty_buffers() {
        let main = Frame::from_rgb(RgbImage::new(2, 2));
        let mut triple = FrameTriple::from_capture(main);
        triple.beta.copy_from(&triple.main);

        let targets: Vec<RenderTarget> = triple.into_non_empty().map(|(t, _)| t).collect();
        assert_eq!(targets, vec![RenderTarget::Main, RenderTarget::Beta]);
    }

    #[test]
    fn raw_rgb_rejects_short_buffers() {
        assert!(Frame::from_raw_rgb(2, 2, vec![0; 11]).is_none());
        assert!(Frame::from_raw_rgb(2, 2, vec![0; 12]).is_some());
    }
}
