// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic capture source
//!
//! Produces a moving test pattern so applications and tests can run without
//! capture hardware. Only device index 0 exists.

use super::types::{CameraDevice, Frame};
use super::{CameraBackendType, CameraResult, CaptureBackend};
use crate::errors::CameraError;
use image::{Rgb, RgbImage};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const SQUARE: u32 = 40;

pub struct SyntheticBackend {
    open: bool,
    sequence: u32,
    width: u32,
    height: u32,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::with_size(WIDTH, HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            open: false,
            sequence: 0,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Listing entry for the single synthetic device
    pub fn device() -> CameraDevice {
        CameraDevice {
            index: 0,
            name: "Synthetic test pattern".to_string(),
            path: "synthetic:0".to_string(),
        }
    }

    fn render(&self) -> RgbImage {
        let (w, h) = (self.width, self.height);
        let travel_x = w.saturating_sub(SQUARE).max(1);
        let travel_y = h.saturating_sub(SQUARE).max(1);
        let sx = bounce(self.sequence * 4, travel_x);
        let sy = bounce(self.sequence * 3, travel_y);
        let shift = (self.sequence % 256) as u8;

        RgbImage::from_fn(w, h, |x, y| {
            if x >= sx && x < sx + SQUARE && y >= sy && y < sy + SQUARE {
                return Rgb([255, 255, 255]);
            }
            let r = ((x * 255) / w) as u8;
            let g = ((y * 255) / h) as u8;
            Rgb([r, g, shift])
        })
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Position moving back and forth over `0..=span`
fn bounce(step: u32, span: u32) -> u32 {
    let period = span * 2;
    let pos = step % period;
    if pos <= span { pos } else { period - pos }
}

impl CaptureBackend for SyntheticBackend {
    fn open(&mut self, index: u32) -> CameraResult<()> {
        if index != 0 {
            return Err(CameraError::NotFound(index));
        }
        self.open = true;
        self.sequence = 0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self) -> CameraResult<Frame> {
        if !self.open {
            return Err(CameraError::NotOpen);
        }
        let frame = Frame::from_rgb(self.render());
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    fn release(&mut self) {
        self.open = false;
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Synthetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_index_zero_opens() {
        let mut backend = SyntheticBackend::new();
        assert!(backend.open(1).is_err());
        assert!(!backend.is_open());
        assert!(backend.open(0).is_ok());
        assert!(backend.is_open());
    }

    #[test]
    fn test_frames_move() {
        let mut backend = SyntheticBackend::with_size(64, 48);
        backend.open(0).unwrap();
        let a = backend.read().unwrap();
        let b = backend.read().unwrap();
        assert_eq!((a.width(), a.height()), (64, 48));
        assert_ne!(a, b);
    }

    #[test]
    fn test_read_when_closed_fails() {
        let mut backend = SyntheticBackend::new();
        assert!(backend.read().is_err());
    }

    #[test]
    fn test_bounce_stays_in_range() {
        for step in 0..500 {
            assert!(bounce(step, 17) <= 17);
        }
    }
}
