// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for raw capture buffers
//!
//! Everything is converted to packed RGB24, which is what [`Frame`] holds.

use super::types::Frame;
use crate::errors::CameraError;

/// Convert a BT.601 YUV sample to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

/// Convert YUYV (YUV 4:2:2) to RGB24
///
/// YUYV format: Y0 U Y1 V - each 4-byte group encodes 2 pixels.
/// Rows are `stride` bytes apart; trailing partial data is ignored.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let stride = (stride as usize).max(w * 2);
    let mut rgb = vec![0u8; w * h * 3];

    for row in 0..h {
        let start = row * stride;
        let Some(line) = data.get(start..start + w * 2) else {
            break;
        };
        for (pair, chunk) in line.chunks_exact(4).enumerate() {
            let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
            for (i, luma) in [y0, y1].into_iter().enumerate() {
                let x = pair * 2 + i;
                let (r, g, b) = yuv_to_rgb(luma, u, v);
                let idx = (row * w + x) * 3;
                rgb[idx] = r;
                rgb[idx + 1] = g;
                rgb[idx + 2] = b;
            }
        }
    }

    rgb
}

/// Decode one YUYV buffer into a frame
pub fn frame_from_yuyv(data: &[u8], width: u32, height: u32, stride: u32) -> Result<Frame, CameraError> {
    let expected = (width as usize) * 2 * (height as usize);
    if data.len() < expected.min((stride as usize) * (height as usize)) {
        return Err(CameraError::ReadFailed(format!(
            "short YUYV buffer: {} bytes for {}x{}",
            data.len(),
            width,
            height
        )));
    }
    let rgb = yuyv_to_rgb(data, width, height, stride);
    Frame::from_raw_rgb(width, height, rgb)
        .ok_or_else(|| CameraError::ReadFailed("YUYV conversion size mismatch".into()))
}

/// Decode one MJPEG buffer into a frame
pub fn frame_from_mjpeg(data: &[u8]) -> Result<Frame, CameraError> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| CameraError::ReadFailed(format!("MJPEG decode failed: {}", e)))?;
    Ok(Frame::from_rgb(decoded.to_rgb8()))
}
