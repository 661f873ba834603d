// SPDX-License-Identifier: GPL-3.0-only

//! Video4Linux capture backend
//!
//! Opens `/dev/videoN` by index, negotiates YUYV (falling back to MJPEG) and
//! reads frames from a memory-mapped stream.

use super::format_converters::{frame_from_mjpeg, frame_from_yuyv};
use super::types::{CameraDevice, Frame};
use super::{CameraBackendType, CameraResult, CaptureBackend};
use crate::errors::CameraError;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

const PREFERRED_WIDTH: u32 = 640;
const PREFERRED_HEIGHT: u32 = 480;
const BUFFER_COUNT: u32 = 4;

fn yuyv() -> FourCC {
    FourCC::new(b"YUYV")
}

fn mjpg() -> FourCC {
    FourCC::new(b"MJPG")
}

struct ActiveStream {
    // Declared before the device so the stream is dropped first
    stream: MmapStream<'static>,
    _device: Device,
    width: u32,
    height: u32,
    stride: u32,
    fourcc: FourCC,
}

pub struct V4l2Backend {
    active: Option<ActiveStream>,
}

impl V4l2Backend {
    pub fn new() -> Self {
        Self { active: None }
    }
}

impl Default for V4l2Backend {
    fn default() -> Self {
        Self::new()
    }
}

/// Negotiate a pixel format the converters understand
fn negotiate_format(dev: &Device) -> CameraResult<v4l::Format> {
    let mut format = dev.format()?;
    format.width = PREFERRED_WIDTH;
    format.height = PREFERRED_HEIGHT;

    for fourcc in [yuyv(), mjpg()] {
        format.fourcc = fourcc;
        match dev.set_format(&format) {
            Ok(applied) if applied.fourcc == fourcc => {
                info!(
                    width = applied.width,
                    height = applied.height,
                    fourcc = %applied.fourcc,
                    "Set V4L2 format"
                );
                return Ok(applied);
            }
            Ok(applied) => {
                debug!(requested = %fourcc, got = %applied.fourcc, "Device substituted format");
            }
            Err(e) => {
                debug!(requested = %fourcc, error = %e, "Device rejected format");
            }
        }
    }

    let current = dev.format()?;
    warn!(fourcc = %current.fourcc, "No supported pixel format offered by device");
    Err(CameraError::UnsupportedFormat(current.fourcc.to_string()))
}

impl CaptureBackend for V4l2Backend {
    fn open(&mut self, index: u32) -> CameraResult<()> {
        self.release();

        let dev = Device::new(index as usize).map_err(|e| CameraError::OpenFailed {
            id: index,
            reason: e.to_string(),
        })?;
        let format = negotiate_format(&dev)?;

        let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, BUFFER_COUNT).map_err(|e| {
            CameraError::OpenFailed {
                id: index,
                reason: format!("failed to create buffer stream: {}", e),
            }
        })?;

        self.active = Some(ActiveStream {
            stream,
            _device: dev,
            width: format.width,
            height: format.height,
            stride: format.stride,
            fourcc: format.fourcc,
        });
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.active.is_some()
    }

    fn read(&mut self) -> CameraResult<Frame> {
        let active = self.active.as_mut().ok_or(CameraError::NotOpen)?;
        let (width, height, stride, fourcc) =
            (active.width, active.height, active.stride, active.fourcc);

        let (buf, meta) = active.stream.next()?;
        let used = (meta.bytesused as usize).min(buf.len());
        let data = if used > 0 { &buf[..used] } else { buf };

        if fourcc == yuyv() {
            frame_from_yuyv(data, width, height, stride)
        } else if fourcc == mjpg() {
            frame_from_mjpeg(data)
        } else {
            Err(CameraError::UnsupportedFormat(fourcc.to_string()))
        }
    }

    fn release(&mut self) {
        self.active = None;
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

/// List V4L2 nodes that can be opened by index
pub fn enumerate_devices() -> Vec<CameraDevice> {
    let mut devices: Vec<CameraDevice> = v4l::context::enum_devices()
        .into_iter()
        .map(|node| CameraDevice {
            index: node.index() as u32,
            name: node.name().unwrap_or_else(|| "Unknown device".to_string()),
            path: node.path().to_string_lossy().to_string(),
        })
        .collect();
    devices.sort_by_key(|d| d.index);
    devices
}
