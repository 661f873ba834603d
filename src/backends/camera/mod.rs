// SPDX-License-Identifier: GPL-3.0-only

//! Capture device abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  Frame pump / UI    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    DeviceHandle     │  ← open/closed state, empty-frame policy
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureBackend trait│
//! └──────────┬──────────┘
//!       ┌────┴─────┐
//!       ▼          ▼
//!    ┌─────┐  ┌─────────┐
//!    │V4L2 │  │Synthetic│
//!    └─────┘  └─────────┘
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod synthetic;
pub mod types;
pub mod v4l2;

pub use frame_loop::{FramePump, PumpState, TickSchedule};
pub use types::*;

use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Result type for backend operations
pub type CameraResult<T> = Result<T, CameraError>;

/// Read failures are logged on the first occurrence and then once per this
/// many consecutive failures.
const READ_ERROR_LOG_EVERY: u64 = 30;

/// A source of frames addressed by a numeric device index
pub trait CaptureBackend: Send {
    /// Acquire the device at `index`
    fn open(&mut self, index: u32) -> CameraResult<()>;

    fn is_open(&self) -> bool;

    /// Read the next frame. Only called while open.
    fn read(&mut self) -> CameraResult<Frame>;

    /// Release the device. Must tolerate being called while closed.
    fn release(&mut self);

    fn backend_type(&self) -> CameraBackendType;
}

/// Which capture backend the application uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// Video4Linux capture devices (/dev/videoN)
    #[default]
    V4l2,
    /// Generated test pattern, no hardware needed
    Synthetic,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Get a concrete backend instance for the given type
pub fn create_backend(backend_type: CameraBackendType) -> Box<dyn CaptureBackend> {
    match backend_type {
        CameraBackendType::V4l2 => Box::new(v4l2::V4l2Backend::new()),
        CameraBackendType::Synthetic => Box::new(synthetic::SyntheticBackend::new()),
    }
}

/// Enumerate capture devices for listings
pub fn enumerate_cameras(backend_type: CameraBackendType) -> Vec<CameraDevice> {
    match backend_type {
        CameraBackendType::V4l2 => v4l2::enumerate_devices(),
        CameraBackendType::Synthetic => vec![synthetic::SyntheticBackend::device()],
    }
}

/// Open/closed state of one capture device.
///
/// Reads never fail from the caller's point of view: a closed device or a
/// failed read yields [`Frame::empty`].
pub struct DeviceHandle {
    id: u32,
    backend: Box<dyn CaptureBackend>,
    consecutive_read_errors: u64,
}

impl DeviceHandle {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            id: 0,
            backend,
            consecutive_read_errors: 0,
        }
    }

    /// Index of the device last passed to [`open`](Self::open)
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn backend_type(&self) -> CameraBackendType {
        self.backend.backend_type()
    }

    /// Try to acquire device `id`. Returns whether the device is usable.
    pub fn open(&mut self, id: u32) -> bool {
        if self.backend.is_open() {
            debug!(old = self.id, new = id, "Reopening capture device");
            self.backend.release();
        }

        self.id = id;
        self.consecutive_read_errors = 0;

        match self.backend.open(id) {
            Ok(()) => {
                info!(id, backend = %self.backend.backend_type(), "Capture device opened");
                true
            }
            Err(e) => {
                warn!(id, error = %e, "Cannot open capture device");
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.backend.is_open()
    }

    /// Read one frame, or the empty sentinel when closed or on failure
    pub fn read_frame(&mut self) -> Frame {
        if !self.backend.is_open() {
            return Frame::empty();
        }

        match self.backend.read() {
            Ok(frame) => {
                self.consecutive_read_errors = 0;
                frame
            }
            Err(e) => {
                if self.consecutive_read_errors % READ_ERROR_LOG_EVERY == 0 {
                    warn!(
                        id = self.id,
                        error = %e,
                        failures = self.consecutive_read_errors + 1,
                        "Error during frame capture"
                    );
                }
                self.consecutive_read_errors += 1;
                Frame::empty()
            }
        }
    }

    /// Release the device. No-op when already closed.
    pub fn release(&mut self) {
        if self.backend.is_open() {
            self.backend.release();
            info!(id = self.id, "Capture device released");
        }
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Device handle shared between the UI thread and the pump worker
#[derive(Clone)]
pub struct SharedDevice(Arc<Mutex<DeviceHandle>>);

impl SharedDevice {
    pub fn new(handle: DeviceHandle) -> Self {
        Self(Arc::new(Mutex::new(handle)))
    }

    /// Lock the handle. A panic on the other side does not make the device
    /// unusable, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, DeviceHandle> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }
}
