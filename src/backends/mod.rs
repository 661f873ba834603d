// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for frame capture
//!
//! # Modules
//!
//! - [`camera`]: Capture backends, the device handle and the frame pump

pub mod camera;
