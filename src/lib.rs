// SPDX-License-Identifier: GPL-3.0-only

//! CVFX - an application skeleton for interactive, camera-driven vision tools
//!
//! A fixed-rate frame pump reads from a capture device and hands every frame
//! to user processing code. The results are marshaled to the UI thread and
//! shown on up to three surfaces, while a registry of hidable widgets lets
//! each application trim the control palette to what it needs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Runtime, controller trait, bootstrap wiring and widget registry
//! - [`backends`]: Capture device abstraction and the frame pump
//! - [`demos`]: Bundled applications
//! - [`terminal`]: Terminal front end
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // Applications are run through the binary:
//! // cvfx run threshold --synthetic
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod demos;
pub mod errors;
pub mod terminal;

// Re-export commonly used types
pub use app::{App, AppSettings, Controller, Ui};
pub use backends::camera::{Frame, RenderTarget};
pub use config::Config;
