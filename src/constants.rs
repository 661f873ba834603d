// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Product name shown in the window title
pub const APP_NAME: &str = "CVFX";

/// Target interval between two frame pump ticks (about 30 Hz)
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);

/// Number of independently settable info text slots
pub const INFO_TEXT_SLOTS: usize = 32;

/// Value returned when reading an info text slot that does not exist
pub const INFO_TEXT_ERROR: &str = "ERROR";

/// Status line prefix while the frame pump is running
pub const STATUS_RENDERING_ACTIVE: &str = "[ Rendering Active ] ";

/// Status line prefix while the frame pump is idle
pub const STATUS_RENDERING_STOPPED: &str = "[ Rendering stopped ] ";

/// Capture trigger label while the camera is running
pub const CAMERA_BUTTON_STOP: &str = "Stop Camera";

/// Capture trigger label after a failed open
pub const CAMERA_BUTTON_ERROR: &str = "ERROR";

/// Palette dimensions of the standard view.
pub mod palette {
    /// Buttons A-F
    pub const BUTTONS: usize = 6;
    /// Toggles A-H
    pub const TOGGLES: usize = 8;
    /// Sliders A-G (each paired with a label)
    pub const SLIDERS: usize = 7;

    /// Default slider range
    pub const SLIDER_MIN: f64 = 0.0;
    pub const SLIDER_MAX: f64 = 100.0;

    /// Letter used in widget identifiers for a palette slot (`0` -> `A`)
    pub fn slot_letter(slot: usize) -> char {
        (b'A' + (slot % 26) as u8) as char
    }
}

/// Fit widths of the render surfaces in pixels (aspect ratio preserved)
pub mod surface {
    pub const MAIN_FIT_WIDTH: u32 = 640;
    pub const SIDE_FIT_WIDTH: u32 = 320;
}

/// Application information utilities
pub mod app_info {
    /// Application version from the build environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Compose the window title from the optional application title.
    ///
    /// An empty title leaves only the product segment.
    pub fn window_title(title: &str) -> String {
        format!("{} [ {} {} ]", title, super::APP_NAME, version())
            .trim_start()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_letters() {
        assert_eq!(palette::slot_letter(0), 'A');
        assert_eq!(palette::slot_letter(5), 'F');
        assert_eq!(palette::slot_letter(7), 'H');
    }

    #[test]
    fn test_tick_interval_is_about_thirty_hertz() {
        let per_second = 1000 / TICK_INTERVAL.as_millis();
        assert_eq!(per_second, 30);
    }

    #[test]
    fn test_window_title_with_and_without_title() {
        let titled = app_info::window_title("Circle");
        assert!(titled.starts_with("Circle [ CVFX "));
        let untitled = app_info::window_title("");
        assert!(untitled.starts_with("[ CVFX "));
    }
}
