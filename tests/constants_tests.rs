// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use cvfx::constants::{self, app_info, palette, surface};

#[test]
fn test_palette_dimensions() {
    assert_eq!(palette::BUTTONS, 6);
    assert_eq!(palette::TOGGLES, 8);
    assert_eq!(palette::SLIDERS, 7);
    assert!(palette::SLIDER_MIN < palette::SLIDER_MAX);
}

#[test]
fn test_info_text_slot_count() {
    assert_eq!(constants::INFO_TEXT_SLOTS, 32);
    assert_eq!(constants::INFO_TEXT_ERROR, "ERROR");
}

#[test]
fn test_side_surfaces_are_half_width() {
    assert_eq!(surface::SIDE_FIT_WIDTH * 2, surface::MAIN_FIT_WIDTH);
}

#[test]
fn test_window_title_contains_version() {
    let title = app_info::window_title("Demo");
    assert!(
        title.ends_with(&format!("{} ]", app_info::version())),
        "unexpected title {:?}",
        title
    );
}
