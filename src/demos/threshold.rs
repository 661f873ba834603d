// SPDX-License-Identifier: GPL-3.0-only

//! Grayscale in alpha, binary threshold in beta. Slider A sets the level.

use crate::app::{Controller, Ui, WidgetId};
use crate::backends::camera::{Frame, RenderTarget};
use image::{GrayImage, Luma};

const DEFAULT_LEVEL: u8 = 128;

#[derive(Debug)]
pub struct ThresholdController {
    level: u8,
}

impl Default for ThresholdController {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

/// Pixels above `level` become white, everything else black
pub fn binary_threshold(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

impl Controller for ThresholdController {
    fn init(&mut self, ui: &mut Ui<'_>) {
        ui.hide_all();
        ui.show(&[WidgetId::Slider(0)]);
        ui.set_text(WidgetId::SliderLabel(0), "Threshold");
        ui.set_slider_range(0, 0.0, 255.0);
        ui.set_slider_value(0, f64::from(self.level));
        ui.set_render_active(RenderTarget::Alpha, true);
        ui.set_render_active(RenderTarget::Beta, true);
    }

    fn process(&mut self, main: &mut Frame, alpha: &mut Frame, beta: &mut Frame) {
        let gray = image::imageops::grayscale(main.image());
        *beta = Frame::from_luma(&binary_threshold(&gray, self.level));
        *alpha = Frame::from_luma(&gray);
    }

    fn slider_changed(&mut self, ui: &mut Ui<'_>, slot: usize, _old: f64, new: f64) {
        if slot != 0 {
            return;
        }
        self.level = new.round().clamp(0.0, 255.0) as u8;
        ui.set_info_text(0, format!("threshold: {}", self.level));
    }
}
