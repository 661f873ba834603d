// SPDX-License-Identifier: GPL-3.0-only

//! Development playground: copies the capture to every surface and echoes
//! slider A into the status line while enabled.

use crate::app::{Controller, Ui, WidgetId};
use crate::backends::camera::Frame;

#[derive(Debug, Default)]
pub struct DevController {
    show_slider: bool,
}

impl Controller for DevController {
    fn init(&mut self, ui: &mut Ui<'_>) {
        ui.log("Controller init");
        ui.hide(&[WidgetId::Button(0), WidgetId::Button(1)]);
        ui.set_text(WidgetId::Button(0), "Slider ON");
        ui.set_text(WidgetId::Button(1), "Slider OFF");
    }

    fn process(&mut self, main: &mut Frame, alpha: &mut Frame, beta: &mut Frame) {
        alpha.copy_from(main);
        beta.copy_from(main);
    }

    fn button_pressed(&mut self, _ui: &mut Ui<'_>, slot: usize) {
        match slot {
            0 => self.show_slider = true,
            1 => self.show_slider = false,
            _ => {}
        }
    }

    fn slider_changed(&mut self, ui: &mut Ui<'_>, slot: usize, _old: f64, new: f64) {
        if slot == 0 && self.show_slider {
            ui.set_info_text(0, new.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_process_copies_main() {
        let mut main = Frame::from_rgb(RgbImage::from_pixel(3, 2, image::Rgb([7, 8, 9])));
        let (mut alpha, mut beta) = (Frame::empty(), Frame::empty());
        DevController::default().process(&mut main, &mut alpha, &mut beta);
        assert_eq!(alpha, main);
        assert_eq!(beta, main);
    }
}
