// SPDX-License-Identifier: GPL-3.0-only

//! Horizontal flip of the main surface, switched by toggle A

use crate::app::{Controller, Ui, WidgetId};
use crate::backends::camera::Frame;

#[derive(Debug, Default)]
pub struct MirrorController {
    mirrored: bool,
}

impl Controller for MirrorController {
    fn init(&mut self, ui: &mut Ui<'_>) {
        ui.hide_all();
        ui.show(&[WidgetId::Toggle(0)]);
        ui.set_text(WidgetId::Toggle(0), "Mirror");
    }

    fn process(&mut self, main: &mut Frame, _alpha: &mut Frame, _beta: &mut Frame) {
        if self.mirrored {
            image::imageops::flip_horizontal_in_place(main.image_mut());
        }
    }

    fn toggle_changed(&mut self, ui: &mut Ui<'_>, slot: usize, selected: bool) {
        if slot == 0 {
            self.mirrored = selected;
            ui.set_info_text(0, if selected { "mirrored" } else { "" });
        }
    }
}
