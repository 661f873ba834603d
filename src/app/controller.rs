// SPDX-License-Identifier: GPL-3.0-only

//! Application extension point
//!
//! A concrete application implements [`Controller`]. The runtime calls the
//! lifecycle hooks and input handlers on the UI thread, and
//! [`Controller::process`] on the frame pump worker for every non-empty
//! frame. Handlers receive a [`Ui`] to change widgets, info text and render
//! flags.

use super::info_text::InfoText;
use super::state::RenderFlags;
use super::visibility::{RegistryBuilder, VisibilityRegistry, WidgetId, Widgets};
use crate::backends::camera::{Frame, RenderTarget};
use tracing::{debug, info};

/// User processing and UI logic of one application
pub trait Controller: Send {
    /// Hidable widgets of this application's view
    fn visibility(&self) -> RegistryBuilder {
        VisibilityRegistry::standard()
    }

    /// Runs once the widgets and the visibility registry exist
    fn init(&mut self, ui: &mut Ui<'_>);

    /// Runs once after the window is first shown
    fn on_shown(&mut self, _ui: &mut Ui<'_>) {}

    /// Runs when the window closes, after the camera has been stopped
    fn on_close(&mut self) {}

    /// Process one captured frame.
    ///
    /// `main` holds the capture; `alpha` and `beta` start empty. Every
    /// buffer left non-empty is rendered on its surface if enabled.
    fn process(&mut self, main: &mut Frame, alpha: &mut Frame, beta: &mut Frame);

    fn button_pressed(&mut self, _ui: &mut Ui<'_>, _slot: usize) {}

    fn toggle_changed(&mut self, _ui: &mut Ui<'_>, _slot: usize, _selected: bool) {}

    fn slider_changed(&mut self, _ui: &mut Ui<'_>, _slot: usize, _old: f64, _new: f64) {}
}

/// Widget access handed to controller hooks on the UI thread
pub struct Ui<'a> {
    widgets: &'a mut Widgets,
    registry: &'a VisibilityRegistry,
    info: &'a InfoText,
    flags: &'a RenderFlags,
    logging_active: bool,
}

impl<'a> Ui<'a> {
    pub fn new(
        widgets: &'a mut Widgets,
        registry: &'a VisibilityRegistry,
        info: &'a InfoText,
        flags: &'a RenderFlags,
        logging_active: bool,
    ) -> Self {
        Self {
            widgets,
            registry,
            info,
            flags,
            logging_active,
        }
    }

    pub fn show(&mut self, ids: &[WidgetId]) {
        self.registry.show(self.widgets, ids);
    }

    pub fn hide(&mut self, ids: &[WidgetId]) {
        self.registry.hide(self.widgets, ids);
    }

    pub fn hide_all(&mut self) {
        self.registry.hide_all(self.widgets);
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.widgets.is_visible(id)
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) {
        self.widgets.set_text(id, text);
    }

    pub fn text(&self, id: WidgetId) -> &str {
        self.widgets.text(id)
    }

    /// Set the range of slider `slot`, clamping its current value into it
    pub fn set_slider_range(&mut self, slot: usize, min: f64, max: f64) {
        if let Some(state) = self.widgets.get_mut(WidgetId::Slider(slot)) {
            state.min = min.min(max);
            state.max = max.max(min);
            state.value = state.value.clamp(state.min, state.max);
        }
    }

    /// Set slider `slot` without firing the change handler
    pub fn set_slider_value(&mut self, slot: usize, value: f64) {
        if let Some(state) = self.widgets.get_mut(WidgetId::Slider(slot)) {
            state.value = value.clamp(state.min, state.max);
        }
    }

    pub fn slider_value(&self, slot: usize) -> f64 {
        self.widgets
            .get(WidgetId::Slider(slot))
            .map(|s| s.value)
            .unwrap_or_default()
    }

    /// Select toggle `slot` without firing the change handler
    pub fn set_toggle(&mut self, slot: usize, selected: bool) {
        if let Some(state) = self.widgets.get_mut(WidgetId::Toggle(slot)) {
            state.selected = selected;
        }
    }

    pub fn is_toggle_selected(&self, slot: usize) -> bool {
        self.widgets
            .get(WidgetId::Toggle(slot))
            .map(|s| s.selected)
            .unwrap_or(false)
    }

    pub fn set_info_text(&mut self, position: usize, text: impl Into<String>) {
        self.info.set(position, text);
    }

    pub fn info_text(&self, position: usize) -> String {
        self.info.get(position)
    }

    /// Shared handle for publishing info text from `process`
    pub fn info_handle(&self) -> InfoText {
        self.info.clone()
    }

    pub fn set_render_active(&mut self, target: RenderTarget, active: bool) {
        self.flags.set_active(target, active);
        if let Some(state) = self.widgets.get_mut(WidgetId::RenderToggle(target)) {
            state.selected = active;
        }
    }

    pub fn is_render_active(&self, target: RenderTarget) -> bool {
        self.flags.is_active(target)
    }

    /// Controller log line, suppressed while runtime logging is off
    pub fn log(&self, message: &str) {
        if self.logging_active {
            info!(target: "controller", "{}", message);
        } else {
            debug!(target: "controller", "{}", message);
        }
    }
}
