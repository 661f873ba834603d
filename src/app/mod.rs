// SPDX-License-Identifier: GPL-3.0-only

//! Application runtime
//!
//! [`App`] composes the capture device, the frame pump, the render marshaler,
//! the widget palette and a [`Controller`]. It lives on the UI thread; the
//! only state it shares with the pump worker is the device handle, the
//! controller, the render flags, the info text and the sending half of the
//! render channel.
//!
//! # Modules
//!
//! - `bootstrap`: application descriptors and controller resolution
//! - `controller`: the extension trait and the [`Ui`] handle
//! - `info_text`: status line text slots
//! - `render`: worker to UI hand-off with latest-per-target coalescing
//! - `state`: lifecycle and render enable flags
//! - `visibility`: widget palette and the hide/show registry

pub mod bootstrap;
pub mod controller;
pub mod info_text;
pub mod render;
pub mod state;
pub mod visibility;

pub use bootstrap::{AppDescriptor, AppRegistry, ControllerBinding, EntryPoint, ResolvedApp};
pub use controller::{Controller, Ui};
pub use info_text::InfoText;
pub use render::{RenderReceiver, RenderSender, Surfaces};
pub use state::{Lifecycle, RenderFlags};
pub use visibility::{ViewLayout, VisibilityRegistry, WidgetId, Widgets};

use crate::backends::camera::frame_loop::StopOutcome;
use crate::backends::camera::{
    CaptureBackend, DeviceHandle, FramePump, FrameTriple, PumpState, RenderTarget, SharedDevice,
};
use crate::config::Config;
use crate::constants::surface::{MAIN_FIT_WIDTH, SIDE_FIT_WIDTH};
use crate::constants::{
    CAMERA_BUTTON_ERROR, CAMERA_BUTTON_STOP, STATUS_RENDERING_ACTIVE, STATUS_RENDERING_STOPPED,
    TICK_INTERVAL,
};
use crate::errors::{CameraError, ViewError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controller shared between UI handlers and pump ticks
pub type SharedController = Arc<Mutex<Box<dyn Controller>>>;

/// Reads attempted by [`App::capture_once`] before giving up
const CAPTURE_ONCE_ATTEMPTS: usize = 10;

fn lock_controller(controller: &SharedController) -> MutexGuard<'_, Box<dyn Controller>> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runtime settings derived from [`Config`] and command line flags
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub camera_id: u32,
    pub tick_interval: Duration,
    pub logging_active: bool,
    pub render: [bool; 3],
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            camera_id: 0,
            tick_interval: TICK_INTERVAL,
            logging_active: true,
            render: [true, false, false],
        }
    }
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            camera_id: config.camera_id,
            tick_interval: config.tick_interval(),
            logging_active: config.logging_active,
            render: RenderTarget::ALL.map(|t| config.render_default(t)),
        }
    }
}

/// Counters updated by the pump worker
#[derive(Debug, Default)]
struct TickCounters {
    ticks: AtomicU64,
    processed: AtomicU64,
    skipped: AtomicU64,
    posted: AtomicU64,
}

/// Snapshot of the pump counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks executed
    pub ticks: u64,
    /// Ticks that invoked the processing callback
    pub processed: u64,
    /// Ticks skipped because the device returned an empty frame
    pub skipped: u64,
    /// Buffers posted to the render marshaler
    pub posted: u64,
}

/// The running application
pub struct App {
    name: &'static str,
    window_title: String,
    controller_type: &'static str,
    lifecycle: Lifecycle,
    controller: SharedController,
    device: SharedDevice,
    pump: FramePump,
    render_tx: RenderSender,
    render_rx: RenderReceiver,
    surfaces: Surfaces,
    flags: RenderFlags,
    info: InfoText,
    widgets: Widgets,
    registry: VisibilityRegistry,
    counters: Arc<TickCounters>,
    camera_id: u32,
    camera_error: bool,
    logging_active: bool,
}

impl App {
    /// Wire a resolved application to a view and a capture backend.
    ///
    /// Fails when the view lacks a required widget.
    pub fn new(
        resolved: ResolvedApp,
        layout: &ViewLayout,
        backend: Box<dyn CaptureBackend>,
        settings: AppSettings,
    ) -> Result<Self, ViewError> {
        layout.validate_required()?;

        let window_title = resolved.window_title();
        let (render_tx, render_rx) = render::channel();
        let [main, alpha, beta] = settings.render;

        let mut widgets = Widgets::from_layout(layout);
        for (target, width) in [
            (RenderTarget::Main, MAIN_FIT_WIDTH),
            (RenderTarget::Alpha, SIDE_FIT_WIDTH),
            (RenderTarget::Beta, SIDE_FIT_WIDTH),
        ] {
            if let Some(view) = widgets.get_mut(WidgetId::View(target)) {
                view.fit_width = width;
            }
            if let Some(toggle) = widgets.get_mut(WidgetId::RenderToggle(target)) {
                toggle.selected = settings.render[target.index()];
            }
        }

        let mut app = Self {
            name: resolved.name,
            window_title,
            controller_type: resolved.controller_type,
            lifecycle: Lifecycle::Constructed,
            controller: Arc::new(Mutex::new(resolved.controller)),
            device: SharedDevice::new(DeviceHandle::new(backend)),
            pump: FramePump::new(&format!("cvfx-pump-{}", resolved.name), settings.tick_interval),
            render_tx,
            render_rx,
            surfaces: Surfaces::new(),
            flags: RenderFlags::new(main, alpha, beta),
            info: InfoText::new(),
            widgets,
            registry: VisibilityRegistry::default(),
            counters: Arc::new(TickCounters::default()),
            camera_id: settings.camera_id,
            camera_error: false,
            logging_active: settings.logging_active,
        };
        app.refresh_camera_button();

        if app.logging_active {
            info!(target: "app", app = app.name, controller = app.controller_type, "Application constructed");
        }
        Ok(app)
    }

    /// Build the visibility registry and run the controller's init hook.
    ///
    /// Calling this twice is a no-op.
    pub fn initialize(&mut self) -> Result<(), ViewError> {
        if self.lifecycle != Lifecycle::Constructed {
            return Ok(());
        }

        let builder = lock_controller(&self.controller).visibility();
        self.registry = builder.build(&self.widgets)?;

        self.with_ui(|controller, ui| controller.init(ui));
        self.lifecycle = Lifecycle::Initialized;
        self.log("Controller initialized");
        Ok(())
    }

    /// The window became visible for the first time
    pub fn shown(&mut self) {
        if self.lifecycle != Lifecycle::Initialized {
            return;
        }
        self.with_ui(|controller, ui| controller.on_shown(ui));
        self.lifecycle = Lifecycle::Active;
        self.log("Window shown");
    }

    fn with_ui<R>(&mut self, f: impl FnOnce(&mut dyn Controller, &mut Ui<'_>) -> R) -> R {
        let mut controller = lock_controller(&self.controller);
        let mut ui = Ui::new(
            &mut self.widgets,
            &self.registry,
            &self.info,
            &self.flags,
            self.logging_active,
        );
        f(&mut **controller, &mut ui)
    }

    fn log(&self, message: &str) {
        if self.logging_active {
            info!(target: "app", app = self.name, "{}", message);
        }
    }

    /// Closure run by the pump worker on every tick
    fn tick_fn(&self) -> impl FnMut() + Send + 'static {
        let device = self.device.clone();
        let controller = Arc::clone(&self.controller);
        let flags = self.flags.clone();
        let tx = self.render_tx.clone();
        let counters = Arc::clone(&self.counters);

        move || {
            counters.ticks.fetch_add(1, Ordering::Relaxed);

            let frame = device.lock().read_frame();
            if frame.is_empty() {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }

            let mut triple = FrameTriple::from_capture(frame);
            {
                let mut controller = lock_controller(&controller);
                controller.process(&mut triple.main, &mut triple.alpha, &mut triple.beta);
            }
            counters.processed.fetch_add(1, Ordering::Relaxed);

            for (target, frame) in triple.into_non_empty() {
                if flags.is_active(target) && tx.post(target, frame) {
                    counters.posted.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Open the selected device and start the pump.
    ///
    /// No-op while the camera is active. A failed open leaves the pump idle
    /// and puts the error label on the capture trigger.
    pub fn start_camera(&mut self) -> bool {
        if self.is_camera_active() {
            debug!(target: "app", "Camera already active");
            return false;
        }

        let opened = self.device.lock().open(self.camera_id);
        if !opened {
            warn!(target: "app", camera_id = self.camera_id, "CANNOT OPEN CAMERA");
            self.camera_error = true;
            self.refresh_camera_button();
            return false;
        }

        let tick = self.tick_fn();
        if !self.pump.start(tick) {
            self.device.lock().release();
            self.camera_error = true;
            self.refresh_camera_button();
            return false;
        }

        self.camera_error = false;
        self.refresh_camera_button();
        self.log("Rendering started");
        true
    }

    /// Stop the pump, then release the device. Safe to call while idle.
    pub fn stop_camera(&mut self) -> StopOutcome {
        let outcome = self.pump.stop();
        self.device.lock().release();
        self.refresh_camera_button();
        if outcome != StopOutcome::AlreadyIdle {
            self.log("Rendering stopped");
        }
        outcome
    }

    /// The capture trigger action
    pub fn toggle_camera(&mut self) {
        if self.is_camera_active() {
            self.stop_camera();
        } else {
            self.start_camera();
        }
    }

    pub fn increase_camera(&mut self) {
        if self.is_camera_active() {
            self.stop_camera();
        }
        self.camera_id = self.camera_id.saturating_add(1);
        self.camera_error = false;
        self.refresh_camera_button();
    }

    /// Select the previous device; the id never goes below zero
    pub fn decrease_camera(&mut self) {
        if self.is_camera_active() {
            self.stop_camera();
        }
        self.camera_id = self.camera_id.saturating_sub(1);
        self.camera_error = false;
        self.refresh_camera_button();
    }

    fn refresh_camera_button(&mut self) {
        let text = if self.is_camera_active() {
            CAMERA_BUTTON_STOP.to_string()
        } else if self.camera_error {
            CAMERA_BUTTON_ERROR.to_string()
        } else {
            format!("Start Camera {}", self.camera_id)
        };
        self.widgets.set_text(WidgetId::CameraButton, text);
    }

    pub fn set_render_active(&mut self, target: RenderTarget, active: bool) {
        self.with_ui(|_, ui| ui.set_render_active(target, active));
    }

    pub fn press_button(&mut self, slot: usize) {
        self.with_ui(|controller, ui| controller.button_pressed(ui, slot));
    }

    /// Change toggle `slot` and fire its handler
    pub fn set_toggle(&mut self, slot: usize, selected: bool) {
        let Some(state) = self.widgets.get_mut(WidgetId::Toggle(slot)) else {
            warn!(target: "app", slot, "No such toggle in view");
            return;
        };
        state.selected = selected;
        self.with_ui(|controller, ui| controller.toggle_changed(ui, slot, selected));
    }

    /// Move slider `slot` and fire its handler if the value changed
    pub fn set_slider(&mut self, slot: usize, value: f64) {
        let Some(state) = self.widgets.get_mut(WidgetId::Slider(slot)) else {
            warn!(target: "app", slot, "No such slider in view");
            return;
        };
        let old = state.value;
        let new = value.clamp(state.min, state.max);
        if old == new {
            return;
        }
        state.value = new;
        self.with_ui(|controller, ui| controller.slider_changed(ui, slot, old, new));
    }

    /// Move slider `slot` by a fraction of its range
    pub fn nudge_slider(&mut self, slot: usize, fraction: f64) {
        if let Some(state) = self.widgets.get(WidgetId::Slider(slot)) {
            let value = state.value + (state.max - state.min) * fraction;
            self.set_slider(slot, value);
        }
    }

    /// Activate a widget as if clicked
    pub fn activate(&mut self, id: WidgetId) {
        match id {
            WidgetId::CameraButton => self.toggle_camera(),
            WidgetId::CameraDecrease => self.decrease_camera(),
            WidgetId::CameraIncrease => self.increase_camera(),
            WidgetId::RenderToggle(target) => {
                let active = !self.flags.is_active(target);
                self.set_render_active(target, active);
            }
            WidgetId::Button(slot) => self.press_button(slot),
            WidgetId::Toggle(slot) => {
                let selected = self
                    .widgets
                    .get(id)
                    .map(|s| !s.selected)
                    .unwrap_or(true);
                self.set_toggle(slot, selected);
            }
            WidgetId::Slider(_) | WidgetId::SliderLabel(_) | WidgetId::View(_) | WidgetId::InfoLabel => {}
        }
    }

    /// Apply pending renders on the UI thread. Returns whether a surface changed.
    pub fn update_ui(&mut self) -> bool {
        if self.pump.state() == PumpState::Running && !self.pump.is_worker_alive() {
            warn!(target: "app", "Frame pump worker ended unexpectedly");
            self.stop_camera();
        }
        let pending = self.render_rx.drain();
        self.surfaces.apply(pending)
    }

    /// Status prefix followed by the concatenated info text
    pub fn status_text(&self) -> String {
        let prefix = if self.is_camera_active() {
            STATUS_RENDERING_ACTIVE
        } else {
            STATUS_RENDERING_STOPPED
        };
        format!("{}{}", prefix, self.info.concatenated())
    }

    /// Open the device, process a single frame, and release it again.
    ///
    /// Only valid while the pump is idle.
    pub fn capture_once(&mut self) -> Result<FrameTriple, CameraError> {
        if self.is_camera_active() {
            return Err(CameraError::Busy(self.camera_id));
        }

        let mut device = self.device.lock();
        if !device.open(self.camera_id) {
            return Err(CameraError::NotFound(self.camera_id));
        }
        let frame = (0..CAPTURE_ONCE_ATTEMPTS)
            .map(|_| device.read_frame())
            .find(|f| !f.is_empty());
        device.release();
        drop(device);

        let frame = frame.ok_or_else(|| {
            CameraError::ReadFailed(format!("no frame after {} attempts", CAPTURE_ONCE_ATTEMPTS))
        })?;

        let mut triple = FrameTriple::from_capture(frame);
        lock_controller(&self.controller).process(&mut triple.main, &mut triple.alpha, &mut triple.beta);
        Ok(triple)
    }

    /// Tear down: stop the pump, release the device, run the close hook.
    ///
    /// Idempotent.
    pub fn close(&mut self) {
        if self.lifecycle == Lifecycle::Closed {
            return;
        }
        self.stop_camera();
        lock_controller(&self.controller).on_close();
        self.lifecycle = Lifecycle::Closed;
        self.log("Application closed");
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_camera_active(&self) -> bool {
        self.pump.state() == PumpState::Running
    }

    pub fn is_device_open(&self) -> bool {
        self.device.is_open()
    }

    pub fn camera_id(&self) -> u32 {
        self.camera_id
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn registry(&self) -> &VisibilityRegistry {
        &self.registry
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    pub fn info_text(&self) -> &InfoText {
        &self.info
    }

    pub fn render_flags(&self) -> &RenderFlags {
        &self.flags
    }

    pub fn tick_interval(&self) -> Duration {
        self.pump.interval()
    }

    pub fn logging_active(&self) -> bool {
        self.logging_active
    }

    pub fn set_logging_active(&mut self, active: bool) {
        self.logging_active = active;
    }

    pub fn tick_stats(&self) -> TickStats {
        TickStats {
            ticks: self.counters.ticks.load(Ordering::Relaxed),
            processed: self.counters.processed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            posted: self.counters.posted.load(Ordering::Relaxed),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::Frame;
    use crate::backends::camera::testing::{ReadBehavior, ScriptedBackend};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        processed: Arc<AtomicUsize>,
    }

    impl Controller for Recorder {
        fn init(&mut self, ui: &mut Ui<'_>) {
            self.calls.lock().unwrap().push("init".into());
            ui.set_text(WidgetId::Button(0), "Go");
        }

        fn on_shown(&mut self, _ui: &mut Ui<'_>) {
            self.calls.lock().unwrap().push("shown".into());
        }

        fn on_close(&mut self) {
            self.calls.lock().unwrap().push("close".into());
        }

        fn process(&mut self, main: &mut Frame, alpha: &mut Frame, _beta: &mut Frame) {
            self.processed.fetch_add(1, Ordering::SeqCst);
            alpha.copy_from(main);
        }

        fn button_pressed(&mut self, _ui: &mut Ui<'_>, slot: usize) {
            self.calls.lock().unwrap().push(format!("button {}", slot));
        }

        fn slider_changed(&mut self, _ui: &mut Ui<'_>, slot: usize, old: f64, new: f64) {
            self.calls.lock().unwrap().push(format!("slider {} {} {}", slot, old, new));
        }
    }

    fn app_with(behavior: ReadBehavior, accept_open: bool) -> (App, Arc<Mutex<Vec<String>>>) {
        let recorder = Recorder::default();
        let calls = Arc::clone(&recorder.calls);
        let resolved = ResolvedApp {
            name: "test",
            controller: Box::new(recorder),
            controller_type: "Recorder",
            title: "Test",
        };
        let (mut backend, _) = ScriptedBackend::new(behavior);
        backend.accept_open = accept_open;
        let settings = AppSettings {
            tick_interval: Duration::from_millis(5),
            ..AppSettings::default()
        };
        let mut app = App::new(resolved, &ViewLayout::standard(), Box::new(backend), settings).unwrap();
        app.initialize().unwrap();
        app.shown();
        (app, calls)
    }

    #[test]
    fn test_lifecycle_hooks_in_order() {
        let (mut app, calls) = app_with(ReadBehavior::Frames, true);
        assert_eq!(app.lifecycle(), Lifecycle::Active);
        assert_eq!(app.widgets().text(WidgetId::Button(0)), "Go");

        app.close();
        app.close();
        assert_eq!(app.lifecycle(), Lifecycle::Closed);
        assert_eq!(*calls.lock().unwrap(), vec!["init", "shown", "close"]);
    }

    #[test]
    fn test_camera_button_text_follows_state() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        assert_eq!(app.widgets().text(WidgetId::CameraButton), "Start Camera 0");

        assert!(app.start_camera());
        assert_eq!(app.widgets().text(WidgetId::CameraButton), "Stop Camera");

        app.increase_camera();
        assert!(!app.is_camera_active());
        assert!(!app.is_device_open());
        assert_eq!(app.widgets().text(WidgetId::CameraButton), "Start Camera 1");

        app.decrease_camera();
        app.decrease_camera();
        assert_eq!(app.camera_id(), 0);
    }

    #[test]
    fn test_failed_open_shows_error() {
        let (mut app, _) = app_with(ReadBehavior::Frames, false);
        assert!(!app.start_camera());
        assert!(!app.is_camera_active());
        assert_eq!(app.widgets().text(WidgetId::CameraButton), "ERROR");
    }

    #[test]
    fn test_start_is_noop_while_running() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        assert!(app.start_camera());
        assert!(!app.start_camera());
        assert_ne!(app.stop_camera(), StopOutcome::AlreadyIdle);
        assert_eq!(app.stop_camera(), StopOutcome::AlreadyIdle);
    }

    #[test]
    fn test_empty_frames_skip_processing() {
        let (mut app, _) = app_with(ReadBehavior::Empty, true);
        app.start_camera();
        std::thread::sleep(Duration::from_millis(60));
        app.stop_camera();

        let stats = app.tick_stats();
        assert!(stats.ticks > 0);
        assert_eq!(stats.skipped, stats.ticks);
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.posted, 0);
        assert!(!app.update_ui());
    }

    #[test]
    fn test_disabled_targets_are_not_posted() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        app.start_camera();
        std::thread::sleep(Duration::from_millis(40));
        app.stop_camera();

        let stats = app.tick_stats();
        assert!(stats.processed > 0);
        // Only main is enabled; alpha was filled but must not be forwarded
        assert_eq!(stats.posted, stats.processed);

        assert!(app.update_ui());
        assert!(!app.surfaces().frame(RenderTarget::Main).is_empty());
        assert!(app.surfaces().frame(RenderTarget::Alpha).is_empty());
    }

    #[test]
    fn test_input_handlers() {
        let (mut app, calls) = app_with(ReadBehavior::Frames, true);
        app.activate(WidgetId::Button(2));
        app.set_slider(1, 40.0);
        app.set_slider(1, 40.0);
        app.set_slider(1, 500.0);

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[2..],
            ["button 2", "slider 1 0 40", "slider 1 40 100"].map(String::from)
        );
    }

    #[test]
    fn test_render_toggle_activation() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        app.activate(WidgetId::RenderToggle(RenderTarget::Beta));
        assert!(app.render_flags().is_active(RenderTarget::Beta));
        app.activate(WidgetId::RenderToggle(RenderTarget::Beta));
        assert!(!app.render_flags().is_active(RenderTarget::Beta));
    }

    #[test]
    fn test_status_text() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        app.info_text().set(0, "hello");
        assert_eq!(app.status_text(), "[ Rendering stopped ] hello");
        app.start_camera();
        assert_eq!(app.status_text(), "[ Rendering Active ] hello");
    }

    #[test]
    fn test_capture_once_releases_device() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        let triple = app.capture_once().unwrap();
        assert!(!triple.main.is_empty());
        assert!(!triple.alpha.is_empty());
        assert!(triple.beta.is_empty());
        assert!(!app.is_device_open());
    }

    #[test]
    fn test_capture_once_refused_while_running() {
        let (mut app, _) = app_with(ReadBehavior::Frames, true);
        assert!(app.start_camera());
        let err = app.capture_once().unwrap_err();
        assert!(matches!(err, CameraError::Busy(id) if id == app.camera_id()));
        assert!(app.is_camera_active());
        app.close();
    }
}
