// SPDX-License-Identifier: GPL-3.0-only

//! Application descriptors and controller resolution
//!
//! Every application is described statically: a name, an optional entry
//! point, and on that entry point an optional controller binding and title.
//! Resolution fails fast on any gap; those are configuration defects, not
//! runtime conditions.

use super::controller::Controller;
use crate::constants::app_info;
use crate::errors::BootstrapError;
use tracing::{debug, error};

/// Constructs a controller
pub type ControllerFactory = fn() -> anyhow::Result<Box<dyn Controller>>;

/// Binds a controller type to its factory
#[derive(Clone, Copy)]
pub struct ControllerBinding {
    pub type_name: &'static str,
    pub factory: ControllerFactory,
}

impl ControllerBinding {
    /// Binding for a controller built with `Default`
    pub fn of<C: Controller + Default + 'static>() -> Self {
        fn build<C: Controller + Default + 'static>() -> anyhow::Result<Box<dyn Controller>> {
            Ok(Box::new(C::default()))
        }
        Self {
            type_name: std::any::type_name::<C>(),
            factory: build::<C>,
        }
    }

    pub fn with_factory(type_name: &'static str, factory: ControllerFactory) -> Self {
        Self { type_name, factory }
    }
}

impl std::fmt::Debug for ControllerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerBinding")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Metadata of the designated entry point
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPoint {
    pub controller: Option<ControllerBinding>,
    pub title: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct AppDescriptor {
    pub name: &'static str,
    pub entry: Option<EntryPoint>,
}

impl AppDescriptor {
    /// Title shown in listings, empty when none is declared
    pub fn title(&self) -> &'static str {
        self.entry.and_then(|e| e.title).unwrap_or("")
    }
}

/// Controller and title produced by a successful resolution
pub struct ResolvedApp {
    pub name: &'static str,
    pub controller: Box<dyn Controller>,
    pub controller_type: &'static str,
    pub title: &'static str,
}

impl ResolvedApp {
    pub fn window_title(&self) -> String {
        app_info::window_title(self.title)
    }
}

impl std::fmt::Debug for ResolvedApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedApp")
            .field("name", &self.name)
            .field("controller_type", &self.controller_type)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Static table of known applications
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    apps: Vec<AppDescriptor>,
}

impl AppRegistry {
    pub fn new(apps: Vec<AppDescriptor>) -> Self {
        Self { apps }
    }

    pub fn apps(&self) -> &[AppDescriptor] {
        &self.apps
    }

    pub fn find(&self, name: &str) -> Option<&AppDescriptor> {
        self.apps.iter().find(|a| a.name == name)
    }

    /// Resolve `name` into a constructed controller and its title
    pub fn resolve(&self, name: &str) -> Result<ResolvedApp, BootstrapError> {
        let app = self
            .find(name)
            .ok_or_else(|| BootstrapError::UnknownApp(name.to_string()))?;
        let entry = app
            .entry
            .ok_or_else(|| BootstrapError::NoEntryPoint(app.name.to_string()))?;
        let binding = entry
            .controller
            .ok_or_else(|| BootstrapError::NoControllerBinding(app.name.to_string()))?;

        let controller = (binding.factory)().map_err(|source| {
            error!(
                target: "app",
                controller = binding.type_name,
                error = ?source,
                "Controller construction failed"
            );
            BootstrapError::ControllerConstruction {
                controller: binding.type_name,
                source,
            }
        })?;

        let title = entry.title.unwrap_or("");
        debug!(target: "app", app = app.name, controller = binding.type_name, title, "Resolved application");

        Ok(ResolvedApp {
            name: app.name,
            controller,
            controller_type: binding.type_name,
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controller::Ui;
    use crate::backends::camera::Frame;

    #[derive(Default)]
    struct Noop;

    impl Controller for Noop {
        fn init(&mut self, _ui: &mut Ui<'_>) {}
        fn process(&mut self, _main: &mut Frame, _alpha: &mut Frame, _beta: &mut Frame) {}
    }

    fn broken() -> anyhow::Result<Box<dyn Controller>> {
        anyhow::bail!("calibration file missing")
    }

    fn registry() -> AppRegistry {
        AppRegistry::new(vec![
            AppDescriptor {
                name: "ok",
                entry: Some(EntryPoint {
                    controller: Some(ControllerBinding::of::<Noop>()),
                    title: Some("Okay"),
                }),
            },
            AppDescriptor {
                name: "untitled",
                entry: Some(EntryPoint {
                    controller: Some(ControllerBinding::of::<Noop>()),
                    title: None,
                }),
            },
            AppDescriptor { name: "no-entry", entry: None },
            AppDescriptor {
                name: "no-binding",
                entry: Some(EntryPoint::default()),
            },
            AppDescriptor {
                name: "broken",
                entry: Some(EntryPoint {
                    controller: Some(ControllerBinding::with_factory("Broken", broken)),
                    title: None,
                }),
            },
        ])
    }

    #[test]
    fn test_resolve_with_title() {
        let app = registry().resolve("ok").unwrap();
        assert_eq!(app.title, "Okay");
        assert!(app.controller_type.ends_with("Noop"));
        assert!(app.window_title().starts_with("Okay [ CVFX "));
    }

    #[test]
    fn test_missing_title_is_empty() {
        let app = registry().resolve("untitled").unwrap();
        assert_eq!(app.title, "");
        assert!(app.window_title().starts_with("[ CVFX "));
    }

    #[test]
    fn test_failures_are_distinct() {
        let reg = registry();
        assert!(matches!(reg.resolve("nope"), Err(BootstrapError::UnknownApp(_))));
        assert!(matches!(reg.resolve("no-entry"), Err(BootstrapError::NoEntryPoint(_))));
        assert!(matches!(
            reg.resolve("no-binding"),
            Err(BootstrapError::NoControllerBinding(_))
        ));
        match reg.resolve("broken") {
            Err(BootstrapError::ControllerConstruction { controller, source }) => {
                assert_eq!(controller, "Broken");
                assert_eq!(source.to_string(), "calibration file missing");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
