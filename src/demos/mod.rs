// SPDX-License-Identifier: GPL-3.0-only

//! Bundled demo applications

pub mod dev;
pub mod mirror;
pub mod threshold;

use crate::app::{AppDescriptor, AppRegistry, ControllerBinding, EntryPoint};

/// Every application shipped with the binary
pub fn registry() -> AppRegistry {
    AppRegistry::new(vec![
        AppDescriptor {
            name: "dev",
            entry: Some(EntryPoint {
                controller: Some(ControllerBinding::of::<dev::DevController>()),
                title: Some("CVFX Dev"),
            }),
        },
        AppDescriptor {
            name: "threshold",
            entry: Some(EntryPoint {
                controller: Some(ControllerBinding::of::<threshold::ThresholdController>()),
                title: Some("CVFX Examples - Threshold"),
            }),
        },
        AppDescriptor {
            name: "mirror",
            entry: Some(EntryPoint {
                controller: Some(ControllerBinding::of::<mirror::MirrorController>()),
                title: None,
            }),
        },
    ])
}
