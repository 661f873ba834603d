// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing the bundled applications
//! - Listing capture devices
//! - Writing one processed frame to disk

use anyhow::Context;
use chrono::Local;
use cvfx::app::{App, AppRegistry};
use cvfx::backends::camera::{CameraBackendType, FrameTriple, enumerate_cameras};
use std::path::{Path, PathBuf};
use tracing::info;

/// List every registered application with its title
pub fn list_apps(registry: &AppRegistry) {
    println!("Available applications:");
    println!();
    for app in registry.apps() {
        let title = app.title();
        if title.is_empty() {
            println!("  {}", app.name);
        } else {
            println!("  {:<12} {}", app.name, title);
        }
    }
}

/// List capture devices of the given backend
pub fn list_cameras(backend: CameraBackendType) {
    let cameras = enumerate_cameras(backend);

    if cameras.is_empty() {
        println!("No cameras found.");
        return;
    }

    println!("Available cameras ({}):", backend);
    println!();
    for camera in &cameras {
        println!("  [{}] {}", camera.index, camera.name);
        println!("      Device: {}", camera.path);
    }
}

/// Capture and process one frame, then write every non-empty buffer as PNG
pub fn snapshot(app: &mut App, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    println!("Capturing from camera {} ...", app.camera_id());

    let triple = app
        .capture_once()
        .with_context(|| format!("capture from camera {} failed", app.camera_id()))?;

    let paths = save_triple(app.name(), triple, output_dir)?;
    for path in &paths {
        println!("Saved: {}", path.display());
    }
    Ok(paths)
}

fn save_triple(app_name: &str, triple: FrameTriple, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut paths = Vec::new();

    for (target, frame) in triple.into_non_empty() {
        let filename = format!(
            "{}_{}_{}.png",
            app_name,
            target.display_name().to_lowercase(),
            timestamp
        );
        let path = output_dir.join(filename);
        frame
            .image()
            .save(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), %target, "Snapshot saved");
        paths.push(path);
    }

    Ok(paths)
}
