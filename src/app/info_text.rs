// SPDX-License-Identifier: GPL-3.0-only

//! Info text slots shown in the status line

use crate::constants::{INFO_TEXT_ERROR, INFO_TEXT_SLOTS};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::error;

/// Fixed set of text slots, concatenated in index order for display.
///
/// Cloning shares the slots, so the processing callback can publish text
/// that the UI thread picks up on its next repaint.
#[derive(Clone)]
pub struct InfoText {
    slots: Arc<RwLock<Vec<String>>>,
    generation: Arc<AtomicU64>,
}

impl InfoText {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(vec![String::new(); INFO_TEXT_SLOTS])),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set slot `position`. Out-of-range positions are logged and ignored.
    pub fn set(&self, position: usize, text: impl Into<String>) -> bool {
        if position >= INFO_TEXT_SLOTS {
            error!(
                target: "controller",
                position,
                max = INFO_TEXT_SLOTS - 1,
                "Logic error: no such info text slot"
            );
            return false;
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots[position] = text.into();
        self.generation.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Text of slot `position`, or `"ERROR"` if there is no such slot
    pub fn get(&self, position: usize) -> String {
        if position >= INFO_TEXT_SLOTS {
            error!(target: "controller", position, "Logic error: no such info text slot");
            return INFO_TEXT_ERROR.to_string();
        }
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots[position].clone()
    }

    /// All slots joined in order
    pub fn concatenated(&self) -> String {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.concat()
    }

    /// Bumped on every successful `set`, for cheap change detection
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

impl Default for InfoText {
    fn default() -> Self {
        Self::new()
    }
}
