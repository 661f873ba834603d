// SPDX-License-Identifier: GPL-3.0-only

//! Runtime state shared between the UI thread and the frame pump

use crate::backends::camera::RenderTarget;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Resolved by bootstrap, no widgets bound yet
    Constructed,
    /// Registry built and the init hook has run
    Initialized,
    /// Window shown and the post-show hook has run
    Active,
    /// Torn down; the camera is stopped and released
    Closed,
}

/// Per-target enable flags.
///
/// Written on the UI thread, read by every tick. Relaxed ordering is enough:
/// a tick that sees a stale flag renders one frame too many or too few.
#[derive(Clone)]
pub struct RenderFlags(Arc<[AtomicBool; 3]>);

impl RenderFlags {
    pub fn new(main: bool, alpha: bool, beta: bool) -> Self {
        Self(Arc::new([
            AtomicBool::new(main),
            AtomicBool::new(alpha),
            AtomicBool::new(beta),
        ]))
    }

    pub fn is_active(&self, target: RenderTarget) -> bool {
        self.0[target.index()].load(Ordering::Relaxed)
    }

    pub fn set_active(&self, target: RenderTarget, active: bool) {
        self.0[target.index()].store(active, Ordering::Relaxed);
    }
}

impl Default for RenderFlags {
    /// Main renders by default, alpha and beta do not
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

impl std::fmt::Debug for RenderFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderFlags")
            .field("main", &self.is_active(RenderTarget::Main))
            .field("alpha", &self.is_active(RenderTarget::Alpha))
            .field("beta", &self.is_active(RenderTarget::Beta))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let flags = RenderFlags::default();
        assert!(flags.is_active(RenderTarget::Main));
        assert!(!flags.is_active(RenderTarget::Alpha));
        assert!(!flags.is_active(RenderTarget::Beta));
    }

    #[test]
    fn test_clones_share_flags() {
        let flags = RenderFlags::default();
        let worker_view = flags.clone();
        flags.set_active(RenderTarget::Beta, true);
        assert!(worker_view.is_active(RenderTarget::Beta));
    }
}
