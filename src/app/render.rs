// SPDX-License-Identifier: GPL-3.0-only

//! Hand-off of rendered buffers from the frame pump to the UI thread
//!
//! The worker posts one message per buffer. The UI thread drains everything
//! that is pending and keeps only the newest buffer per target, so a slow UI
//! skips intermediate frames instead of replaying them.

use crate::backends::camera::{Frame, RenderTarget};
use futures::channel::mpsc;
use tracing::debug;

/// One buffer destined for one surface
#[derive(Debug)]
pub struct RenderUpdate {
    pub target: RenderTarget,
    pub frame: Frame,
}

/// Create a connected sender/receiver pair
pub fn channel() -> (RenderSender, RenderReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (RenderSender { tx }, RenderReceiver { rx })
}

/// Worker-side handle
#[derive(Clone)]
pub struct RenderSender {
    tx: mpsc::UnboundedSender<RenderUpdate>,
}

impl RenderSender {
    /// Schedule `frame` for display on `target`.
    ///
    /// Returns `false` once the UI side has gone away.
    pub fn post(&self, target: RenderTarget, frame: Frame) -> bool {
        match self.tx.unbounded_send(RenderUpdate { target, frame }) {
            Ok(()) => true,
            Err(_) => {
                debug!(%target, "Render receiver closed, dropping frame");
                false
            }
        }
    }
}

/// UI-side handle
pub struct RenderReceiver {
    rx: mpsc::UnboundedReceiver<RenderUpdate>,
}

impl RenderReceiver {
    /// Take every pending update, coalesced to the latest per target
    pub fn drain(&mut self) -> PendingRenders {
        let mut pending = PendingRenders::default();
        while let Ok(update) = self.rx.try_recv() {
            pending.received += 1;
            pending.latest[update.target.index()] = Some(update.frame);
        }
        pending
    }
}

/// Result of one drain
#[derive(Debug, Default)]
pub struct PendingRenders {
    latest: [Option<Frame>; 3],
    received: usize,
}

impl PendingRenders {
    /// Number of messages taken off the channel, before coalescing
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_empty(&self) -> bool {
        self.received == 0
    }

    pub fn latest(&self, target: RenderTarget) -> Option<&Frame> {
        self.latest[target.index()].as_ref()
    }
}

/// The three display surfaces, owned by the UI thread
#[derive(Debug, Default)]
pub struct Surfaces {
    frames: [Frame; 3],
    applied: [u64; 3],
}

impl Surfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the newest pending buffer of each target
    pub fn apply(&mut self, pending: PendingRenders) -> bool {
        let mut changed = false;
        for (index, frame) in pending.latest.into_iter().enumerate() {
            if let Some(frame) = frame {
                self.frames[index] = frame;
                self.applied[index] += 1;
                changed = true;
            }
        }
        changed
    }

    pub fn frame(&self, target: RenderTarget) -> &Frame {
        &self.frames[target.index()]
    }

    /// How many assignments a surface has received
    pub fn applied_count(&self, target: RenderTarget) -> u64 {
        self.applied[target.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(value: u8) -> Frame {
        Frame::from_rgb(RgbImage::from_pixel(2, 2, Rgb([value, value, value])))
    }

    #[test]
    fn test_last_post_wins_per_target() {
        let (tx, mut rx) = channel();
        for value in [1, 2, 3] {
            assert!(tx.post(RenderTarget::Main, solid(value)));
        }
        tx.post(RenderTarget::Alpha, solid(9));

        let pending = rx.drain();
        assert_eq!(pending.received(), 4);

        let mut surfaces = Surfaces::new();
        assert!(surfaces.apply(pending));
        assert_eq!(surfaces.frame(RenderTarget::Main).sample(0, 0), (3, 3, 3));
        assert_eq!(surfaces.frame(RenderTarget::Alpha).sample(0, 0), (9, 9, 9));
        assert!(surfaces.frame(RenderTarget::Beta).is_empty());
        assert_eq!(surfaces.applied_count(RenderTarget::Main), 1);
    }

    #[test]
    fn test_posts_across_drains_keep_order() {
        let (tx, mut rx) = channel();
        let mut surfaces = Surfaces::new();

        tx.post(RenderTarget::Main, solid(1));
        surfaces.apply(rx.drain());
        tx.post(RenderTarget::Main, solid(2));
        tx.post(RenderTarget::Main, solid(3));
        surfaces.apply(rx.drain());

        assert_eq!(surfaces.frame(RenderTarget::Main).sample(0, 0), (3, 3, 3));
        assert_eq!(surfaces.applied_count(RenderTarget::Main), 2);
    }

    #[test]
    fn test_posts_from_worker_thread() {
        let (tx, mut rx) = channel();
        std::thread::spawn(move || {
            for value in 0..50 {
                tx.post(RenderTarget::Beta, solid(value));
            }
        })
        .join()
        .unwrap();

        let mut surfaces = Surfaces::new();
        surfaces.apply(rx.drain());
        assert_eq!(surfaces.frame(RenderTarget::Beta).sample(1, 1), (49, 49, 49));
    }

    #[test]
    fn test_empty_drain_changes_nothing() {
        let (_tx, mut rx) = channel();
        let pending = rx.drain();
        assert!(pending.is_empty());
        assert!(!Surfaces::new().apply(pending));
    }

    #[test]
    fn test_post_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.post(RenderTarget::Main, solid(1)));
    }
}
