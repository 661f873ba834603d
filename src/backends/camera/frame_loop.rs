// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-interval frame pump
//!
//! A single worker thread runs the tick closure at a fixed rate. Ticks never
//! overlap: the next tick is scheduled only after the previous one returned,
//! and a tick that overruns its interval delays the next one instead of
//! triggering a burst of catch-up ticks. A worker left behind by a stop
//! that timed out is joined before the next start spawns a new one.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Pump lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running,
}

/// How a call to [`FramePump::stop`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The pump was not running
    AlreadyIdle,
    /// The worker finished within the bounded wait
    Completed,
    /// A tick was still in flight when the wait expired
    TimedOut,
}

/// Fixed-rate deadline bookkeeping, kept free of threads so it can be
/// checked against a simulated clock.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: Duration,
    next: Instant,
}

impl TickSchedule {
    /// First tick is due immediately at `start`
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the upcoming tick is due
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Record that a tick finished at `now` and return the next deadline.
    ///
    /// Deadlines advance on a fixed grid. When a tick overruns the grid the
    /// next tick is due right away, and missed slots are dropped.
    pub fn advance(&mut self, now: Instant) -> Instant {
        self.next += self.interval;
        if self.next < now {
            self.next = now;
        }
        self.next
    }
}

struct Worker {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

/// Periodic single-worker scheduler driving the capture/process/render tick
pub struct FramePump {
    name: String,
    interval: Duration,
    worker: Option<Worker>,
    /// Worker detached by a timed-out stop, possibly still inside a tick
    draining: Option<JoinHandle<()>>,
}

impl FramePump {
    pub fn new(name: &str, interval: Duration) -> Self {
        Self {
            name: name.to_string(),
            interval,
            worker: None,
            draining: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> PumpState {
        if self.worker.is_some() {
            PumpState::Running
        } else {
            PumpState::Idle
        }
    }

    /// Whether the worker thread is still alive. A tick that panicked ends
    /// the worker while the pump stays `Running` until stopped.
    pub fn is_worker_alive(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start ticking. Returns `false` without side effects when already running.
    pub fn start<F>(&mut self, mut tick: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        if self.worker.is_some() {
            debug!(name = %self.name, "Frame pump already running");
            return false;
        }

        if let Some(handle) = self.draining.take() {
            debug!(name = %self.name, "Waiting for detached worker before restart");
            join_worker(&self.name, handle);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let name = self.name.clone();

        info!(name = %self.name, interval_ms = interval.as_millis() as u64, "Starting frame pump");

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                debug!(name = %name, "Frame pump thread started");
                let mut schedule = TickSchedule::new(interval, Instant::now());

                loop {
                    match stop_rx.try_recv() {
                        Ok(()) | Err(TryRecvError::Disconnected) => break,
                        Err(TryRecvError::Empty) => {}
                    }

                    tick();

                    let deadline = schedule.advance(Instant::now());
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }

                debug!(name = %name, "Frame pump thread exiting");
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker {
                    stop_tx,
                    done_rx,
                    handle,
                });
                true
            }
            Err(e) => {
                error!(name = %self.name, error = %e, "Failed to spawn frame pump thread");
                false
            }
        }
    }

    /// Stop ticking and wait up to one interval for an in-flight tick.
    ///
    /// Calling this while idle is a no-op. A wait that expires is logged and
    /// the worker is detached; it exits after its current tick, and the next
    /// [`start`](Self::start) joins it first.
    pub fn stop(&mut self) -> StopOutcome {
        let Some(worker) = self.worker.take() else {
            return StopOutcome::AlreadyIdle;
        };

        debug!(name = %self.name, "Requesting frame pump stop");
        let _ = worker.stop_tx.send(());

        match worker.done_rx.recv_timeout(self.interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                // Either a clean exit or the thread died in a tick
                join_worker(&self.name, worker.handle);
                info!(name = %self.name, "Frame pump stopped");
                StopOutcome::Completed
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    name = %self.name,
                    wait_ms = self.interval.as_millis() as u64,
                    "Tick still in flight after stop wait, continuing shutdown"
                );
                self.draining = Some(worker.handle);
                StopOutcome::TimedOut
            }
        }
    }
}

fn join_worker(name: &str, handle: JoinHandle<()>) {
    if let Err(panic) = handle.join() {
        error!(name = %name, "Frame pump tick panicked: {:?}", panic);
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        if self.worker.is_some() {
            debug!(name = %self.name, "FramePump dropped, stopping worker");
            self.stop();
        }
    }
}
