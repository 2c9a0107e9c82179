//! Fixed-timestep pacing on top of [`Simulation::tick`].
//!
//! The accumulator counts tick units rather than seconds, so one second of
//! wall time is exactly [`TICRATE`] ticks with no rounding residue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::clock::TICRATE;
use crate::config::FrameLoopConfig;
use crate::error::SimResult;
use crate::intent::PlayerIntent;
use crate::simulation::Simulation;
use crate::snapshot::FrameSnapshot;

/// Slack when comparing the accumulator against whole ticks.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

/// Cloneable flag that stops a [`FrameLoop`] from anywhere.
///
/// Checked between ticks, never in the middle of one.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What one call to [`FrameLoop::advance`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Ticks run.
    pub ticks: u32,
    /// Whole ticks left in the accumulator for later frames.
    pub deferred: u32,
    /// The delta was cut to `max_frame_delta`.
    pub clamped: bool,
    /// The frame stopped at `max_frame_skip`.
    pub capped: bool,
}

/// Owns the timing state that turns wall-clock callbacks into ticks.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    config: FrameLoopConfig,
    accumulator: f64,
    last_time: Option<f64>,
    running: bool,
    stop: StopHandle,
    fps: f32,
}

impl FrameLoop {
    /// A stopped loop.
    pub fn new(config: FrameLoopConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            last_time: None,
            running: false,
            stop: StopHandle::default(),
            fps: 0.0,
        }
    }

    /// Start at wall time `now` (seconds), clearing any earlier stop.
    pub fn start(&mut self, now: f64) {
        self.stop.reset();
        self.running = true;
        self.accumulator = 0.0;
        self.last_time = Some(now);
        debug!(now, "frame loop started");
    }

    /// Stop the loop.
    pub fn stop(&mut self) {
        self.running = false;
        debug!("frame loop stopped");
    }

    /// A handle that stops this loop when triggered.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether the loop is running and no stop was requested.
    pub fn is_running(&self) -> bool {
        self.running && !self.stop.is_stopped()
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Accumulated time in ticks, including fractions.
    pub fn pending_ticks(&self) -> f64 {
        self.accumulator
    }

    /// Handle a frame callback at wall time `now` (seconds).
    ///
    /// Does nothing unless the loop is running. A clock that steps backwards
    /// is read as a zero delta.
    pub fn frame(&mut self, sim: &mut Simulation, now: f64, intent: &PlayerIntent) -> SimResult<FrameReport> {
        if !self.is_running() {
            return Ok(FrameReport::default());
        }
        let delta = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);
        self.update_fps(delta);
        self.advance(sim, delta, intent)
    }

    fn update_fps(&mut self, delta: f64) {
        if delta <= 0.0 {
            return;
        }
        let instant = (1.0 / delta) as f32;
        self.fps = if self.fps == 0.0 {
            instant
        } else {
            let s = self.config.fps_smoothing;
            self.fps * s + instant * (1.0 - s)
        };
    }

    /// Feed `delta` seconds and run every whole tick due, up to
    /// `max_frame_skip`. The rest stays accumulated.
    ///
    /// The full intent goes to the first tick; later ticks in the same frame
    /// get it without one-shot presses.
    pub fn advance(&mut self, sim: &mut Simulation, delta: f64, intent: &PlayerIntent) -> SimResult<FrameReport> {
        let mut report = FrameReport::default();
        let mut delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        if let Some(max) = self.config.max_frame_delta {
            if delta > max {
                trace!(delta, max, "frame delta clamped");
                delta = max;
                report.clamped = true;
            }
        }
        self.accumulator += delta * f64::from(TICRATE);

        let held = intent.without_impulses();
        while self.accumulator + ACCUMULATOR_EPSILON >= 1.0 && report.ticks < self.config.max_frame_skip {
            if self.stop.is_stopped() {
                self.running = false;
                break;
            }
            sim.tick(if report.ticks == 0 { intent } else { &held })?;
            self.accumulator -= 1.0;
            report.ticks += 1;
        }
        self.accumulator = self.accumulator.max(0.0);

        let due = (self.accumulator + ACCUMULATOR_EPSILON).floor();
        report.deferred = due as u32;
        report.capped = report.deferred > 0 && report.ticks >= self.config.max_frame_skip;
        if report.capped {
            trace!(deferred = report.deferred, "frame skip limit reached");
        }
        Ok(report)
    }

    /// Snapshot `sim` with this loop's FPS estimate.
    pub fn snapshot(&self, sim: &Simulation) -> SimResult<FrameSnapshot> {
        sim.snapshot(self.fps)
    }
}
