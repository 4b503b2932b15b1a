//! Frame scheduler
//!
//! Drives one update/draw pair per host animation tick. The host supplies
//! monotonic timestamps in milliseconds (e.g. `requestAnimationFrame` time),
//! which keeps the scheduler deterministic under test.

use crate::consts::MAX_FRAME_DT;
use crate::renderer::Surface;
use crate::sim::SimulationModel;

/// Handle of a pending host animation request (e.g. the rAF id)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(pub i32);

/// Frame timing snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick
    pub dt: f32,
    /// Seconds since `start`
    pub elapsed: f32,
    pub frame_index: u64,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    running: bool,
    start_ms: f64,
    last_ms: f64,
    frame_index: u64,
    max_dt: f32,
    pending: Option<FrameRequest>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            running: false,
            start_ms: 0.0,
            last_ms: 0.0,
            frame_index: 0,
            max_dt: MAX_FRAME_DT,
            pending: None,
        }
    }

    /// Begin ticking. Idempotent: a running scheduler keeps its baseline.
    pub fn start(&mut self, now_ms: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.start_ms = now_ms;
        self.last_ms = now_ms;
        log::debug!("Scheduler started at {:.1}ms", now_ms);
    }

    /// Stop ticking. Returns the pending request the host should cancel.
    pub fn stop(&mut self) -> Option<FrameRequest> {
        self.running = false;
        self.pending.take()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Record the host request that will deliver the next tick
    pub fn post(&mut self, request: FrameRequest) {
        if self.running {
            self.pending = Some(request);
        }
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Advance the clock. Returns `None` when stopped.
    ///
    /// The delta is clamped to `[0, MAX_FRAME_DT]`, so a long gap (for example
    /// a backgrounded tab) never produces a large step.
    pub fn frame(&mut self, now_ms: f64) -> Option<FrameTime> {
        if !self.running {
            return None;
        }
        self.pending = None;

        let raw = ((now_ms - self.last_ms) / 1000.0) as f32;
        let dt = if raw.is_finite() { raw.clamp(0.0, self.max_dt) } else { 0.0 };
        self.last_ms = now_ms;

        let time = FrameTime {
            dt,
            elapsed: ((now_ms - self.start_ms) / 1000.0) as f32,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        Some(time)
    }

    /// One full tick: `update(dt)` then `draw(surface)`
    pub fn run_frame(
        &mut self,
        now_ms: f64,
        model: &mut dyn SimulationModel,
        surface: &mut dyn Surface,
    ) -> Option<FrameTime> {
        let time = self.frame(now_ms)?;
        model.update(time.dt);
        model.draw(surface);
        Some(time)
    }
}
