//! Frame pacing: decide which host frames to paint at a target rate.
//!
//! The host keeps scheduling frames at its own refresh rate and hands each
//! timestamp (milliseconds, e.g. a high-resolution clock or a frame
//! callback's timestamp) to a [`FramePacer`]. The pacer answers whether that
//! frame should paint. Leftover time past the interval is carried into the
//! next frame, so the long-run rate matches the target instead of drifting
//! down to a multiple of the refresh period.
//!
//! ```
//! use canvasfit::FramePacer;
//!
//! let mut pacer = FramePacer::starting_at(30.0, 0.0).unwrap();
//! let painted = (1..=600)
//!     .map(|frame| frame as f64 * 1000.0 / 60.0)
//!     .filter(|&now| pacer.tick(now))
//!     .count();
//!
//! // Ten seconds of 60 Hz frames throttled to ~30 fps.
//! assert!((295..=300).contains(&painted));
//! ```

use crate::error::{Result, positive};

/// Target frame rate used by [`FrameLoop::default`].
pub const DEFAULT_FPS: f64 = 30.0;

/// Rate reporting window used by [`FrameLoop`] unless overridden.
pub const DEFAULT_REPORT_WINDOW_MS: f64 = 1000.0;

/// Throttles a stream of frame timestamps to a target rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FramePacer {
    fps: f64,
    interval_ms: f64,
    then: Option<f64>,
}

impl FramePacer {
    /// Pace to `fps` frames per second. The first [`tick`](Self::tick)
    /// sets the baseline and does not paint.
    pub fn new(fps: f64) -> Result<Self> {
        let fps = positive("fps", fps)?;
        Ok(Self {
            fps,
            interval_ms: 1000.0 / fps,
            then: None,
        })
    }

    /// Pace to `fps` with the baseline already set to `now`.
    pub fn starting_at(fps: f64, now: f64) -> Result<Self> {
        let mut pacer = Self::new(fps)?;
        if now.is_finite() {
            pacer.then = Some(now);
        }
        Ok(pacer)
    }

    /// Minimum time between painted frames.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Target frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Whether the frame at `now` should paint.
    pub fn tick(&mut self, now: f64) -> bool {
        if !now.is_finite() {
            log::warn!("ignoring non-finite frame timestamp {now}");
            return false;
        }
        let Some(then) = self.then else {
            self.then = Some(now);
            return false;
        };
        let delta = now - then;
        if delta > self.interval_ms {
            // Keep the remainder so late frames don't push the schedule back.
            self.then = Some(now - delta % self.interval_ms);
            true
        } else {
            false
        }
    }

    /// Forget the baseline. The next tick starts a new schedule.
    pub fn reset(&mut self) {
        self.then = None;
    }
}

/// Event count over one elapsed window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateReport {
    /// Events recorded in the window, including the one that closed it.
    pub events: u32,
    /// Time from window start to the closing event.
    pub elapsed_ms: f64,
}

impl RateReport {
    /// Average events per second over the window.
    pub fn per_second(&self) -> f64 {
        f64::from(self.events) * 1000.0 / self.elapsed_ms
    }
}

/// Counts events and reports once per elapsed window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateCounter {
    window_ms: f64,
    window_start: Option<f64>,
    count: u32,
}

impl RateCounter {
    /// Report every `window_ms` milliseconds.
    pub fn new(window_ms: f64) -> Result<Self> {
        Ok(Self {
            window_ms: positive("window_ms", window_ms)?,
            window_start: None,
            count: 0,
        })
    }

    /// Length of one reporting window.
    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    /// Open a window at `now` without counting an event. Does nothing while
    /// a window is already open.
    pub fn start(&mut self, now: f64) {
        if now.is_finite() && self.window_start.is_none() {
            self.window_start = Some(now);
        }
    }

    /// Record an event at `now`. Returns a report when the current window
    /// has elapsed, then starts a new one at `now`.
    pub fn record(&mut self, now: f64) -> Option<RateReport> {
        if !now.is_finite() {
            return None;
        }
        let start = *self.window_start.get_or_insert(now);
        self.count = self.count.saturating_add(1);

        let elapsed_ms = now - start;
        if elapsed_ms > self.window_ms {
            let report = RateReport {
                events: self.count,
                elapsed_ms,
            };
            self.window_start = Some(now);
            self.count = 0;
            Some(report)
        } else {
            None
        }
    }
}

/// Outcome of one host frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameDecision {
    /// Whether the caller should draw this frame.
    pub paint: bool,
    /// Host frame rate over the last window, when one just elapsed.
    pub frames: Option<RateReport>,
    /// Painted frame rate over the last window, when one just elapsed.
    pub paints: Option<RateReport>,
}

/// A [`FramePacer`] plus rate counters for host frames and painted frames.
///
/// ```
/// use canvasfit::FrameLoop;
///
/// let mut frame_loop = FrameLoop::new(10.0).unwrap().report_window(500.0).unwrap();
/// let mut painted = 0;
/// for frame in 0..120 {
///     let decision = frame_loop.on_frame(frame as f64 * 16.0);
///     if decision.paint {
///         painted += 1;
///     }
/// }
/// assert!(painted >= 18);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameLoop {
    pacer: FramePacer,
    frames: RateCounter,
    paints: RateCounter,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self {
            pacer: FramePacer {
                fps: DEFAULT_FPS,
                interval_ms: 1000.0 / DEFAULT_FPS,
                then: None,
            },
            frames: RateCounter {
                window_ms: DEFAULT_REPORT_WINDOW_MS,
                window_start: None,
                count: 0,
            },
            paints: RateCounter {
                window_ms: DEFAULT_REPORT_WINDOW_MS,
                window_start: None,
                count: 0,
            },
        }
    }
}

impl FrameLoop {
    /// Pace to `fps` with the default report window.
    pub fn new(fps: f64) -> Result<Self> {
        Ok(Self {
            pacer: FramePacer::new(fps)?,
            ..Self::default()
        })
    }

    /// Set the reporting window for both counters.
    pub fn report_window(mut self, window_ms: f64) -> Result<Self> {
        self.frames = RateCounter::new(window_ms)?;
        self.paints = RateCounter::new(window_ms)?;
        Ok(self)
    }

    /// The underlying pacer.
    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Feed one host frame.
    pub fn on_frame(&mut self, now: f64) -> FrameDecision {
        // Both windows open at the first frame, even if it doesn't paint.
        self.paints.start(now);
        let frames = self.frames.record(now);
        if let Some(r) = &frames {
            log::info!(
                "frame callback ran {} times in the last {:.0} ms",
                r.events,
                r.elapsed_ms
            );
        }

        let paint = self.pacer.tick(now);
        let paints = if paint {
            let report = self.paints.record(now);
            if let Some(r) = &report {
                log::info!(
                    "painted {} frames in the last {:.0} ms ({:.1} fps)",
                    r.events,
                    r.elapsed_ms,
                    r.per_second()
                );
            }
            report
        } else {
            None
        };

        FrameDecision {
            paint,
            frames,
            paints,
        }
    }

    /// Restart pacing and counting from the next frame.
    pub fn reset(&mut self) {
        self.pacer.reset();
        self.frames = RateCounter {
            window_start: None,
            count: 0,
            ..self.frames
        };
        self.paints = RateCounter {
            window_start: None,
            count: 0,
            ..self.paints
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── FramePacer ──────────────────────────────────────────────────────

    #[test]
    fn first_tick_sets_baseline() {
        let mut p = FramePacer::new(30.0).unwrap();
        assert!(!p.tick(1000.0));
        assert!(!p.tick(1020.0));
        assert!(p.tick(1040.0));
    }

    #[test]
    fn paints_only_after_interval() {
        let mut p = FramePacer::starting_at(10.0, 0.0).unwrap();
        assert!(!p.tick(50.0));
        assert!(!p.tick(100.0)); // exactly one interval is not enough
        assert!(p.tick(101.0));
    }

    #[test]
    fn carries_remainder() {
        // 10 fps at 16 ms frames: first paint at 112 ms, baseline 100 ms.
        let mut p = FramePacer::starting_at(10.0, 0.0).unwrap();
        let paints: Vec<u32> = (1..=13).map(|f| f * 16).filter(|&t| p.tick(t as f64)).collect();
        assert_eq!(paints, vec![112, 208]);
    }

    #[test]
    fn no_drift_over_many_frames() {
        let mut p = FramePacer::starting_at(10.0, 0.0).unwrap();
        let painted = (1..=625).filter(|&f| p.tick(f as f64 * 16.0)).count();
        // 10 s of 16 ms frames at 10 fps. Without carry it would be ~89.
        assert!((98..=100).contains(&painted), "painted {painted}");
    }

    #[test]
    fn ignores_non_finite_and_backwards_time() {
        let mut p = FramePacer::starting_at(30.0, 100.0).unwrap();
        assert!(!p.tick(f64::NAN));
        assert!(!p.tick(50.0));
        assert!(p.tick(140.0));
    }

    #[test]
    fn reset_clears_baseline() {
        let mut p = FramePacer::starting_at(30.0, 0.0).unwrap();
        p.reset();
        assert!(!p.tick(10_000.0));
    }

    #[test]
    fn rejects_bad_fps() {
        for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            assert!(FramePacer::new(fps).is_err());
        }
        let p = FramePacer::new(40.0).unwrap();
        assert_eq!(p.interval_ms(), 25.0);
        assert_eq!(p.fps(), 40.0);
    }

    // ── RateCounter ─────────────────────────────────────────────────────

    #[test]
    fn counter_reports_after_window() {
        let mut c = RateCounter::new(1000.0).unwrap();
        let reports: Vec<RateReport> = (0..=130)
            .filter_map(|f| c.record(f as f64 * 10.0))
            .collect();
        // Window opens at 0 ms and closes at the first event past 1000 ms.
        // Both the opening and closing events count.
        assert_eq!(
            reports,
            vec![RateReport {
                events: 102,
                elapsed_ms: 1010.0
            }]
        );
    }

    #[test]
    fn counter_starts_new_window_at_report() {
        let mut c = RateCounter::new(100.0).unwrap();
        assert!(c.record(0.0).is_none());
        assert!(c.record(101.0).is_some());
        assert!(c.record(150.0).is_none());
        let r = c.record(202.0).unwrap();
        assert_eq!(r.events, 2);
        assert_eq!(r.elapsed_ms, 101.0);
    }

    #[test]
    fn counter_start_opens_window_without_counting() {
        let mut c = RateCounter::new(100.0).unwrap();
        c.start(f64::NAN);
        c.start(0.0);
        c.start(50.0); // already open
        assert!(c.record(60.0).is_none());
        assert_eq!(
            c.record(101.0),
            Some(RateReport {
                events: 2,
                elapsed_ms: 101.0
            })
        );
    }

    #[test]
    fn per_second_uses_elapsed() {
        let r = RateReport {
            events: 30,
            elapsed_ms: 1500.0,
        };
        assert_eq!(r.per_second(), 20.0);
    }

    #[test]
    fn counter_rejects_bad_window() {
        assert!(RateCounter::new(0.0).is_err());
        assert!(RateCounter::new(f64::NAN).is_err());
    }

    // ── FrameLoop ───────────────────────────────────────────────────────

    #[test]
    fn frame_loop_defaults() {
        let l = FrameLoop::default();
        assert_eq!(l.pacer().fps(), DEFAULT_FPS);
        assert_eq!(FrameLoop::new(DEFAULT_FPS).unwrap(), l);
    }

    #[test]
    fn frame_loop_reports_both_rates() {
        let mut l = FrameLoop::new(30.0).unwrap();
        let mut frame_reports = Vec::new();
        let mut paint_reports = Vec::new();
        for f in 0..=250 {
            let d = l.on_frame(f as f64 * 1000.0 / 60.0);
            frame_reports.extend(d.frames);
            paint_reports.extend(d.paints);
        }
        assert_eq!(frame_reports.len(), 4);
        assert!(frame_reports.iter().all(|r| (60..=62).contains(&r.events)));
        assert!(!paint_reports.is_empty());
        assert!(paint_reports.iter().all(|r| (29..=32).contains(&r.events)));
    }

    #[test]
    fn paint_window_opens_with_the_loop() {
        // The first frame at 5000 ms does not paint, but the paint window
        // still starts there.
        let mut l = FrameLoop::new(30.0).unwrap();
        let start = 5000.0;
        let (now, report) = (0..200)
            .map(|f| start + f as f64 * 1000.0 / 60.0)
            .find_map(|now| l.on_frame(now).paints.map(|r| (now, r)))
            .unwrap();
        assert!(
            (now - start - report.elapsed_ms).abs() < 1e-9,
            "report at {now} covers {} ms",
            report.elapsed_ms
        );
        assert_eq!(report.events, 31);
    }

    #[test]
    fn frame_loop_reset() {
        let mut l = FrameLoop::new(30.0).unwrap();
        for f in 0..10 {
            l.on_frame(f as f64 * 16.0);
        }
        l.reset();
        assert_eq!(l, FrameLoop::new(30.0).unwrap());
    }
}
