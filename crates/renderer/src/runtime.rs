use std::time::{Duration, Instant};

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock time in seconds since the source was created.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
///
/// Animation speed follows measured elapsed time, not a fixed per-frame
/// increment, so the effect runs at the same speed on every refresh rate.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.origin.elapsed().as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp, for still frames and
/// deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time }
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        TimeSample::new(self.time, 0)
    }
}

/// Paces redraw requests when an FPS cap is configured.
///
/// With no cap every refresh callback renders; with a cap the loop asks
/// [`ready_for_frame`] before requesting a redraw and sleeps until
/// [`next_deadline`] otherwise.
///
/// [`ready_for_frame`]: FrameScheduler::ready_for_frame
/// [`next_deadline`]: FrameScheduler::next_deadline
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    next_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            next_frame: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.next_frame) {
            (None, _) | (_, None) => true,
            (Some(_), Some(deadline)) => now >= deadline,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        if let Some(interval) = self.interval {
            self.next_frame = Some(now + interval);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.interval.and(self.next_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_increases_monotonically() {
        let mut source = SystemTimeSource::new();
        let mut last = source.sample();
        for _ in 0..100 {
            let sample = source.sample();
            assert!(sample.seconds >= last.seconds, "time went backwards");
            assert_eq!(sample.frame_index, last.frame_index + 1);
            last = sample;
        }
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn capped_scheduler_waits_out_the_interval() {
        let mut scheduler = FrameScheduler::new(Some(50.0));
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);

        assert!(!scheduler.ready_for_frame(now + Duration::from_millis(10)));
        assert!(scheduler.ready_for_frame(now + Duration::from_millis(21)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(now + Duration::from_millis(20))
        );
    }

    #[test]
    fn zero_fps_counts_as_uncapped() {
        let scheduler = FrameScheduler::new(Some(0.0));
        assert!(scheduler.ready_for_frame(Instant::now()));
    }
}
