use std::time::Duration;

/// Distance (virtual pixels) below which the smoothed position snaps onto
/// the target instead of chasing it forever.
const SNAP_DISTANCE: f32 = 0.01;

/// Wheel-driven smooth-scroll emulation over a virtual page.
///
/// Raw wheel deltas land on `target`; `position` chases it with exponential
/// smoothing parameterized by a duration, which is how dedicated
/// smooth-scroll libraries feel: the page keeps gliding after the wheel
/// stops. `advance` is called once per frame from the render loop with the
/// measured frame delta.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    position: f32,
    target: f32,
    limit: f32,
    duration: Duration,
}

impl SmoothScroll {
    /// Creates a scroller at rest at the top of the page.
    ///
    /// `duration` is roughly the time the position takes to close most of
    /// the gap to the target after input stops; `limit` is the maximum
    /// scrollable offset in virtual pixels.
    pub fn new(duration: Duration, limit: f32) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            limit: limit.max(0.0),
            duration,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Accumulates a wheel delta (positive = scroll down) into the target,
    /// clamped to the page bounds.
    pub fn add_wheel_delta(&mut self, delta: f32) {
        self.target = (self.target + delta).clamp(0.0, self.limit);
    }

    /// Updates the scrollable extent, e.g. after a viewport resize. Both
    /// target and position are re-clamped so a shrunken page cannot leave
    /// the scroller stranded past the end.
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
        self.target = self.target.clamp(0.0, self.limit);
        self.position = self.position.clamp(0.0, self.limit);
    }

    /// Advances the smoothing by one frame and returns the new position.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        let gap = self.target - self.position;
        if gap.abs() <= SNAP_DISTANCE {
            self.position = self.target;
            return self.position;
        }

        // Exponential decay toward the target: after `duration` elapsed the
        // remaining gap is e^-4 (~2%) of where it started.
        let rate = 4.0 / self.duration.as_secs_f32().max(f32::EPSILON);
        let step = 1.0 - (-rate * dt.as_secs_f32()).exp();
        self.position += gap * step;
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(scroll: &mut SmoothScroll, count: usize) {
        for _ in 0..count {
            scroll.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn position_converges_on_the_target() {
        let mut scroll = SmoothScroll::new(Duration::from_secs(2), 3000.0);
        scroll.add_wheel_delta(1000.0);
        ticks(&mut scroll, 600);
        assert!((scroll.position() - 1000.0).abs() < 0.5);
    }

    #[test]
    fn position_never_overshoots() {
        let mut scroll = SmoothScroll::new(Duration::from_millis(500), 3000.0);
        scroll.add_wheel_delta(800.0);
        let mut last = 0.0;
        for _ in 0..400 {
            let pos = scroll.advance(Duration::from_millis(16));
            assert!(pos >= last - 1e-4, "position went backwards");
            assert!(pos <= 800.0 + 1e-3, "position overshot the target");
            last = pos;
        }
    }

    #[test]
    fn wheel_input_is_clamped_to_the_page() {
        let mut scroll = SmoothScroll::new(Duration::from_secs(1), 500.0);
        scroll.add_wheel_delta(10_000.0);
        assert_eq!(scroll.target(), 500.0);
        scroll.add_wheel_delta(-99_999.0);
        assert_eq!(scroll.target(), 0.0);
    }

    #[test]
    fn shrinking_the_limit_reclamps_state() {
        let mut scroll = SmoothScroll::new(Duration::from_millis(100), 2000.0);
        scroll.add_wheel_delta(2000.0);
        ticks(&mut scroll, 500);
        assert!(scroll.position() > 1999.0);

        scroll.set_limit(900.0);
        assert_eq!(scroll.target(), 900.0);
        assert!(scroll.position() <= 900.0);
    }

    #[test]
    fn snaps_when_the_gap_is_tiny() {
        let mut scroll = SmoothScroll::new(Duration::from_secs(2), 1000.0);
        scroll.add_wheel_delta(100.0);
        ticks(&mut scroll, 2000);
        assert_eq!(scroll.position(), scroll.target());
    }
}
