/// Fired when the smoothed scroll position crosses a section boundary.
///
/// The index identifies the boundary (1 = between sections 0 and 1). The
/// toggle policy is fixed: play forward on enter, reverse on leave-back,
/// nothing on plain leave or re-enter from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Enter(usize),
    LeaveBack(usize),
}

#[derive(Debug, Clone)]
struct ScrollTrigger {
    boundary: usize,
    threshold: f32,
    /// True once the position has crossed below (past) the threshold.
    past: bool,
}

/// One trigger per interior section boundary of the virtual page.
///
/// A section is one viewport tall; the threshold for boundary `i` is the
/// point where the top of section `i` reaches the viewport center, i.e.
/// `(i - 0.5) * viewport_height` of scroll offset.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    triggers: Vec<ScrollTrigger>,
    viewport_height: f32,
}

impl TriggerSet {
    pub fn for_sections(section_count: usize, viewport_height: f32) -> Self {
        let triggers = (1..section_count)
            .map(|boundary| ScrollTrigger {
                boundary,
                threshold: Self::threshold_for(boundary, viewport_height),
                past: false,
            })
            .collect();
        Self {
            triggers,
            viewport_height,
        }
    }

    fn threshold_for(boundary: usize, viewport_height: f32) -> f32 {
        (boundary as f32 - 0.5) * viewport_height
    }

    /// Total scrollable extent of the page backing these triggers.
    pub fn scroll_limit(&self) -> f32 {
        self.triggers.len() as f32 * self.viewport_height
    }

    /// Recomputes thresholds after a viewport resize. Crossing states are
    /// kept; a threshold that moved across the current position fires the
    /// matching event on the next `evaluate` call.
    pub fn relayout(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height;
        for trigger in &mut self.triggers {
            trigger.threshold = Self::threshold_for(trigger.boundary, viewport_height);
        }
    }

    /// Compares the position against every threshold and returns the
    /// crossings since the last call, in boundary order.
    pub fn evaluate(&mut self, position: f32) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for trigger in &mut self.triggers {
            if !trigger.past && position >= trigger.threshold {
                trigger.past = true;
                events.push(TriggerEvent::Enter(trigger.boundary));
            } else if trigger.past && position < trigger.threshold {
                trigger.past = false;
                events.push(TriggerEvent::LeaveBack(trigger.boundary));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sections_have_one_boundary() {
        let mut set = TriggerSet::for_sections(2, 1000.0);
        assert_eq!(set.scroll_limit(), 1000.0);
        assert!(set.evaluate(0.0).is_empty());
        assert_eq!(set.evaluate(500.0), vec![TriggerEvent::Enter(1)]);
    }

    #[test]
    fn crossing_fires_exactly_once() {
        let mut set = TriggerSet::for_sections(2, 1000.0);
        assert_eq!(set.evaluate(600.0), vec![TriggerEvent::Enter(1)]);
        assert!(set.evaluate(700.0).is_empty());
        assert!(set.evaluate(501.0).is_empty());
    }

    #[test]
    fn scrolling_back_fires_leave_back() {
        let mut set = TriggerSet::for_sections(2, 1000.0);
        set.evaluate(800.0);
        assert_eq!(set.evaluate(400.0), vec![TriggerEvent::LeaveBack(1)]);
        assert!(set.evaluate(100.0).is_empty());
    }

    #[test]
    fn fast_scroll_crosses_several_boundaries_in_order() {
        let mut set = TriggerSet::for_sections(4, 1000.0);
        let events = set.evaluate(2600.0);
        assert_eq!(
            events,
            vec![
                TriggerEvent::Enter(1),
                TriggerEvent::Enter(2),
                TriggerEvent::Enter(3),
            ]
        );
        let events = set.evaluate(100.0);
        assert_eq!(
            events,
            vec![
                TriggerEvent::LeaveBack(1),
                TriggerEvent::LeaveBack(2),
                TriggerEvent::LeaveBack(3),
            ]
        );
    }

    #[test]
    fn relayout_moves_thresholds() {
        let mut set = TriggerSet::for_sections(2, 1000.0);
        set.evaluate(600.0);

        // Position 600 sits past the old threshold (500) but before the new
        // one (1000); the next evaluate reports the un-crossing.
        set.relayout(2000.0);
        assert_eq!(set.evaluate(600.0), vec![TriggerEvent::LeaveBack(1)]);
    }
}
