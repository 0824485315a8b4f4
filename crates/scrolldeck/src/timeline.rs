use std::time::Duration;

use crate::easing::Easing;
use crate::DeckError;

/// Snapshot consumed by the renderer each frame.
///
/// Invariant: `next == (current + 1) % playlist_len` at all times; indices
/// only rotate when a forward transition commits, never mid-flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub current: usize,
    pub next: usize,
    /// Eased blend factor in `[0, 1]`; 0 shows `current`, 1 shows `next`.
    pub progress: f32,
}

/// Boundary events surfaced for diagnostic logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A forward transition finished; the pair rotated one slot.
    Committed { current: usize, next: usize },
    /// A mid-flight reverse played back to rest.
    ReverseCompleted,
    /// A leave-back after a commit restored the prior pair.
    Rewound { current: usize, next: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    /// Normalized position in `[0, 1]`; progress is `easing.apply(t)`.
    t: f32,
    direction: Direction,
}

/// The transition state machine: idle, or tweening forward/reverse.
///
/// Scroll triggers drive it through [`trigger_forward`] and
/// [`trigger_reverse`]; the render loop pumps [`advance`] with the frame
/// delta. Committed pairs are kept on a history stack so scrolling back up
/// can rewind more than one step.
///
/// [`trigger_forward`]: TransitionTimeline::trigger_forward
/// [`trigger_reverse`]: TransitionTimeline::trigger_reverse
/// [`advance`]: TransitionTimeline::advance
#[derive(Debug, Clone)]
pub struct TransitionTimeline {
    playlist_len: usize,
    current: usize,
    next: usize,
    history: Vec<(usize, usize)>,
    tween: Option<Tween>,
    duration: Duration,
    easing: Easing,
}

impl TransitionTimeline {
    pub fn new(playlist_len: usize, duration: Duration, easing: Easing) -> Result<Self, DeckError> {
        if playlist_len < 2 {
            return Err(DeckError::TooFewClips(playlist_len));
        }
        Ok(Self {
            playlist_len,
            current: 0,
            next: 1,
            history: Vec::new(),
            tween: None,
            duration,
            easing,
        })
    }

    pub fn state(&self) -> TransitionState {
        let progress = match self.tween {
            Some(tween) => self.easing.apply(tween.t),
            None => 0.0,
        };
        TransitionState {
            current: self.current,
            next: self.next,
            progress,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tween.is_none()
    }

    /// A scroll trigger was entered while scrolling down.
    ///
    /// Starts a fresh 0→1 tween when idle. If a tween is already in flight
    /// (including a reverse), the direction flips forward and the tween
    /// resumes from its current position rather than restarting.
    pub fn trigger_forward(&mut self) {
        match self.tween.as_mut() {
            Some(tween) => tween.direction = Direction::Forward,
            None => {
                self.tween = Some(Tween {
                    t: 0.0,
                    direction: Direction::Forward,
                });
            }
        }
    }

    /// The same trigger was left while scrolling back up.
    ///
    /// Mid-flight, the tween reverses smoothly toward 0 with the indices
    /// untouched. At rest after a commit, the previously active pair is
    /// popped off the history stack instead.
    pub fn trigger_reverse(&mut self) -> Option<TimelineEvent> {
        match self.tween.as_mut() {
            Some(tween) => {
                tween.direction = Direction::Reverse;
                None
            }
            None => {
                let (current, next) = self.history.pop()?;
                self.current = current;
                self.next = next;
                Some(TimelineEvent::Rewound { current, next })
            }
        }
    }

    /// Advances the tween by one frame delta and returns the boundary event
    /// hit this tick, if any.
    pub fn advance(&mut self, dt: Duration) -> Option<TimelineEvent> {
        let mut tween = self.tween.take()?;
        let step = dt.as_secs_f32() / self.duration.as_secs_f32().max(f32::EPSILON);

        match tween.direction {
            Direction::Forward => {
                tween.t += step;
                if tween.t >= 1.0 {
                    self.history.push((self.current, self.next));
                    self.current = self.next;
                    self.next = (self.next + 1) % self.playlist_len;
                    return Some(TimelineEvent::Committed {
                        current: self.current,
                        next: self.next,
                    });
                }
                self.tween = Some(tween);
            }
            Direction::Reverse => {
                tween.t -= step;
                if tween.t <= 0.0 {
                    return Some(TimelineEvent::ReverseCompleted);
                }
                self.tween = Some(tween);
            }
        }
        None
    }
}
