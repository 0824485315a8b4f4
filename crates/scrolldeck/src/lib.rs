//! Scroll and transition logic for the scrollwipe effect.
//!
//! This crate holds everything that can be reasoned about without a GPU:
//!
//! * [`scroll::SmoothScroll`]: wheel-driven smooth-scroll emulation over a
//!   virtual page of stacked sections.
//! * [`trigger::TriggerSet`]: section-boundary thresholds that fire
//!   enter/leave-back events as the smoothed position crosses them.
//! * [`timeline::TransitionTimeline`]: the state machine that turns those
//!   events into an eased progress value and rotates the current/next
//!   texture pair.
//!
//! The renderer consumes a [`timeline::TransitionState`] snapshot each frame;
//! nothing in here touches wgpu or winit.

pub mod easing;
pub mod scroll;
pub mod timeline;
pub mod trigger;

pub use easing::Easing;
pub use scroll::SmoothScroll;
pub use timeline::{TimelineEvent, TransitionState, TransitionTimeline};
pub use trigger::{TriggerEvent, TriggerSet};

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("a transition deck needs at least two clips, got {0}")]
    TooFewClips(usize),
}
