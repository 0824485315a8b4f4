//! Renderer crate for scrollwipe.
//!
//! Glues the winit preview window, the `wgpu` pipeline and the
//! displacement-wipe shaders together. The overall flow is:
//!
//! ```text
//!   CLI / deck file
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ redraw tick
//!          ▲               │                    │
//!          │          wheel/resize        SmoothScroll ─▶ TriggerSet
//!          │                                    │              │
//!   ffmpeg feeds ──▶ video textures ──▶ GpuState.render ◀── TransitionTimeline
//! ```
//!
//! `GpuState` owns every GPU resource (surface, pipeline, plane mesh, one
//! texture per clip, displacement map, uniform block); the event loop in
//! `window.rs` owns the scroll emulation and the transition timeline and
//! feeds their snapshots into the draw. Video frames arrive from one
//! ffmpeg child per clip and are uploaded as they land.

mod camera;
mod compile;
mod gpu;
mod mesh;
mod runtime;
mod types;
mod video;
mod window;

use anyhow::Result;

pub use runtime::{FixedTimeSource, FrameScheduler, SystemTimeSource, TimeSample, TimeSource};
pub use types::{
    Antialiasing, DeckBindings, RendererConfig, ScrollTuning, ShaderOverrides, TransitionTuning,
    DEFAULT_TEXTURE_SIZE,
};
pub use video::VideoInfo;

/// High-level entry point that owns the chosen configuration.
///
/// The heavy lifting lives in the window event loop and `GpuState`;
/// `Renderer` simply forwards the request.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the preview window and runs the effect until it is closed.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config)
    }
}
