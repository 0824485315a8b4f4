use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use scrolldeck::{
    SmoothScroll, TimelineEvent, TransitionTimeline, TriggerEvent, TriggerSet,
};
use tracing::{debug, error, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::gpu::GpuState;
use crate::runtime::{FrameScheduler, SystemTimeSource, TimeSource};
use crate::types::RendererConfig;

/// Virtual pixels one wheel "line" scrolls the page by.
const WHEEL_LINE_HEIGHT: f32 = 40.0;

/// Ceiling on the per-tick delta so a stalled window (hidden, dragged)
/// cannot teleport the scroll and the tween on the next frame.
const MAX_TICK: Duration = Duration::from_millis(100);

/// Opens the preview window and drives the effect until it is closed.
///
/// Each redraw: advance the smooth scroll, evaluate the section triggers,
/// pump the transition timeline, and render with the resulting uniforms.
/// Resize events recompute the camera, the trigger thresholds and the
/// scroll extent before the next frame.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.window_title.clone())
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create preview window")?;

    let mut gpu = GpuState::new(&window, window.inner_size(), config)
        .context("failed to initialise GPU state")?;

    let viewport_height = gpu.size().height.max(1) as f32;
    let mut triggers = TriggerSet::for_sections(config.deck.len(), viewport_height);
    let mut scroll = SmoothScroll::new(config.scroll.duration, triggers.scroll_limit());
    let mut timeline = TransitionTimeline::new(
        config.deck.len(),
        config.transition.duration,
        config.transition.easing,
    )
    .context("failed to build transition timeline")?;

    let wheel_factor = config.scroll.wheel_factor;
    let mut scheduler = FrameScheduler::new(config.target_fps);
    let mut time_source = SystemTimeSource::new();
    let mut last_tick = Instant::now();

    window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    // Wheel-down reports negative y but scrolls the page
                    // forward, hence the sign flip.
                    let pixels = match delta {
                        MouseScrollDelta::LineDelta(_, lines) => -lines * WHEEL_LINE_HEIGHT,
                        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                    };
                    scroll.add_wheel_delta(pixels * wheel_factor);
                }
                WindowEvent::Resized(new_size) => {
                    gpu.resize(new_size);
                    triggers.relayout(new_size.height.max(1) as f32);
                    scroll.set_limit(triggers.scroll_limit());
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(gpu.size());
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = now.saturating_duration_since(last_tick).min(MAX_TICK);
                    last_tick = now;

                    let position = scroll.advance(dt);
                    for trigger_event in triggers.evaluate(position) {
                        match trigger_event {
                            TriggerEvent::Enter(boundary) => {
                                debug!(boundary, position, "scroll trigger entered");
                                timeline.trigger_forward();
                            }
                            TriggerEvent::LeaveBack(boundary) => {
                                debug!(boundary, position, "scroll trigger left backwards");
                                if let Some(event) = timeline.trigger_reverse() {
                                    log_timeline_event(event);
                                }
                            }
                        }
                    }
                    if let Some(event) = timeline.advance(dt) {
                        log_timeline_event(event);
                    }

                    match gpu.render(time_source.sample(), &timeline.state()) {
                        Ok(()) => scheduler.mark_rendered(now),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu.resize(gpu.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(other) => {
                            warn!(error = ?other, "surface error; retrying next frame");
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.ready_for_frame(now) {
                    window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

fn log_timeline_event(event: TimelineEvent) {
    match event {
        TimelineEvent::Committed { current, next } => {
            debug!(current, next, "transition committed");
        }
        TimelineEvent::ReverseCompleted => {
            debug!("reverse transition completed");
        }
        TimelineEvent::Rewound { current, next } => {
            debug!(current, next, "rewound to previous texture pair");
        }
    }
}
