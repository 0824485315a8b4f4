use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use scrolldeck::TransitionState;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::CameraRig;
use crate::mesh::{subdivided_plane, PLANE_SEGMENTS};
use crate::runtime::TimeSample;
use crate::types::RendererConfig;
use crate::video::{self, VideoFeed};

use super::context::GpuContext;
use super::pipeline::{create_pair_bind_group, create_wipe_pipeline, PipelineLayouts};
use super::textures::{create_video_slot, load_displacement, upload_frame, TextureSlot};
use super::uniforms::WipeUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Owns every GPU resource of the effect: surface, pipeline, the plane
/// mesh, one texture slot per playlist clip, the displacement map, and the
/// uniform block.
///
/// The uniform block is the only mutable state shared between the scroll
/// logic and the draw: the caller hands in a [`TransitionState`] (timeline
/// writes) and a [`TimeSample`] (clock writes); resizes update the camera
/// and resolution fields. Nothing else crosses that boundary.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: WipeUniforms,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    camera: CameraRig,
    video_slots: Vec<TextureSlot>,
    feeds: Vec<Option<VideoFeed>>,
    pair_bind_groups: Vec<wgpu::BindGroup>,
    multisample_target: Option<MultisampleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.antialiasing)?;

        let vertex_override = read_override(config.shader_overrides.vertex.as_deref())?;
        let fragment_override = read_override(config.shader_overrides.fragment.as_deref())?;

        let layouts = PipelineLayouts::new(&context.device, vertex_override.as_deref())?;
        let pipeline = create_wipe_pipeline(
            &context.device,
            &layouts,
            fragment_override.as_deref(),
            context.surface_format,
            context.sample_count,
        )
        .context("failed to build wipe pipeline")?;

        let camera = CameraRig::new(context.size);
        let (authored_width, authored_height) = camera.authored_size();
        let plane = subdivided_plane(authored_width, authored_height, PLANE_SEGMENTS);
        let vertex_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("plane vertices"),
                contents: bytemuck::cast_slice(&plane.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("plane indices"),
                contents: bytemuck::cast_slice(&plane.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let index_count = plane.indices.len() as u32;

        let mut uniforms = WipeUniforms::new(
            (context.size.width, context.size.height),
            config.texture_size,
            config.transition.spread,
            config.transition.intensity,
        );
        uniforms.set_mvp(camera.mvp());
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<WipeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let (video_slots, feeds) = spawn_video_slots(&context, config);
        let displacement = load_displacement(
            &context.device,
            &context.queue,
            config.deck.displacement().map(|path| path.as_path()),
        );

        // One bind group per playlist position; position i shows clip i as
        // "current" and clip (i + 1) mod len as "next".
        let pair_bind_groups = (0..video_slots.len())
            .map(|index| {
                create_pair_bind_group(
                    &context.device,
                    &layouts.texture_layout,
                    &video_slots[index],
                    &video_slots[(index + 1) % video_slots.len()],
                    &displacement,
                )
            })
            .collect();

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            vertex_buffer,
            index_buffer,
            index_count,
            camera,
            video_slots,
            feeds,
            pair_bind_groups,
            multisample_target,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.camera.resize(new_size);
        self.uniforms
            .set_resolution(new_size.width as f32, new_size.height as f32);
        self.uniforms.set_mvp(self.camera.mvp());
        self.multisample_target = (self.context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            )
        });
    }

    /// Draws one frame: freshest video frames in, uniforms up, one indexed
    /// draw of the plane with the pair bind group for the current clip.
    pub(crate) fn render(
        &mut self,
        sample: TimeSample,
        transition: &TransitionState,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        for (slot, feed) in self.video_slots.iter().zip(self.feeds.iter_mut()) {
            if let Some(feed) = feed {
                if let Some(data) = feed.latest_frame() {
                    upload_frame(&self.context.queue, slot, &data);
                }
            }
        }

        self.uniforms.set_time(sample.seconds);
        self.uniforms.set_progress(transition.progress);
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            debug!(
                fps = (self.frames_since_last_update as f32 / elapsed.as_secs_f32()).round(),
                time = self.uniforms.time(),
                progress = self.uniforms.progress(),
                current = transition.current,
                next = transition.next,
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("wipe pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            let pair = transition.current % self.pair_bind_groups.len();
            render_pass.set_bind_group(1, &self.pair_bind_groups[pair], &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Creates one texture slot per clip and tries to attach a live feed to
/// each. A clip that fails to probe or spawn keeps rendering as black.
fn spawn_video_slots(
    context: &GpuContext,
    config: &RendererConfig,
) -> (Vec<TextureSlot>, Vec<Option<VideoFeed>>) {
    let ffmpeg = video::ffmpeg_available();
    if !ffmpeg {
        warn!("ffmpeg not found on PATH; video clips will render black");
    }

    let mut slots = Vec::with_capacity(config.deck.len());
    let mut feeds = Vec::with_capacity(config.deck.len());
    for (index, path) in config.deck.videos().iter().enumerate() {
        slots.push(create_video_slot(
            &context.device,
            &context.queue,
            index,
            config.texture_size,
        ));

        if !ffmpeg {
            feeds.push(None);
            continue;
        }

        match video::probe(path) {
            Ok(info) => debug!(
                clip = index,
                path = %path.display(),
                width = info.width,
                height = info.height,
                fps = info.fps,
                duration = info.duration_secs,
                "probed video clip"
            ),
            Err(error) => warn!(
                clip = index,
                path = %path.display(),
                %error,
                "failed to probe video clip"
            ),
        }

        match VideoFeed::spawn(path, config.texture_size.0, config.texture_size.1) {
            Ok(feed) => feeds.push(Some(feed)),
            Err(error) => {
                warn!(
                    clip = index,
                    path = %path.display(),
                    %error,
                    "failed to start video feed; slot stays black"
                );
                feeds.push(None);
            }
        }
    }
    (slots, feeds)
}

fn read_override(path: Option<&std::path::Path>) -> Result<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader at {}", path.display()))
    })
    .transpose()
}
