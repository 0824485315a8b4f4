use std::path::Path;

use anyhow::{Context, Result};
use wgpu::util::{DeviceExt, TextureDataOrder};

/// A texture bound to one of the three fragment sampler slots: a video
/// clip, or the displacement map.
pub(crate) struct TextureSlot {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

fn linear_clamp_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn slot_from_pixels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    size: (u32, u32),
    pixels: &[u8],
) -> TextureSlot {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = linear_clamp_sampler(device);
    TextureSlot {
        texture,
        view,
        sampler,
        size,
    }
}

/// Creates a video slot texture, black until the feed delivers a frame.
pub(crate) fn create_video_slot(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    index: usize,
    size: (u32, u32),
) -> TextureSlot {
    let pixels = vec![0u8; (size.0 * size.1 * 4) as usize];
    slot_from_pixels(
        device,
        queue,
        &format!("video slot texture #{index}"),
        size,
        &pixels,
    )
}

/// Uploads a decoded RGBA frame into a video slot.
pub(crate) fn upload_frame(queue: &wgpu::Queue, slot: &TextureSlot, data: &[u8]) {
    let expected_len = (slot.size.0 * slot.size.1 * 4) as usize;
    if data.len() != expected_len {
        tracing::warn!(
            expected_len,
            actual_len = data.len(),
            "video frame upload ignored due to mismatched payload size"
        );
        return;
    }

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &slot.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(slot.size.0 * 4),
            rows_per_image: Some(slot.size.1),
        },
        wgpu::Extent3d {
            width: slot.size.0,
            height: slot.size.1,
            depth_or_array_layers: 1,
        },
    );
}

/// Loads the displacement map, or falls back to a neutral mid-gray texel
/// that degrades the wipe to a flat cross-fade.
pub(crate) fn load_displacement(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: Option<&Path>,
) -> TextureSlot {
    match path {
        Some(path) => match load_displacement_image(device, queue, path) {
            Ok(slot) => slot,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "failed to load displacement map; using neutral fallback"
                );
                neutral_displacement(device, queue)
            }
        },
        None => neutral_displacement(device, queue),
    }
}

fn load_displacement_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
) -> Result<TextureSlot> {
    let image = image::open(path)
        .with_context(|| format!("failed to open displacement map at {}", path.display()))?;
    let rgba = image.to_rgba8();
    let size = rgba.dimensions();
    Ok(slot_from_pixels(
        device,
        queue,
        "displacement texture",
        size,
        &rgba,
    ))
}

fn neutral_displacement(device: &wgpu::Device, queue: &wgpu::Queue) -> TextureSlot {
    slot_from_pixels(
        device,
        queue,
        "neutral displacement texture",
        (1, 1),
        &[128, 128, 128, 255],
    )
}
