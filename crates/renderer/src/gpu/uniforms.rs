use bytemuck::{Pod, Zeroable};

use crate::camera::Mat4;

/// std140 uniform block shared by the vertex and fragment stages.
///
/// Must match the `WipeParams` block declared in `compile.rs`. `resolution`
/// packs viewport (xy) and texture (zw) resolution; `effect` packs time,
/// progress, spread and intensity. Single-writer discipline: the timeline
/// writes progress, the render loop writes time and the MVP comes from the
/// camera on resize.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct WipeUniforms {
    mvp: [[f32; 4]; 4],
    resolution: [f32; 4],
    effect: [f32; 4],
}

unsafe impl Zeroable for WipeUniforms {}
unsafe impl Pod for WipeUniforms {}

impl WipeUniforms {
    pub fn new(
        viewport: (u32, u32),
        texture_size: (u32, u32),
        spread: f32,
        intensity: f32,
    ) -> Self {
        Self {
            mvp: identity(),
            resolution: [
                viewport.0 as f32,
                viewport.1 as f32,
                texture_size.0 as f32,
                texture_size.1 as f32,
            ],
            effect: [0.0, 0.0, spread, intensity],
        }
    }

    pub fn set_mvp(&mut self, mvp: Mat4) {
        self.mvp = mvp;
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution[0] = width;
        self.resolution[1] = height;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.effect[0] = seconds;
    }

    pub fn time(&self) -> f32 {
        self.effect[0]
    }

    /// Clamps defensively; the eased timeline should never leave [0, 1].
    pub fn set_progress(&mut self, progress: f32) {
        self.effect[1] = progress.clamp(0.0, 1.0);
    }

    pub fn progress(&self) -> f32 {
        self.effect[1]
    }
}

fn identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_matches_std140_layout() {
        // mat4 (64) + vec4 (16) + vec4 (16).
        assert_eq!(std::mem::size_of::<WipeUniforms>(), 96);
        assert_eq!(std::mem::align_of::<WipeUniforms>(), 16);
    }

    #[test]
    fn progress_is_clamped_at_the_boundary() {
        let mut uniforms = WipeUniforms::new((1920, 1080), (2048, 1024), 0.5, 0.25);
        uniforms.set_progress(1.7);
        assert_eq!(uniforms.progress(), 1.0);
        uniforms.set_progress(-0.2);
        assert_eq!(uniforms.progress(), 0.0);
    }

    #[test]
    fn resolution_packs_viewport_and_texture() {
        let uniforms = WipeUniforms::new((800, 600), (2048, 1024), 0.5, 0.25);
        assert_eq!(uniforms.resolution, [800.0, 600.0, 2048.0, 1024.0]);
    }
}
