use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

/// Compiles the plane vertex shader, or a caller-supplied replacement.
///
/// A replacement must declare the same vertex inputs (position, uv) and the
/// shared uniform block; it is compiled as-is.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    override_source: Option<&str>,
) -> Result<wgpu::ShaderModule> {
    let source = override_source.unwrap_or(VERTEX_SHADER_GLSL);
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("transition plane vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Wraps a fragment body with the uniform/texture prelude and compiles it.
///
/// The body provides `void mainImage(out vec4 fragColor, in vec2 uv)` and
/// can reference `uTexCurrent`, `uTexNext`, `uTexDisp` plus the `uTime`,
/// `uProgress`, `uSpread`, `uIntensity`, `uResolution` and `uTexResolution`
/// macros. Passing `None` uses the built-in displacement wipe.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    override_source: Option<&str>,
) -> Result<wgpu::ShaderModule> {
    let wrapped = wrap_transition_fragment(override_source.unwrap_or(DEFAULT_FRAGMENT_BODY));
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("transition wipe fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Produces a self-contained GLSL fragment shader from a wipe body.
///
/// Strips any `#version` directive and uniform declarations that collide
/// with the injected prelude, then sandwiches the body between [`HEADER`]
/// and [`FOOTER`].
fn wrap_transition_fragment(source: &str) -> String {
    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        if !skipped_version && line.trim_start().starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let trimmed = line.trim_start();
        let should_skip_uniform = trimmed.starts_with("uniform ")
            && (trimmed.contains("uTime")
                || trimmed.contains("uProgress")
                || trimmed.contains("uResolution")
                || trimmed.contains("uTexResolution")
                || trimmed.contains("uTexCurrent")
                || trimmed.contains("uTexNext")
                || trimmed.contains("uTexDisp"));
        if should_skip_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n#line 1\n{sanitized}{FOOTER}")
}

/// GLSL prologue injected ahead of every fragment body.
///
/// The uniform block layout must match `WipeUniforms` in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform WipeParams {
    mat4 _mvp;
    vec4 _resolution;
    vec4 _effect;
} ubo;

#define uResolution (ubo._resolution.xy)
#define uTexResolution (ubo._resolution.zw)
#define uTime (ubo._effect.x)
#define uProgress (ubo._effect.y)
#define uSpread (ubo._effect.z)
#define uIntensity (ubo._effect.w)

layout(set = 1, binding = 0) uniform texture2D wipe_current_texture;
layout(set = 1, binding = 1) uniform sampler wipe_current_sampler;
layout(set = 1, binding = 2) uniform texture2D wipe_next_texture;
layout(set = 1, binding = 3) uniform sampler wipe_next_sampler;
layout(set = 1, binding = 4) uniform texture2D wipe_disp_texture;
layout(set = 1, binding = 5) uniform sampler wipe_disp_sampler;

#define uTexCurrent sampler2D(wipe_current_texture, wipe_current_sampler)
#define uTexNext sampler2D(wipe_next_texture, wipe_next_sampler)
#define uTexDisp sampler2D(wipe_disp_texture, wipe_disp_sampler)
";

/// GLSL epilogue that delegates to `mainImage` and forces opaque output.
const FOOTER: &str = r"void main() {
    vec4 color = vec4(0.0);
    mainImage(color, v_uv);
    outColor = vec4(color.rgb, 1.0);
}
";

/// The built-in displacement wipe.
///
/// The displacement sample offsets a per-pixel copy of the global progress
/// so low-displacement pixels flip to the next clip first, and both clips
/// are smeared along x by an amount that vanishes at either end of the
/// transition.
const DEFAULT_FRAGMENT_BODY: &str = r"// Fit the fixed-aspect video inside the viewport, cropping the overflow.
vec2 coverUv(vec2 uv) {
    vec2 ratio = vec2(
        min((uResolution.x / uResolution.y) / (uTexResolution.x / uTexResolution.y), 1.0),
        min((uResolution.y / uResolution.x) / (uTexResolution.y / uTexResolution.x), 1.0)
    );
    return (uv - 0.5) * ratio + 0.5;
}

void mainImage(out vec4 fragColor, in vec2 uv) {
    vec2 fitted = coverUv(uv);
    float progress = clamp(uProgress, 0.0, 1.0);
    float disp = clamp(texture(uTexDisp, fitted).r, 0.0, 1.0);

    float local = clamp(progress * (1.0 + uSpread) - disp * uSpread, 0.0, 1.0);

    vec2 fromUv = fitted + vec2(local * disp * uIntensity, 0.0);
    vec2 toUv = fitted - vec2((1.0 - local) * disp * uIntensity, 0.0);

    vec4 fromColor = texture(uTexCurrent, fromUv);
    vec4 toColor = texture(uTexNext, toUv);
    fragColor = mix(fromColor, toColor, local);
}
";

/// Default vertex stage: MVP transform of the subdivided plane.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;
layout(location = 0) out vec2 v_uv;

layout(std140, set = 0, binding = 0) uniform WipeParams {
    mat4 _mvp;
    vec4 _resolution;
    vec4 _effect;
} ubo;

void main() {
    v_uv = uv;
    gl_Position = ubo._mvp * vec4(position, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_strips_colliding_declarations() {
        let source = r#"
            #version 300 es
            uniform float uProgress;
            uniform sampler2D uTexCurrent;
            void mainImage(out vec4 fragColor, in vec2 uv) {
                fragColor = vec4(uv, uProgress, 1.0);
            }
        "#;

        let wrapped = wrap_transition_fragment(source);
        assert!(!wrapped.contains("uniform float uProgress"));
        assert!(!wrapped.contains("uniform sampler2D uTexCurrent"));
        assert!(wrapped.contains("mainImage"));
        assert!(wrapped.starts_with("#version 450"));
        assert_eq!(wrapped.matches("#version").count(), 1);
    }

    #[test]
    fn builtin_body_wraps_cleanly() {
        let wrapped = wrap_transition_fragment(DEFAULT_FRAGMENT_BODY);
        assert!(wrapped.contains("coverUv"));
        assert!(wrapped.contains("void main()"));
    }

    /// CPU mirror of the shader's per-pixel progress offset.
    fn local_progress(progress: f32, disp: f32, spread: f32) -> f32 {
        (progress * (1.0 + spread) - disp * spread).clamp(0.0, 1.0)
    }

    #[test]
    fn blend_is_dominated_by_current_at_rest() {
        for disp in [0.0, 0.3, 0.7, 1.0] {
            assert_eq!(local_progress(0.0, disp, 0.5), 0.0);
        }
    }

    #[test]
    fn blend_is_dominated_by_next_when_done() {
        for disp in [0.0, 0.3, 0.7, 1.0] {
            assert_eq!(local_progress(1.0, disp, 0.5), 1.0);
        }
    }

    #[test]
    fn low_displacement_pixels_flip_first() {
        let spread = 0.5;
        let mid = 0.5;
        assert!(local_progress(mid, 0.1, spread) > local_progress(mid, 0.9, spread));
    }

    #[test]
    fn local_progress_is_monotonic_in_progress() {
        for disp in [0.0, 0.5, 1.0] {
            let mut last = 0.0;
            for step in 0..=100 {
                let local = local_progress(step as f32 / 100.0, disp, 0.5);
                assert!(local >= last);
                last = local;
            }
        }
    }

    #[test]
    fn zero_spread_degenerates_to_flat_crossfade() {
        for disp in [0.0, 0.5, 1.0] {
            let p = 0.37;
            assert!((local_progress(p, disp, 0.0) - p).abs() < 1e-6);
        }
    }
}
