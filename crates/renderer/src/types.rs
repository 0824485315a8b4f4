use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use scrolldeck::Easing;

/// Resolution the video feeds decode at when the deck does not override it.
/// The shader treats this as the fixed texture aspect for cover fitting.
pub const DEFAULT_TEXTURE_SIZE: (u32, u32) = (2048, 1024);

/// Ordered clip playlist plus the displacement map, fixed at startup.
#[derive(Clone, Debug)]
pub struct DeckBindings {
    videos: Vec<PathBuf>,
    displacement: Option<PathBuf>,
}

impl DeckBindings {
    /// Builds a playlist from at least two clips.
    pub fn new(videos: Vec<PathBuf>) -> Result<Self> {
        if videos.len() < 2 {
            anyhow::bail!(
                "transition deck needs at least two videos, got {}",
                videos.len()
            );
        }
        Ok(Self {
            videos,
            displacement: None,
        })
    }

    /// Associates the grayscale displacement image. Without one the wipe
    /// degrades to a flat cross-fade over a neutral map.
    pub fn set_displacement(&mut self, path: PathBuf) {
        self.displacement = Some(path);
    }

    pub fn videos(&self) -> &[PathBuf] {
        &self.videos
    }

    pub fn displacement(&self) -> Option<&PathBuf> {
        self.displacement.as_ref()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Optional GLSL sources replacing the built-in wipe shaders.
#[derive(Clone, Debug, Default)]
pub struct ShaderOverrides {
    pub vertex: Option<PathBuf>,
    pub fragment: Option<PathBuf>,
}

/// Tunables of the transition tween and the wipe shape.
#[derive(Clone, Debug)]
pub struct TransitionTuning {
    pub duration: Duration,
    pub easing: Easing,
    /// How unevenly the wipe front spreads across displacement values.
    pub spread: f32,
    /// Strength of the UV distortion while a transition is in flight.
    pub intensity: f32,
}

impl Default for TransitionTuning {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(800),
            easing: Easing::default(),
            spread: 0.5,
            intensity: 0.25,
        }
    }
}

/// Tunables of the smooth-scroll emulation.
#[derive(Clone, Debug)]
pub struct ScrollTuning {
    pub duration: Duration,
    pub wheel_factor: f32,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(2),
            wheel_factor: 1.0,
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Mirrors CLI flags and deck-file settings: which clips and displacement
/// map to bind, how large the window should open, and how the transition
/// and scroll emulation behave.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Clip playlist and displacement map.
    pub deck: DeckBindings,
    /// Resolution the video feeds decode at.
    pub texture_size: (u32, u32),
    /// Optional replacement shader sources.
    pub shader_overrides: ShaderOverrides,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Optional FPS cap; None renders every refresh callback.
    pub target_fps: Option<f32>,
    pub transition: TransitionTuning,
    pub scroll: ScrollTuning,
    /// Title of the preview window.
    pub window_title: String,
}

impl RendererConfig {
    /// A 1080p configuration around the given deck, everything else default.
    pub fn new(deck: DeckBindings) -> Self {
        Self {
            surface_size: (1920, 1080),
            deck,
            texture_size: DEFAULT_TEXTURE_SIZE,
            shader_overrides: ShaderOverrides::default(),
            antialiasing: Antialiasing::default(),
            target_fps: None,
            transition: TransitionTuning::default(),
            scroll: ScrollTuning::default(),
            window_title: "scrollwipe".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_rejects_a_single_video() {
        assert!(DeckBindings::new(vec![PathBuf::from("one.mp4")]).is_err());
    }

    #[test]
    fn deck_keeps_playlist_order() {
        let deck = DeckBindings::new(vec![
            PathBuf::from("a.mp4"),
            PathBuf::from("b.mp4"),
            PathBuf::from("c.mp4"),
        ])
        .unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.videos()[1], PathBuf::from("b.mp4"));
        assert!(deck.displacement().is_none());
    }
}
