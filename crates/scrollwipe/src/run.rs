use anyhow::{Context, Result};
use deckconfig::{AntialiasSetting, DeckConfig};
use renderer::{
    Antialiasing, DeckBindings, Renderer, RendererConfig, ScrollTuning, ShaderOverrides,
    TransitionTuning, DEFAULT_TEXTURE_SIZE,
};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let deck_file = cli
        .deck
        .as_ref()
        .map(|path| {
            DeckConfig::load(path)
                .with_context(|| format!("failed to load deck file {}", path.display()))
        })
        .transpose()?;

    if let Some(path) = cli.deck.as_ref() {
        tracing::info!(deck = %path.display(), "loaded deck file");
    }

    let config = build_renderer_config(&cli, deck_file)?;
    tracing::info!(
        clips = config.deck.len(),
        width = config.surface_size.0,
        height = config.surface_size.1,
        "starting scrollwipe"
    );

    Renderer::new(config).run()
}

/// Merges CLI flags over the deck file; flags win wherever both speak.
fn build_renderer_config(cli: &Cli, deck_file: Option<DeckConfig>) -> Result<RendererConfig> {
    let videos = if cli.videos.is_empty() {
        deck_file
            .as_ref()
            .map(|config| config.video_paths())
            .unwrap_or_default()
    } else {
        cli.videos.clone()
    };
    let mut deck = DeckBindings::new(videos)
        .context("supply a deck file or at least two --video flags")?;

    let displacement = cli.displacement.clone().or_else(|| {
        deck_file
            .as_ref()
            .and_then(|config| config.displacement.clone())
    });
    if let Some(path) = displacement {
        deck.set_displacement(path);
    }

    let mut config = RendererConfig::new(deck);

    if let Some(file) = deck_file.as_ref() {
        config.transition = TransitionTuning {
            duration: file.transition.duration,
            easing: file.transition.easing,
            spread: file.transition.spread,
            intensity: file.transition.intensity,
        };
        config.scroll = ScrollTuning {
            duration: file.scroll.duration,
            wheel_factor: file.scroll.wheel_factor,
        };
        config.target_fps = file.render.fps.filter(|fps| *fps > 0.0);
        if let Some(setting) = file.render.antialias {
            config.antialiasing = map_antialias(setting);
        }
        if let Some(size) = file.render.texture_size {
            config.texture_size = size;
        } else {
            config.texture_size = DEFAULT_TEXTURE_SIZE;
        }
    }

    if let Some(size) = cli.size {
        config.surface_size = size;
    }
    if let Some(fps) = cli.fps {
        config.target_fps = (fps > 0.0).then_some(fps);
    }
    if let Some(antialias) = cli.antialias {
        config.antialiasing = antialias;
    }
    if let Some(duration) = cli.duration {
        config.transition.duration = duration;
    }
    if let Some(easing) = cli.easing {
        config.transition.easing = easing;
    }
    if let Some(duration) = cli.scroll_duration {
        config.scroll.duration = duration;
    }
    if let Some(title) = cli.title.clone() {
        config.window_title = title;
    }
    config.shader_overrides = ShaderOverrides {
        vertex: cli.vertex.clone(),
        fragment: cli.fragment.clone(),
    };

    Ok(config)
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        other => other
            .samples()
            .map(Antialiasing::Samples)
            .unwrap_or(Antialiasing::Auto),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use scrolldeck::Easing;
    use std::io::Write;
    use std::time::Duration;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("scrollwipe").chain(args.iter().copied()))
    }

    #[test]
    fn videos_from_flags_need_no_deck_file() {
        let cli = cli(&["--video", "a.mp4", "--video", "b.mp4"]);
        let config = build_renderer_config(&cli, None).unwrap();
        assert_eq!(config.deck.len(), 2);
        assert_eq!(config.texture_size, DEFAULT_TEXTURE_SIZE);
    }

    #[test]
    fn a_single_video_flag_is_rejected() {
        let cli = cli(&["--video", "only.mp4"]);
        assert!(build_renderer_config(&cli, None).is_err());
    }

    #[test]
    fn deck_file_supplies_defaults_and_flags_override() {
        let deck = DeckConfig::from_toml_str(
            r#"
version = 1
displacement = "disp.jpg"

[[videos]]
path = "a.mp4"

[[videos]]
path = "b.mp4"

[transition]
duration = "500ms"
easing = "linear"

[render]
fps = 30
texture_size = "1024x512"
"#,
        )
        .unwrap();

        let cli = cli(&["--duration", "900ms", "--fps", "0"]);
        let config = build_renderer_config(&cli, Some(deck)).unwrap();

        assert_eq!(config.transition.duration, Duration::from_millis(900));
        assert_eq!(config.transition.easing, Easing::Linear);
        assert_eq!(config.target_fps, None, "fps=0 should uncap");
        assert_eq!(config.texture_size, (1024, 512));
        assert!(config.deck.displacement().is_some());
    }

    #[test]
    fn cli_videos_replace_the_deck_playlist() {
        let deck = DeckConfig::from_toml_str(
            r#"
version = 1

[[videos]]
path = "a.mp4"

[[videos]]
path = "b.mp4"
"#,
        )
        .unwrap();

        let cli = cli(&["--video", "x.mp4", "--video", "y.mp4", "--video", "z.mp4"]);
        let config = build_renderer_config(&cli, Some(deck)).unwrap();
        assert_eq!(config.deck.len(), 3);
        assert_eq!(config.deck.videos()[0].to_str(), Some("x.mp4"));
    }

    #[test]
    fn deck_file_loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
version = 1

[[videos]]
path = "a.mp4"

[[videos]]
path = "b.mp4"
"#
        )
        .unwrap();

        let config = DeckConfig::load(file.path()).unwrap();
        assert_eq!(config.videos.len(), 2);
    }

    #[test]
    fn antialias_settings_map_through() {
        assert_eq!(map_antialias(AntialiasSetting::Auto), Antialiasing::Auto);
        assert_eq!(map_antialias(AntialiasSetting::Off), Antialiasing::Off);
        assert_eq!(
            map_antialias(AntialiasSetting::Samples8),
            Antialiasing::Samples(8)
        );
    }
}
