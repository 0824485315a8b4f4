use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use renderer::Antialiasing;
use scrolldeck::Easing;

#[derive(Parser, Debug)]
#[command(
    name = "scrollwipe",
    author,
    version,
    about = "Scroll-driven displacement video transition rendered with wgpu",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Deck playlist TOML file (see the README for the format).
    #[arg(value_name = "DECK")]
    pub deck: Option<PathBuf>,

    /// Video clip; repeat at least twice to build a playlist without a
    /// deck file, or to override the deck's clip list.
    #[arg(long = "video", value_name = "PATH")]
    pub videos: Vec<PathBuf>,

    /// Grayscale displacement map steering the wipe.
    #[arg(long, value_name = "PATH")]
    pub displacement: Option<PathBuf>,

    /// Replacement fragment shader body (GLSL, wrapped with the wipe prelude).
    #[arg(long, value_name = "PATH")]
    pub fragment: Option<PathBuf>,

    /// Replacement vertex shader (GLSL, compiled as-is).
    #[arg(long, value_name = "PATH")]
    pub vertex: Option<PathBuf>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// FPS cap (0 = render every refresh callback).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Transition duration (e.g. `800ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Smooth-scroll glide duration (e.g. `2s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub scroll_duration: Option<Duration>,

    /// Easing curve of the transition tween (e.g. `circ-in-out`).
    #[arg(long, value_name = "CURVE")]
    pub easing: Option<Easing>,

    /// Window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 0 || samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in surface size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in surface size".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_sign_negative() || !seconds.is_finite() {
            return Err("duration must be non-negative".into());
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_variants() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("off").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_surface_size() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size("375X812").unwrap(), (375, 812));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
    }

    #[test]
    fn parses_durations_as_seconds_or_humantime() {
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("0.8").unwrap(), Duration::from_millis(800));
        assert_eq!(parse_duration("800ms").unwrap(), Duration::from_millis(800));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn easing_flag_round_trips_through_clap() {
        let cli = Cli::parse_from(["scrollwipe", "--easing", "ease-in-out"]);
        assert_eq!(cli.easing, Some(Easing::EaseInOut));
    }
}
