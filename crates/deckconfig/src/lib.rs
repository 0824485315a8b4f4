//! Playlist configuration for the scrollwipe effect.
//!
//! A deck file is a small TOML document naming the ordered video clips, the
//! displacement map, and the tunables for the transition, the scroll
//! emulation, and the renderer:
//!
//! ```toml
//! version = 1
//! displacement = "assets/displacement.jpg"
//!
//! [[videos]]
//! path = "assets/video1.mp4"
//!
//! [[videos]]
//! path = "assets/video2.mp4"
//!
//! [transition]
//! duration = "800ms"
//! easing = "circ-in-out"
//!
//! [scroll]
//! duration = "2s"
//! ```
//!
//! Durations accept either plain seconds (`2`, `0.8`) or humantime strings
//! (`"800ms"`, `"2s"`). Everything except the clip list has a default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use scrolldeck::Easing;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckConfig {
    pub version: u32,
    /// Grayscale displacement image steering the wipe. Optional: a missing
    /// entry (or file) falls back to a neutral map, i.e. a flat cross-fade.
    #[serde(default)]
    pub displacement: Option<PathBuf>,
    #[serde(default)]
    pub videos: Vec<VideoEntry>,
    #[serde(default)]
    pub transition: TransitionSettings,
    #[serde(default)]
    pub scroll: ScrollSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoEntry {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionSettings {
    #[serde(
        default = "default_transition_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    #[serde(default)]
    pub easing: Easing,
    /// How unevenly the wipe front spreads across displacement values;
    /// 0 degenerates to a flat cross-fade.
    #[serde(default = "default_spread")]
    pub spread: f32,
    /// Strength of the UV distortion while a transition is in flight.
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: default_transition_duration(),
            easing: Easing::default(),
            spread: default_spread(),
            intensity: default_intensity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollSettings {
    #[serde(
        default = "default_scroll_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    /// Multiplier applied to raw wheel deltas before they hit the target.
    #[serde(default = "default_wheel_factor")]
    pub wheel_factor: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            duration: default_scroll_duration(),
            wheel_factor: default_wheel_factor(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSettings {
    /// FPS cap; 0 or absent renders every refresh callback.
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    /// Resolution the video feeds decode at, e.g. "2048x1024".
    #[serde(default, deserialize_with = "deserialize_texture_size_opt")]
    pub texture_size: Option<(u32, u32)>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: None,
            antialias: None,
            texture_size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

fn default_transition_duration() -> Duration {
    Duration::from_millis(800)
}

fn default_scroll_duration() -> Duration {
    Duration::from_secs(2)
}

fn default_spread() -> f32 {
    0.5
}

fn default_intensity() -> f32 {
    0.25
}

fn default_wheel_factor() -> f32 {
    1.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

fn deserialize_texture_size_opt<'de, D>(deserializer: D) -> Result<Option<(u32, u32)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_texture_size(&value).map_err(de::Error::custom))
        .transpose()
}

pub fn parse_texture_size(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid texture size '{raw}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid texture width in '{raw}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid texture height in '{raw}'"))?;
    if width == 0 || height == 0 {
        return Err("texture dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

impl DeckConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: DeckConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn video_paths(&self) -> Vec<PathBuf> {
        self.videos.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.videos.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "deck must list at least two videos, got {}",
                self.videos.len()
            )));
        }

        if self.transition.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "transition duration must be greater than zero".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.transition.spread) {
            return Err(ConfigError::Invalid(format!(
                "transition spread must be in [0, 1), got {}",
                self.transition.spread
            )));
        }

        if self.transition.intensity < 0.0 {
            return Err(ConfigError::Invalid(
                "transition intensity must be non-negative".into(),
            ));
        }

        if self.scroll.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "scroll duration must be greater than zero".into(),
            ));
        }

        if self.scroll.wheel_factor <= 0.0 {
            return Err(ConfigError::Invalid(
                "scroll wheel_factor must be positive".into(),
            ));
        }

        if let Some(fps) = self.render.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("render fps must be non-negative".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version = 1

[[videos]]
path = "a.mp4"

[[videos]]
path = "b.mp4"
"#;

    #[test]
    fn minimal_deck_gets_defaults() {
        let config = DeckConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.videos.len(), 2);
        assert_eq!(config.transition.duration, Duration::from_millis(800));
        assert_eq!(config.transition.easing, Easing::CircInOut);
        assert_eq!(config.scroll.duration, Duration::from_secs(2));
        assert!(config.displacement.is_none());
        assert!(config.render.fps.is_none());
    }

    #[test]
    fn full_deck_parses() {
        let config = DeckConfig::from_toml_str(
            r#"
version = 1
displacement = "disp.jpg"

[[videos]]
path = "a.mp4"

[[videos]]
path = "b.mp4"

[[videos]]
path = "c.mp4"

[transition]
duration = "650ms"
easing = "ease-in-out"
spread = 0.3
intensity = 0.4

[scroll]
duration = 1.5
wheel_factor = 2.0

[render]
fps = 60
antialias = 4
texture_size = "1920x1080"
"#,
        )
        .unwrap();

        assert_eq!(config.displacement.as_deref(), Some(Path::new("disp.jpg")));
        assert_eq!(config.videos.len(), 3);
        assert_eq!(config.transition.duration, Duration::from_millis(650));
        assert_eq!(config.transition.easing, Easing::EaseInOut);
        assert_eq!(config.scroll.duration, Duration::from_secs_f64(1.5));
        assert_eq!(config.render.fps, Some(60.0));
        assert_eq!(config.render.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(config.render.texture_size, Some((1920, 1080)));
    }

    #[test]
    fn rejects_fewer_than_two_videos() {
        let err = DeckConfig::from_toml_str(
            r#"
version = 1

[[videos]]
path = "only.mp4"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = DeckConfig::from_toml_str(&MINIMAL.replace("version = 1", "version = 9"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_transition_duration() {
        let input = format!("{MINIMAL}\n[transition]\nduration = 0\n");
        assert!(DeckConfig::from_toml_str(&input).is_err());
    }

    #[test]
    fn rejects_out_of_range_spread() {
        let input = format!("{MINIMAL}\n[transition]\nspread = 1.0\n");
        assert!(DeckConfig::from_toml_str(&input).is_err());
    }

    #[test]
    fn antialias_accepts_strings_and_numbers() {
        for (raw, expected) in [
            ("\"auto\"", AntialiasSetting::Auto),
            ("\"off\"", AntialiasSetting::Off),
            ("8", AntialiasSetting::Samples8),
        ] {
            let input = format!("{MINIMAL}\n[render]\nantialias = {raw}\n");
            let config = DeckConfig::from_toml_str(&input).unwrap();
            assert_eq!(config.render.antialias, Some(expected));
        }
    }

    #[test]
    fn texture_size_rejects_malformed_input() {
        assert!(parse_texture_size("2048x1024").is_ok());
        assert!(parse_texture_size("2048").is_err());
        assert!(parse_texture_size("0x100").is_err());
        assert!(parse_texture_size("axb").is_err());
    }
}
