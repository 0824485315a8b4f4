use serde::{Deserialize, Serialize};

/// Easing curve applied to the transition tween.
///
/// `CircInOut` is the default: it matches the circular ease the effect was
/// authored with, snapping in and out of the wipe with a soft middle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CircIn,
    CircOut,
    #[default]
    CircInOut,
}

impl Easing {
    /// Maps a normalized tween position `t` to eased progress, clamped to
    /// the unit interval on both sides.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CircIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::CircOut => {
                let u = t - 1.0;
                (1.0 - u * u).max(0.0).sqrt()
            }
            Easing::CircInOut => {
                if t < 0.5 {
                    let u = 2.0 * t;
                    (1.0 - (1.0 - u * u).max(0.0).sqrt()) / 2.0
                } else {
                    let u = -2.0 * t + 2.0;
                    ((1.0 - u * u).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::CircIn => "circ-in",
            Easing::CircOut => "circ-out",
            Easing::CircInOut => "circ-in-out",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Easing {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "ease-in" => Ok(Easing::EaseIn),
            "ease-out" => Ok(Easing::EaseOut),
            "ease-in-out" => Ok(Easing::EaseInOut),
            "circ-in" => Ok(Easing::CircIn),
            "circ-out" => Ok(Easing::CircOut),
            "circ-in-out" => Ok(Easing::CircInOut),
            other => Err(format!(
                "unknown easing '{other}'; expected linear, ease-in[-out], or circ-in[-out]"
            )),
        }
    }
}
