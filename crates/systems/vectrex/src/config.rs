//! Display geometry and the host-facing option surface.
//!
//! The host answers key/value queries (see [`CORE_OPTIONS`]); values are
//! folded into a [`GeometryConfig`] only at frame boundaries. A value that
//! cannot be used is reported and skipped, leaving the previous setting live.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPT_RESOLUTION: &str = "vectrex_resolution";
pub const OPT_SCALE_X: &str = "vectrex_scale_x";
pub const OPT_SCALE_Y: &str = "vectrex_scale_y";
pub const OPT_SHIFT_X: &str = "vectrex_shift_x";
pub const OPT_SHIFT_Y: &str = "vectrex_shift_y";

/// Largest accepted scale factor
pub const MAX_SCALE: f32 = 4.0;
/// Largest accepted user shift magnitude
pub const MAX_SHIFT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown resolution preset {0:?}")]
    UnknownResolution(String),
    #[error("invalid scale {value:?} for {key}")]
    InvalidScale { key: &'static str, value: String },
    #[error("invalid shift {value:?} for {key}")]
    InvalidShift { key: &'static str, value: String },
}

/// Output resolutions, each a multiple of the native 330x410 raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionPreset {
    #[default]
    X1,
    X2,
    X3,
    X4,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 4] = [
        ResolutionPreset::X1,
        ResolutionPreset::X2,
        ResolutionPreset::X3,
        ResolutionPreset::X4,
    ];

    /// The largest preset; framebuffer storage is reserved for it.
    pub const MAX: ResolutionPreset = ResolutionPreset::X4;

    /// Parse the host option value ("1".."4").
    pub fn from_option(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(ResolutionPreset::X1),
            "2" => Some(ResolutionPreset::X2),
            "3" => Some(ResolutionPreset::X3),
            "4" => Some(ResolutionPreset::X4),
            _ => None,
        }
    }

    pub fn option_value(self) -> &'static str {
        match self {
            ResolutionPreset::X1 => "1",
            ResolutionPreset::X2 => "2",
            ResolutionPreset::X3 => "3",
            ResolutionPreset::X4 => "4",
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResolutionPreset::X1 => (330, 410),
            ResolutionPreset::X2 => (660, 820),
            ResolutionPreset::X3 => (990, 1230),
            ResolutionPreset::X4 => (1320, 1640),
        }
    }

    /// Phosphor spread: 0 is a bare pixel, 1 a diamond, 2 a rounded 4x4 disc.
    pub fn point_radius(self) -> u8 {
        match self {
            ResolutionPreset::X1 => 0,
            ResolutionPreset::X2 | ResolutionPreset::X3 => 1,
            ResolutionPreset::X4 => 2,
        }
    }
}

/// How machine coordinates land in the framebuffer.
///
/// `pixel = (coord / range * scale + shift) * dimension` per axis. The shift
/// stored here is the effective one; [`GeometryConfig::from_user`] derives it
/// from the user-facing offset so that scaling stays centered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub preset: ResolutionPreset,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shift_x: f32,
    pub shift_y: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            preset: ResolutionPreset::X1,
            scale_x: 1.0,
            scale_y: 1.0,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }
}

fn valid_scale(scale: f32) -> bool {
    scale.is_finite() && scale > 0.0 && scale <= MAX_SCALE
}

fn valid_user_shift(shift: f32) -> bool {
    shift.is_finite() && shift.abs() <= MAX_SHIFT
}

fn centered_shift(scale: f32, user_shift: f32) -> f32 {
    0.5 * (1.0 - scale) + user_shift / 2.0
}

impl GeometryConfig {
    /// Build from explicit effective shifts.
    pub fn new(
        preset: ResolutionPreset,
        scale_x: f32,
        scale_y: f32,
        shift_x: f32,
        shift_y: f32,
    ) -> Result<Self, ConfigError> {
        if !valid_scale(scale_x) {
            return Err(ConfigError::InvalidScale {
                key: OPT_SCALE_X,
                value: scale_x.to_string(),
            });
        }
        if !valid_scale(scale_y) {
            return Err(ConfigError::InvalidScale {
                key: OPT_SCALE_Y,
                value: scale_y.to_string(),
            });
        }
        if !shift_x.is_finite() {
            return Err(ConfigError::InvalidShift {
                key: OPT_SHIFT_X,
                value: shift_x.to_string(),
            });
        }
        if !shift_y.is_finite() {
            return Err(ConfigError::InvalidShift {
                key: OPT_SHIFT_Y,
                value: shift_y.to_string(),
            });
        }
        Ok(Self {
            preset,
            scale_x,
            scale_y,
            shift_x,
            shift_y,
        })
    }

    /// Build from user-facing offsets in [-1, 1], keeping the picture centered
    /// as the scale changes.
    pub fn from_user(
        preset: ResolutionPreset,
        scale_x: f32,
        scale_y: f32,
        user_shift_x: f32,
        user_shift_y: f32,
    ) -> Result<Self, ConfigError> {
        if !valid_user_shift(user_shift_x) {
            return Err(ConfigError::InvalidShift {
                key: OPT_SHIFT_X,
                value: user_shift_x.to_string(),
            });
        }
        if !valid_user_shift(user_shift_y) {
            return Err(ConfigError::InvalidShift {
                key: OPT_SHIFT_Y,
                value: user_shift_y.to_string(),
            });
        }
        Self::new(
            preset,
            scale_x,
            scale_y,
            centered_shift(scale_x, user_shift_x),
            centered_shift(scale_y, user_shift_y),
        )
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.preset.dimensions()
    }

    pub fn point_radius(&self) -> u8 {
        self.preset.point_radius()
    }

    /// The user-facing X offset this geometry was built from.
    pub fn user_shift_x(&self) -> f32 {
        (self.shift_x - 0.5 * (1.0 - self.scale_x)) * 2.0
    }

    /// The user-facing Y offset this geometry was built from.
    pub fn user_shift_y(&self) -> f32 {
        (self.shift_y - 0.5 * (1.0 - self.scale_y)) * 2.0
    }

    /// Fold host option values over `self`.
    ///
    /// Missing scale/shift keys fall back to their defaults; a missing
    /// resolution key keeps the current preset. Values that cannot be used
    /// keep the current setting and are returned as errors.
    pub fn resolve<F>(&self, lookup: F) -> (GeometryConfig, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        let preset = match lookup(OPT_RESOLUTION) {
            Some(value) => ResolutionPreset::from_option(&value).unwrap_or_else(|| {
                rejected.push(ConfigError::UnknownResolution(value));
                self.preset
            }),
            None => self.preset,
        };

        let mut read = |key: &'static str, default: f32, current: f32, scale: bool| -> f32 {
            let Some(value) = lookup(key) else {
                return default;
            };
            match value.trim().parse::<f32>() {
                Ok(v) if scale && valid_scale(v) => v,
                Ok(v) if !scale && valid_user_shift(v) => v,
                _ => {
                    rejected.push(if scale {
                        ConfigError::InvalidScale { key, value }
                    } else {
                        ConfigError::InvalidShift { key, value }
                    });
                    current
                }
            }
        };

        let scale_x = read(OPT_SCALE_X, 1.0, self.scale_x, true);
        let scale_y = read(OPT_SCALE_Y, 1.0, self.scale_y, true);
        let user_shift_x = read(OPT_SHIFT_X, 0.0, self.user_shift_x(), false);
        let user_shift_y = read(OPT_SHIFT_Y, 0.0, self.user_shift_y(), false);

        let geometry = GeometryConfig {
            preset,
            scale_x,
            scale_y,
            shift_x: centered_shift(scale_x, user_shift_x),
            shift_y: centered_shift(scale_y, user_shift_y),
        };
        (geometry, rejected)
    }
}

/// A host-visible option: key, label, permitted values and default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreOption {
    pub key: &'static str,
    pub description: &'static str,
    pub values: &'static [&'static str],
    pub default: &'static str,
}

const SCALE_VALUES: &[&str] = &[
    "0.5", "0.6", "0.7", "0.75", "0.8", "0.85", "0.9", "0.95", "1", "1.05", "1.1", "1.15", "1.2",
    "1.25", "1.3", "1.4", "1.5",
];

const SHIFT_VALUES: &[&str] = &[
    "-0.5", "-0.4", "-0.3", "-0.2", "-0.15", "-0.1", "-0.05", "0", "0.05", "0.1", "0.15", "0.2",
    "0.3", "0.4", "0.5",
];

pub const CORE_OPTIONS: [CoreOption; 5] = [
    CoreOption {
        key: OPT_RESOLUTION,
        description: "Internal resolution multiplier",
        values: &["1", "2", "3", "4"],
        default: "1",
    },
    CoreOption {
        key: OPT_SCALE_X,
        description: "Horizontal scale",
        values: SCALE_VALUES,
        default: "1",
    },
    CoreOption {
        key: OPT_SCALE_Y,
        description: "Vertical scale",
        values: SCALE_VALUES,
        default: "1",
    },
    CoreOption {
        key: OPT_SHIFT_X,
        description: "Horizontal shift",
        values: SHIFT_VALUES,
        default: "0",
    },
    CoreOption {
        key: OPT_SHIFT_Y,
        description: "Vertical shift",
        values: SHIFT_VALUES,
        default: "0",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_preset_table() {
        assert_eq!(ResolutionPreset::X1.dimensions(), (330, 410));
        assert_eq!(ResolutionPreset::X2.dimensions(), (660, 820));
        assert_eq!(ResolutionPreset::X3.dimensions(), (990, 1230));
        assert_eq!(ResolutionPreset::X4.dimensions(), (1320, 1640));

        let radii: Vec<u8> = ResolutionPreset::ALL
            .iter()
            .map(|p| p.point_radius())
            .collect();
        assert_eq!(radii, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_preset_option_parsing() {
        for preset in ResolutionPreset::ALL {
            assert_eq!(
                ResolutionPreset::from_option(preset.option_value()),
                Some(preset)
            );
        }
        assert_eq!(ResolutionPreset::from_option("5"), None);
        assert_eq!(ResolutionPreset::from_option("2x"), None);
    }

    #[test]
    fn test_new_rejects_non_positive_scale() {
        assert!(GeometryConfig::new(ResolutionPreset::X1, 0.0, 1.0, 0.0, 0.0).is_err());
        assert!(GeometryConfig::new(ResolutionPreset::X1, 1.0, -1.0, 0.0, 0.0).is_err());
        assert!(GeometryConfig::new(ResolutionPreset::X1, f32::NAN, 1.0, 0.0, 0.0).is_err());
        assert!(GeometryConfig::new(ResolutionPreset::X1, 1.0, 1.0, f32::INFINITY, 0.0).is_err());
        assert!(GeometryConfig::new(ResolutionPreset::X1, 1.5, 0.5, 0.1, -0.1).is_ok());
    }

    #[test]
    fn test_from_user_keeps_picture_centered() {
        let g = GeometryConfig::from_user(ResolutionPreset::X2, 0.5, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(g.shift_x, 0.25);
        assert_eq!(g.shift_y, 0.0);

        let g = GeometryConfig::from_user(ResolutionPreset::X2, 1.0, 1.0, 0.2, -0.4).unwrap();
        assert!((g.shift_x - 0.1).abs() < 1e-6);
        assert!((g.shift_y + 0.2).abs() < 1e-6);
        assert!((g.user_shift_x() - 0.2).abs() < 1e-6);
        assert!((g.user_shift_y() + 0.4).abs() < 1e-6);

        assert!(GeometryConfig::from_user(ResolutionPreset::X1, 1.0, 1.0, 1.5, 0.0).is_err());
    }

    #[test]
    fn test_resolve_applies_all_keys() {
        let (g, rejected) = GeometryConfig::default().resolve(vars(&[
            (OPT_RESOLUTION, "3"),
            (OPT_SCALE_X, "0.8"),
            (OPT_SCALE_Y, "1.2"),
            (OPT_SHIFT_X, "0.1"),
            (OPT_SHIFT_Y, "-0.1"),
        ]));
        assert!(rejected.is_empty());
        assert_eq!(g.preset, ResolutionPreset::X3);
        assert_eq!(g.point_radius(), 1);
        assert_eq!(g.scale_x, 0.8);
        assert_eq!(g.scale_y, 1.2);
        assert!((g.shift_x - (0.5 * 0.2 + 0.05)).abs() < 1e-6);
        assert!((g.shift_y - (0.5 * -0.2 - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_missing_keys() {
        let prior = GeometryConfig::from_user(ResolutionPreset::X4, 2.0, 2.0, 0.5, 0.5).unwrap();
        let (g, rejected) = prior.resolve(|_| None);
        assert!(rejected.is_empty());
        // Preset is sticky, scale and shift revert to their defaults.
        assert_eq!(g.preset, ResolutionPreset::X4);
        assert_eq!(g, GeometryConfig {
            preset: ResolutionPreset::X4,
            ..GeometryConfig::default()
        });
    }

    #[test]
    fn test_resolve_rejects_bad_values_and_keeps_prior() {
        let prior = GeometryConfig::from_user(ResolutionPreset::X2, 1.1, 0.9, 0.2, 0.0).unwrap();
        let (g, rejected) = prior.resolve(vars(&[
            (OPT_RESOLUTION, "8"),
            (OPT_SCALE_X, "wide"),
            (OPT_SCALE_Y, "0"),
            (OPT_SHIFT_X, "3"),
            (OPT_SHIFT_Y, "0.1"),
        ]));

        assert_eq!(rejected.len(), 4);
        assert!(rejected.contains(&ConfigError::UnknownResolution("8".to_string())));
        assert!(rejected.contains(&ConfigError::InvalidScale {
            key: OPT_SCALE_X,
            value: "wide".to_string()
        }));
        assert_eq!(g.preset, ResolutionPreset::X2);
        assert_eq!(g.scale_x, 1.1);
        assert_eq!(g.scale_y, 0.9);
        assert!((g.user_shift_x() - 0.2).abs() < 1e-5);
        assert!((g.user_shift_y() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_geometry_json_roundtrip() {
        let g = GeometryConfig::from_user(ResolutionPreset::X3, 0.9, 1.0, 0.0, 0.1).unwrap();
        let json = serde_json::to_string(&g).expect("serialize");
        let back: GeometryConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, g);
    }

    #[test]
    fn test_core_options_cover_every_key_and_default_is_listed() {
        let keys: Vec<&str> = CORE_OPTIONS.iter().map(|o| o.key).collect();
        assert_eq!(
            keys,
            vec![OPT_RESOLUTION, OPT_SCALE_X, OPT_SCALE_Y, OPT_SHIFT_X, OPT_SHIFT_Y]
        );
        for option in CORE_OPTIONS.iter() {
            assert!(option.values.contains(&option.default), "{}", option.key);
        }
        // Defaults from the option table reproduce the default geometry.
        let (g, rejected) = GeometryConfig::default().resolve(|key| {
            CORE_OPTIONS
                .iter()
                .find(|o| o.key == key)
                .map(|o| o.default.to_string())
        });
        assert!(rejected.is_empty());
        assert_eq!(g, GeometryConfig::default());
    }
}
