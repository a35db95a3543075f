use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::{read_bytes, LoadError};
use crate::color::parse_color;
use crate::overlay::OverlayParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub cell_size: f32,
    pub scale: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub color_intensity: f32,
    pub color_scale_gain: f32,
    pub color_low: String,
    pub color_high: String,
    pub surface_offset: f32,
    pub markers: MarkerSettings,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            scale: 1.0,
            min_threshold: 0.0,
            max_threshold: 1.0,
            color_intensity: 1.0,
            color_scale_gain: 1.0,
            color_low: "#2b83ba".to_string(),
            color_high: "#d7191c".to_string(),
            surface_offset: 0.02,
            markers: MarkerSettings::default(),
        }
    }
}

/// Minimum on-screen spacing per marker family, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    pub event_px: f32,
    pub field_object_px: f32,
    pub waypoint_px: f32,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            event_px: 20.0,
            field_object_px: 24.0,
            waypoint_px: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    NonPositive { field: &'static str, value: f32 },
    NotFinite { field: &'static str },
    Negative { field: &'static str, value: f32 },
    InvertedThresholds { min: f32, max: f32 },
    InvalidColor { field: &'static str, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::NonPositive { field, value } => {
                write!(f, "{field} must be positive (got {value})")
            }
            SettingsError::NotFinite { field } => write!(f, "{field} must be finite"),
            SettingsError::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            SettingsError::InvertedThresholds { min, max } => {
                write!(f, "min_threshold {min} is above max_threshold {max}")
            }
            SettingsError::InvalidColor { field, value } => {
                write!(f, "{field} is not a color: {value:?}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

fn finite(field: &'static str, value: f32) -> Result<f32, SettingsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SettingsError::NotFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, SettingsError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, SettingsError> {
    if finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::Negative { field, value })
    }
}

fn color(field: &'static str, value: &str) -> Result<[f32; 3], SettingsError> {
    parse_color(value).ok_or_else(|| SettingsError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

impl OverlaySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.to_params().map(|_| ())
    }

    /// Checks every field and resolves the display parameters.
    pub fn to_params(&self) -> Result<OverlayParams, SettingsError> {
        let min_threshold = finite("min_threshold", self.min_threshold)?;
        let max_threshold = finite("max_threshold", self.max_threshold)?;
        if min_threshold > max_threshold {
            return Err(SettingsError::InvertedThresholds {
                min: min_threshold,
                max: max_threshold,
            });
        }
        self.markers.validate()?;
        Ok(OverlayParams {
            cell_size: positive("cell_size", self.cell_size)?,
            scale: positive("scale", self.scale)?,
            min_threshold,
            max_threshold,
            color_intensity: positive("color_intensity", self.color_intensity)?,
            color_scale_gain: non_negative("color_scale_gain", self.color_scale_gain)?,
            color_low: color("color_low", &self.color_low)?,
            color_high: color("color_high", &self.color_high)?,
            surface_offset: finite("surface_offset", self.surface_offset)?,
        })
    }
}

impl MarkerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_negative("markers.event_px", self.event_px)?;
        non_negative("markers.field_object_px", self.field_object_px)?;
        non_negative("markers.waypoint_px", self.waypoint_px)?;
        Ok(())
    }
}

pub fn parse_settings_json(data: &[u8]) -> Result<OverlaySettings, LoadError> {
    serde_json::from_slice(data).map_err(|err| LoadError::Parse {
        what: "settings",
        message: err.to_string(),
    })
}

pub fn load_settings(path: &Path) -> Result<OverlaySettings, LoadError> {
    let data = read_bytes(path)?;
    parse_settings_json(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_params() {
        let params = OverlaySettings::default().to_params().expect("defaults");
        assert_eq!(params.cell_size, 1.0);
        assert_eq!(params.max_threshold, 1.0);
        assert!((params.color_low[0] - 0x2b as f32 / 255.0).abs() < 1.0e-6);
        assert!((params.color_high[0] - 0xd7 as f32 / 255.0).abs() < 1.0e-6);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings =
            parse_settings_json(br#"{"cell_size": 2.5, "markers": {"event_px": 40}}"#)
                .expect("settings");
        assert_eq!(settings.cell_size, 2.5);
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.markers.event_px, 40.0);
        assert_eq!(settings.markers.waypoint_px, 12.0);
    }

    #[test]
    fn rejects_bad_boundary_values() {
        let bad_cell = OverlaySettings {
            cell_size: -1.0,
            ..Default::default()
        };
        assert_eq!(
            bad_cell.to_params(),
            Err(SettingsError::NonPositive {
                field: "cell_size",
                value: -1.0
            })
        );

        let inverted = OverlaySettings {
            min_threshold: 0.8,
            max_threshold: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            inverted.to_params(),
            Err(SettingsError::InvertedThresholds { .. })
        ));

        let nan = OverlaySettings {
            max_threshold: f32::NAN,
            ..Default::default()
        };
        assert_eq!(
            nan.to_params(),
            Err(SettingsError::NotFinite {
                field: "max_threshold"
            })
        );

        let color = OverlaySettings {
            color_high: "hot pink".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            color.to_params(),
            Err(SettingsError::InvalidColor { field: "color_high", .. })
        ));

        let markers = OverlaySettings {
            markers: MarkerSettings {
                waypoint_px: -2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(markers.validate().is_err());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = SettingsError::NonPositive {
            field: "scale",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "scale must be positive (got 0)");
    }
}
