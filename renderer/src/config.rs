//! Renderer preferences: the read-only preference source consumed by the
//! batching and label engines.

use anyhow::Result;
use serde::Deserialize;

use vantage_geometry::Color;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderPrefs {
    /// Distance at which non-on-top labels disappear in 3D views, unless an
    /// entry overrides it.
    pub max_view_distance: f64,
    /// Fraction of the max view distance over which labels fade towards the
    /// horizon.
    pub fade_out_factor: f64,
    /// Line width edges are drawn with when a batch requests no override.
    pub default_edge_width: f32,
    /// When active, on-top edge batches clear the depth buffer before drawing
    /// so hidden selection bounds are never occluded.
    pub show_hidden_selection_bounds: bool,
    pub soft_bounds: SoftBoundsPrefs,
    pub label_background: LabelBackgroundPrefs,
}

impl Default for RenderPrefs {
    fn default() -> Self {
        Self {
            max_view_distance: 8192.0,
            fade_out_factor: 0.25,
            default_edge_width: 1.0,
            show_hidden_selection_bounds: false,
            soft_bounds: Default::default(),
            label_background: Default::default(),
        }
    }
}

/// Visual fade near the map boundary clipping planes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoftBoundsPrefs {
    pub visible: bool,
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub color: Color,
}

impl Default for SoftBoundsPrefs {
    fn default() -> Self {
        Self {
            visible: false,
            min: [-4096.0; 3],
            max: [4096.0; 3],
            color: Color::new(1.0, 0.25, 0.25, 0.6),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelBackgroundPrefs {
    pub corner_radius: f64,
    pub corner_segments: u32,
}

impl Default for LabelBackgroundPrefs {
    fn default() -> Self {
        Self {
            corner_radius: 3.0,
            corner_segments: 3,
        }
    }
}

impl RenderPrefs {
    /// Parses preferences from a TOML document; missing keys keep their
    /// defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_overrides_keep_remaining_defaults() {
        let prefs = RenderPrefs::from_toml_str(
            r#"
            max_view_distance = 512.0

            [soft_bounds]
            visible = true
            "#,
        )
        .expect("valid prefs");

        assert_eq!(prefs.max_view_distance, 512.0);
        assert!(prefs.soft_bounds.visible);
        // Untouched keys keep their defaults.
        assert_eq!(prefs.fade_out_factor, 0.25);
        assert_eq!(prefs.default_edge_width, 1.0);
        assert_eq!(prefs.label_background.corner_segments, 3);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(RenderPrefs::from_toml_str("max_view_distance = ]").is_err());
    }
}
