use serde::Deserialize;

use crate::error::{RenderError, Result};
use crate::renderer::post_process::EFFECT_NAMES;
use crate::renderer::text_pipeline::MtsdfParams;

// ── CompositorConfig ──────────────────────────────────────────────────────────

/// Construction-time settings for [`Compositor`](crate::renderer::Compositor).
///
/// Every field has a default, so a partial (or empty) JSON object is valid:
///
/// ```json
/// { "scanlines": false, "clear_color": [0.02, 0.02, 0.03, 1.0] }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    /// Color the scene target is cleared to at the start of every frame.
    pub clear_color: [f64; 4],
    /// Run the scanline post-process pass over the composited scene.
    pub scanlines: bool,
    /// Run the vignette post-process pass.
    pub vignette: bool,
    /// Run the chromatic aberration post-process pass.
    pub chromatic_aberration: bool,
    /// Run the bloom post-process pass.
    pub bloom: bool,
    /// Number of entity-offset slots the storage buffer starts with.
    pub initial_entity_capacity: usize,
    /// Smallest element count a persistent vertex/index buffer is allocated with.
    pub min_buffer_capacity: u32,
    /// MTSDF distance range (atlas texels) used until a font supplies its own.
    pub default_distance_range: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            scanlines: true,
            vignette: false,
            chromatic_aberration: false,
            bloom: false,
            initial_entity_capacity: 1024,
            min_buffer_capacity: 256,
            default_distance_range: 4.0,
        }
    }
}

impl CompositorConfig {
    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Post-process effects switched on, in stacking order:
    /// scanline, vignette, chromatic aberration, bloom.
    pub fn enabled_effects(&self) -> Vec<&'static str> {
        let toggles = [self.scanlines, self.vignette, self.chromatic_aberration, self.bloom];
        EFFECT_NAMES
            .into_iter()
            .zip(toggles)
            .filter_map(|(name, on)| on.then_some(name))
            .collect()
    }

    pub(crate) fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

// ── MTSDF atlas metadata ──────────────────────────────────────────────────────

/// The part of an msdf-atlas-gen JSON descriptor the text pass needs.
#[derive(Deserialize)]
struct AtlasDescriptor {
    atlas: AtlasBlock,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasBlock {
    width: u32,
    height: u32,
    distance_range: f32,
}

impl MtsdfParams {
    /// Read `atlas.{width, height, distanceRange}` from msdf-atlas-gen output.
    /// Glyph metrics and any other fields are ignored.
    pub fn from_atlas_metadata(json: &str) -> Result<Self> {
        let AtlasDescriptor { atlas } = serde_json::from_str(json).map_err(|e| RenderError::InvalidAtlas {
            reason: format!("unreadable atlas metadata: {}", e),
        })?;
        if atlas.width == 0 || atlas.height == 0 {
            return Err(RenderError::InvalidAtlas {
                reason: format!("atlas metadata has zero size {}x{}", atlas.width, atlas.height),
            });
        }
        if atlas.distance_range.is_nan() || atlas.distance_range <= 0.0 {
            return Err(RenderError::InvalidAtlas {
                reason: format!("distanceRange must be positive, got {}", atlas.distance_range),
            });
        }
        Ok(MtsdfParams::new(atlas.distance_range, atlas.width, atlas.height))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = CompositorConfig::from_json("{}").unwrap();
        assert_eq!(cfg, CompositorConfig::default());
    }

    #[test]
    fn partial_object_overrides_only_named_fields() {
        let cfg = CompositorConfig::from_json(r#"{ "scanlines": false, "vignette": true }"#).unwrap();
        assert!(!cfg.scanlines);
        assert!(cfg.vignette);
        assert_eq!(cfg.min_buffer_capacity, 256);
        assert_eq!(cfg.default_distance_range, 4.0);
    }

    #[test]
    fn enabled_effects_follow_stacking_order() {
        assert_eq!(CompositorConfig::default().enabled_effects(), vec!["scanline"]);

        let cfg = CompositorConfig::from_json(
            r#"{ "bloom": true, "scanlines": false, "chromatic_aberration": true, "vignette": true }"#,
        )
        .unwrap();
        assert_eq!(cfg.enabled_effects(), vec!["vignette", "chromatic_aberration", "bloom"]);
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(CompositorConfig::from_json(r#"{ "scanline": true }"#).is_err());
    }

    #[test]
    fn atlas_metadata_reads_the_atlas_block() {
        let json = r#"{
            "atlas": { "type": "mtsdf", "distanceRange": 6, "size": 48, "width": 512, "height": 256, "yOrigin": "top" },
            "metrics": { "lineHeight": 1.2 },
            "glyphs": []
        }"#;
        let p = MtsdfParams::from_atlas_metadata(json).unwrap();
        assert_eq!(p, MtsdfParams::new(6.0, 512, 256));
    }

    #[test]
    fn atlas_metadata_rejects_missing_or_degenerate_fields() {
        assert!(matches!(
            MtsdfParams::from_atlas_metadata(r#"{ "atlas": { "width": 512, "height": 512 } }"#),
            Err(RenderError::InvalidAtlas { .. })
        ));
        assert!(matches!(
            MtsdfParams::from_atlas_metadata(r#"{ "atlas": { "width": 0, "height": 512, "distanceRange": 4 } }"#),
            Err(RenderError::InvalidAtlas { .. })
        ));
        assert!(MtsdfParams::from_atlas_metadata(r#"{ "atlas": { "width": 8, "height": 8, "distanceRange": 0 } }"#).is_err());
    }

    #[test]
    fn clear_color_maps_to_wgpu_color() {
        let cfg = CompositorConfig { clear_color: [0.1, 0.2, 0.3, 1.0], ..Default::default() };
        let c = cfg.clear_color();
        assert_eq!((c.r, c.g, c.b, c.a), (0.1, 0.2, 0.3, 1.0));
    }
}
