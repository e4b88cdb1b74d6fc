// ── Layer discriminator ───────────────────────────────────────────────────────
//
// Tile vertices carry their layer as an `f32` so it can live in the same
// vertex stream as colors and UVs. Hosts build it from `Layer`; the shaders
// classify it with thresholds instead of equality. `LayerBand::classify`
// mirrors the shader thresholds exactly.

/// Upper bound (exclusive) of the background band, shared by every variant.
pub const BACKGROUND_MAX: f32 = 0.25;
/// Animated-band lower bound (exclusive) for the direct-offset variant.
pub const DIRECT_ANIMATED_MIN: f32 = 0.75;
/// Animated-band lower bound (exclusive) for the indexed-offset variant.
/// Covers the static sprite band too, so static sprites with an entity id
/// also receive their offset.
pub const INDEXED_ANIMATED_MIN: f32 = 0.4;

/// Which layer a tile vertex belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Solid `bg_color` fill; the atlas is not consulted.
    Background,
    /// Glyph or sprite that never moves off its cell.
    Static,
    /// Glyph or sprite that receives a per-frame visual offset.
    Animated,
}

impl Layer {
    /// Canonical `layer_id` written into the vertex stream.
    pub const fn id(self) -> f32 {
        match self {
            Layer::Background => 0.0,
            Layer::Static => 0.5,
            Layer::Animated => 1.0,
        }
    }
}

/// The tile pipeline variants that read `layer_id`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OffsetSource {
    /// Offset comes from the vertex's own `v_offset`.
    Direct,
    /// Offset comes from the per-frame entity table via `entity_id`.
    Indexed,
}

impl OffsetSource {
    pub const fn animated_min(self) -> f32 {
        match self {
            OffsetSource::Direct => DIRECT_ANIMATED_MIN,
            OffsetSource::Indexed => INDEXED_ANIMATED_MIN,
        }
    }
}

/// Result of classifying a `layer_id` for one variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayerBand {
    Background,
    Static,
    Animated,
}

impl LayerBand {
    /// Classify `layer_id` the way the `source` variant's shaders do.
    ///
    /// Below 0.25 is background, above the variant's animated threshold is
    /// animated, and everything in between is static.
    pub fn classify(layer_id: f32, source: OffsetSource) -> LayerBand {
        if layer_id < BACKGROUND_MAX {
            LayerBand::Background
        } else if layer_id > source.animated_min() {
            LayerBand::Animated
        } else {
            LayerBand::Static
        }
    }

    /// Whether the vertex stage applies an offset for this band.
    pub fn receives_offset(self) -> bool {
        self == LayerBand::Animated
    }

    /// Whether the fragment stage samples the atlas for this band.
    pub fn samples_atlas(self) -> bool {
        self != LayerBand::Background
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
