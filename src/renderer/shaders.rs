// ── Shader sources ───────────────────────────────────────────────────────────
//
// Each pass is one WGSL module assembled from a shared prelude plus the pass
// body. Scene passes get the projection uniform at group 0; post-process
// passes get the full-screen vertex stage instead.

const PROJECTION_PRELUDE: &str = include_str!("shaders/projection.wgsl");
const FULLSCREEN_PRELUDE: &str = include_str!("shaders/fullscreen.wgsl");

/// Every render pass the compositor builds a pipeline for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    Tile,
    LayeredTile,
    IndexedTile,
    BitmapText,
    SdfText,
    Panel,
    Scanline,
    Vignette,
    ChromaticAberration,
    Bloom,
}

impl PassKind {
    pub const ALL: [PassKind; 10] = [
        PassKind::Tile,
        PassKind::LayeredTile,
        PassKind::IndexedTile,
        PassKind::BitmapText,
        PassKind::SdfText,
        PassKind::Panel,
        PassKind::Scanline,
        PassKind::Vignette,
        PassKind::ChromaticAberration,
        PassKind::Bloom,
    ];

    /// Debug label used for the shader module, pipeline and error reports.
    pub const fn label(self) -> &'static str {
        match self {
            PassKind::Tile => "tile",
            PassKind::LayeredTile => "tile_layered",
            PassKind::IndexedTile => "tile_indexed",
            PassKind::BitmapText => "text_bitmap",
            PassKind::SdfText => "text_sdf",
            PassKind::Panel => "panel",
            PassKind::Scanline => "scanline",
            PassKind::Vignette => "vignette",
            PassKind::ChromaticAberration => "chromatic_aberration",
            PassKind::Bloom => "bloom",
        }
    }

    /// Post-process passes read the composited scene and draw a full-screen quad.
    pub fn is_post_process(self) -> bool {
        matches!(
            self,
            PassKind::Scanline | PassKind::Vignette | PassKind::ChromaticAberration | PassKind::Bloom
        )
    }

    fn body(self) -> &'static str {
        match self {
            PassKind::Tile => include_str!("shaders/tile.wgsl"),
            PassKind::LayeredTile => include_str!("shaders/tile_layered.wgsl"),
            PassKind::IndexedTile => include_str!("shaders/tile_indexed.wgsl"),
            PassKind::BitmapText => include_str!("shaders/text_bitmap.wgsl"),
            PassKind::SdfText => include_str!("shaders/text_sdf.wgsl"),
            PassKind::Panel => include_str!("shaders/panel.wgsl"),
            PassKind::Scanline => include_str!("shaders/scanline.wgsl"),
            PassKind::Vignette => include_str!("shaders/vignette.wgsl"),
            PassKind::ChromaticAberration => include_str!("shaders/chromatic.wgsl"),
            PassKind::Bloom => include_str!("shaders/bloom.wgsl"),
        }
    }

    /// Complete WGSL source for this pass.
    pub fn wgsl(self) -> String {
        let prelude = if self.is_post_process() { FULLSCREEN_PRELUDE } else { PROJECTION_PRELUDE };
        format!("{}\n{}", prelude, self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = PassKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), PassKind::ALL.len());
    }

    #[test]
    fn scene_passes_carry_the_projection_uniform() {
        for kind in PassKind::ALL {
            let src = kind.wgsl();
            assert_eq!(src.contains("var<uniform> projection"), !kind.is_post_process(), "{kind:?}");
            assert!(src.contains("fn vs_main") && src.contains("fn fs_main"), "{kind:?}");
        }
    }
}
