// ── CPU shading model ─────────────────────────────────────────────────────────
//
// Scalar Rust versions of the per-vertex and per-fragment math in
// `shaders/*.wgsl`. Each function evaluates one invocation; `None` stands
// for a discarded fragment. Screen-space derivatives have no CPU equivalent,
// so the functions that need them take the derivative as an argument.
//
// Keep these in lockstep with the WGSL: the constants below are the same
// literals the shaders use.

use glam::{Vec2, Vec3, Vec4};

use super::entity_offsets::EntityOffsetTable;
use super::layer::{LayerBand, OffsetSource};

// ── Shared helpers ────────────────────────────────────────────────────────────

/// WGSL `smoothstep`: Hermite interpolation of `x` between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// WGSL `mix`.
pub fn mix(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a * (1.0 - t) + b * t
}

// ── Tile family ───────────────────────────────────────────────────────────────

/// Single-layer tile: foreground glyph over the cell's own background.
/// `mix(bg, fg * sample, sample.a)`.
pub fn composite_single_layer(fg: Vec4, bg: Vec4, sample: Vec4) -> Vec4 {
    mix(bg, fg * sample, sample.w)
}

/// Direct-offset glyph over transparent: the tinted sample is weighted by
/// atlas alpha before blending. `mix(0, fg * sample, sample.a)`.
pub fn composite_premix(fg: Vec4, sample: Vec4) -> Vec4 {
    mix(Vec4::ZERO, fg * sample, sample.w)
}

/// Indexed-offset glyph: straight component-wise multiply. `fg * sample`.
pub fn composite_multiply(fg: Vec4, sample: Vec4) -> Vec4 {
    fg * sample
}

/// Fragment color of a layered tile.
///
/// The background band returns `bg` without calling `sample`; every other
/// band samples the atlas and applies the variant's composite rule.
pub fn layered_tile_fragment(
    source: OffsetSource,
    layer_id: f32,
    fg: Vec4,
    bg: Vec4,
    sample: impl FnOnce() -> Vec4,
) -> Vec4 {
    if !LayerBand::classify(layer_id, source).samples_atlas() {
        return bg;
    }
    let texel = sample();
    match source {
        OffsetSource::Direct => composite_premix(fg, texel),
        OffsetSource::Indexed => composite_multiply(fg, texel),
    }
}

/// World position of a direct-offset vertex (z is always 0).
pub fn direct_tile_world(position: Vec2, v_offset: Vec2, layer_id: f32) -> Vec3 {
    let offset = if LayerBand::classify(layer_id, OffsetSource::Direct).receives_offset() {
        v_offset
    } else {
        Vec2::ZERO
    };
    (position + offset).extend(0.0)
}

/// World position of an indexed-offset vertex after the entity table lookup.
pub fn indexed_tile_world(
    position: Vec3,
    entity_id: u32,
    layer_id: f32,
    table: &EntityOffsetTable,
) -> Vec3 {
    let offset = if LayerBand::classify(layer_id, OffsetSource::Indexed).receives_offset() {
        Vec2::from(table.resolve(entity_id))
    } else {
        Vec2::ZERO
    };
    position + offset.extend(0.0)
}

// ── Bitmap text ───────────────────────────────────────────────────────────────

/// Atlas coverage below this is treated as bleed and discarded.
pub const BITMAP_ALPHA_CUTOFF: f32 = 0.1;

pub fn bitmap_text_fragment(tint: Vec4, atlas_alpha: f32) -> Option<Vec4> {
    if atlas_alpha < BITMAP_ALPHA_CUTOFF {
        return None;
    }
    Some(tint.truncate().extend(tint.w * atlas_alpha))
}

// ── Distance-field text ───────────────────────────────────────────────────────

/// Coverage below this is discarded.
pub const SDF_ALPHA_CUTOFF: f32 = 0.001;
/// Floor for the UV derivative, so a zero derivative cannot divide by zero.
pub const SDF_DERIVATIVE_EPSILON: f32 = 1.0e-6;

/// Median of three; reconstructs the signed distance from an MSDF texel.
pub fn median(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

/// Screen pixels covered by one SDF distance unit at the current scale.
///
/// `uv_dx` / `uv_dy` are the screen-space derivatives of the texture
/// coordinate. Never less than 1.0.
pub fn screen_px_range(distance_range: f32, atlas_size: Vec2, uv_dx: Vec2, uv_dy: Vec2) -> f32 {
    let unit_range = Vec2::splat(distance_range) / atlas_size;
    let uv_step = uv_dx.abs().max(uv_dy.abs()).max(Vec2::splat(SDF_DERIVATIVE_EPSILON));
    let screen_tex_size = Vec2::ONE / uv_step;
    (0.5 * unit_range.dot(screen_tex_size)).max(1.0)
}

/// Coverage for signed distance `sd` (edge at 0.5, inside above).
pub fn sdf_coverage(sd: f32, screen_px_range: f32) -> f32 {
    ((sd - 0.5) * screen_px_range + 0.5).clamp(0.0, 1.0)
}

pub fn sdf_text_fragment(texel_rgb: Vec3, color: Vec4, screen_px_range: f32) -> Option<Vec4> {
    let sd = median(texel_rgb.x, texel_rgb.y, texel_rgb.z);
    let alpha = sdf_coverage(sd, screen_px_range);
    if alpha < SDF_ALPHA_CUTOFF {
        return None;
    }
    Some(color.truncate().extend(color.w * alpha))
}

// ── Panels ────────────────────────────────────────────────────────────────────

/// Corner order used by `radius`: top-left, top-right, bottom-right, bottom-left.
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Corner index for each (x sign, y sign) pair, indexed `[sx + 1][sy + 1]`
/// with signs in {-1, 0, 1}. Y grows downward. Points on either axis fall
/// back to top-left.
const CORNER_BY_SIGN: [[usize; 3]; 3] = [
    // x < 0:   y < 0      y == 0     y > 0
    [TOP_LEFT, TOP_LEFT, BOTTOM_LEFT],
    // x == 0
    [TOP_LEFT, TOP_LEFT, TOP_LEFT],
    // x > 0
    [TOP_RIGHT, TOP_LEFT, BOTTOM_RIGHT],
];

fn sign_index(v: f32) -> usize {
    if v > 0.0 {
        2
    } else if v < 0.0 {
        0
    } else {
        1
    }
}

/// Radius of the corner whose quadrant contains `p` (relative to the center).
pub fn corner_radius(p: Vec2, radii: [f32; 4]) -> f32 {
    radii[CORNER_BY_SIGN[sign_index(p.x)][sign_index(p.y)]]
}

/// Signed distance from `p` to a rounded rectangle centred on the origin.
/// Negative inside, zero on the boundary, positive outside.
pub fn sd_rounded_rect(p: Vec2, half_extents: Vec2, radii: [f32; 4]) -> f32 {
    let r = corner_radius(p, radii);
    let q = p.abs() - half_extents + Vec2::splat(r);
    q.x.max(q.y).min(0.0) + q.max(Vec2::ZERO).length() - r
}

/// Procedural fill selected by a panel's `mode`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PanelPattern {
    Solid,
    Crosshatch,
    Dotted,
}

impl PanelPattern {
    /// Unknown modes render solid.
    pub fn from_mode(mode: u32) -> Self {
        match mode {
            1 => PanelPattern::Crosshatch,
            2 => PanelPattern::Dotted,
            _ => PanelPattern::Solid,
        }
    }

    pub fn mode(self) -> u32 {
        match self {
            PanelPattern::Solid => 0,
            PanelPattern::Crosshatch => 1,
            PanelPattern::Dotted => 2,
        }
    }
}

/// Darkest a pattern may pull the fill toward.
pub const PATTERN_FLOOR: f32 = 0.7;
/// Floor for the anti-aliasing width so `smoothstep` never sees equal edges.
pub const PANEL_MIN_AA: f32 = 1.0e-4;

/// Multiplier in `[0.7, 1.0]` applied to the fill color at screen position `pos`.
pub fn pattern_value(pattern: PanelPattern, pos: Vec2, spacing: f32) -> f32 {
    let spacing = spacing.max(1.0);
    let ink = match pattern {
        PanelPattern::Solid => 0.0,
        PanelPattern::Crosshatch => {
            let k = std::f32::consts::FRAC_1_SQRT_2;
            let rotated = Vec2::new(pos.x * k - pos.y * k, pos.x * k + pos.y * k);
            let freq = std::f32::consts::TAU / spacing;
            let a = smoothstep(0.8, 1.0, (rotated.x * freq).sin());
            let b = smoothstep(0.8, 1.0, (rotated.y * freq).sin());
            a.max(b)
        }
        PanelPattern::Dotted => {
            let cell = pos / spacing;
            let local = cell - cell.floor() - Vec2::splat(0.5);
            1.0 - smoothstep(0.15, 0.25, local.length())
        }
    };
    1.0 + (PATTERN_FLOOR - 1.0) * ink
}

/// Whether `pos` lies inside `clip` (`[min_x, min_y, max_x, max_y]`, inclusive).
pub fn inside_clip(pos: Vec2, clip: [f32; 4]) -> bool {
    pos.x >= clip[0] && pos.y >= clip[1] && pos.x <= clip[2] && pos.y <= clip[3]
}

/// 1 inside the shape, 0 outside, smooth across `aa` pixels at the edge.
pub fn shape_alpha(d: f32, aa: f32) -> f32 {
    let aa = aa.max(PANEL_MIN_AA);
    1.0 - smoothstep(-aa, 0.0, d)
}

/// 0 deep inside, 1 from the border inset outward.
pub fn border_mask(d: f32, border_thickness: f32, aa: f32) -> f32 {
    let aa = aa.max(PANEL_MIN_AA);
    smoothstep(-border_thickness - aa, -border_thickness, d)
}

/// Everything one panel fragment sees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanelFragmentInput {
    /// Framebuffer position in pixels (Y down).
    pub frag_pos: Vec2,
    pub rect_size: Vec2,
    /// Position inside the rect, normalized to `[0, 1]²`.
    pub rect_coord: Vec2,
    pub color: Vec4,
    pub border_color: Vec4,
    pub radius: [f32; 4],
    pub border_thickness: f32,
    pub mode: u32,
    pub mode_param: f32,
    pub clip_rect: [f32; 4],
    /// Screen-space derivative magnitude of the distance at this fragment.
    pub aa_width: f32,
}

pub fn panel_fragment(input: &PanelFragmentInput) -> Option<Vec4> {
    if !inside_clip(input.frag_pos, input.clip_rect) {
        return None;
    }

    let half = input.rect_size * 0.5;
    let p = (input.rect_coord - Vec2::splat(0.5)) * input.rect_size;
    let d = sd_rounded_rect(p, half, input.radius);

    let shape = shape_alpha(d, input.aa_width);
    let border = border_mask(d, input.border_thickness, input.aa_width);
    let pattern = pattern_value(PanelPattern::from_mode(input.mode), input.frag_pos, input.mode_param);

    let mut color = (input.color.truncate() * pattern).extend(input.color.w);
    color = mix(color, input.border_color, border * input.border_color.w);
    color.w *= shape;

    if color.w <= 0.0 {
        return None;
    }
    Some(color)
}

// ── Scanline post-process ─────────────────────────────────────────────────────

/// Per-channel gain of the phosphor grade.
pub const GRADE_GAIN: Vec3 = Vec3::new(0.82, 1.00, 1.05);
/// Per-channel lift (black point) of the phosphor grade.
pub const GRADE_LIFT: Vec3 = Vec3::new(0.015, 0.045, 0.045);
/// Brightness of darkened scanline rows.
pub const SCANLINE_DARKEN: f32 = 0.82;

pub fn color_grade(rgb: Vec3) -> Vec3 {
    rgb * GRADE_GAIN + GRADE_LIFT
}

/// Whether physical row `physical_y` falls on a darkened logical row.
/// Non-positive scale factors are treated as 1.0.
pub fn is_dark_row(physical_y: f32, scale_factor: f32) -> bool {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    let logical_row = (physical_y / scale).floor() as i64;
    logical_row.rem_euclid(2) == 0
}

/// Final presented color for one pixel of the composited scene. Always opaque.
pub fn scanline_fragment(scene: Vec4, physical_y: f32, scale_factor: f32) -> Vec4 {
    let factor = if is_dark_row(physical_y, scale_factor) { SCANLINE_DARKEN } else { 1.0 };
    (color_grade(scene.truncate()) * factor)
        .clamp(Vec3::ZERO, Vec3::ONE)
        .extend(1.0)
}

// ── Other post-process effects ────────────────────────────────────────────────

/// Distance from the screen center (in UV) where darkening starts and ends.
pub const VIGNETTE_INNER: f32 = 0.4;
pub const VIGNETTE_OUTER: f32 = 0.8;

pub fn vignette_fragment(scene: Vec4, uv: Vec2) -> Vec4 {
    let dist = uv.distance(Vec2::splat(0.5));
    let factor = 1.0 - smoothstep(VIGNETTE_INNER, VIGNETTE_OUTER, dist);
    (scene.truncate() * factor).extend(scene.w)
}

/// Horizontal UV shift of the red and blue channels.
pub const CHROMATIC_OFFSET: f32 = 0.003;

/// `sample` reads the scene at a UV. Red comes from the right and blue from
/// the left, unless that tap would leave the texture.
pub fn chromatic_fragment(uv: Vec2, sample: impl Fn(Vec2) -> Vec4) -> Vec4 {
    let shift = Vec2::new(CHROMATIC_OFFSET, 0.0);
    let center = sample(uv);
    let r = if uv.x + CHROMATIC_OFFSET <= 1.0 { sample(uv + shift).x } else { center.x };
    let b = if uv.x - CHROMATIC_OFFSET >= 0.0 { sample(uv - shift).z } else { center.z };
    Vec4::new(r, center.y, b, center.w)
}

/// Rec. 709 luma weights.
pub const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);
/// Luma above which a pixel contributes its full color to the glow.
pub const BLOOM_THRESHOLD: f32 = 0.7;
/// UV spacing of the 3x3 blur taps.
pub const BLOOM_TAP_OFFSET: f32 = 0.002;
pub const BLOOM_BLUR_WEIGHT: f32 = 0.5;
pub const BLOOM_STRENGTH: f32 = 0.4;

pub fn bloom_fragment(uv: Vec2, sample: impl Fn(Vec2) -> Vec4) -> Vec4 {
    let color = sample(uv);
    let rgb = color.truncate();
    let bright = if rgb.dot(LUMA) > BLOOM_THRESHOLD { rgb } else { Vec3::ZERO };

    let mut blur = Vec3::ZERO;
    let mut weight = 0.0f32;
    for y in -1..=1 {
        for x in -1..=1 {
            let tap = uv + Vec2::new(x as f32, y as f32) * BLOOM_TAP_OFFSET;
            if tap.cmpge(Vec2::ZERO).all() && tap.cmple(Vec2::ONE).all() {
                blur += sample(tap).truncate();
                weight += 1.0;
            }
        }
    }
    let blur = if weight > 0.0 { blur / weight } else { rgb };

    let glow = bright.max(blur * BLOOM_BLUR_WEIGHT);
    (rgb + glow * BLOOM_STRENGTH).extend(color.w)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn smoothstep_hits_its_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert_relative_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn corner_lookup_matches_quadrants() {
        let radii = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(corner_radius(Vec2::new(-1.0, -1.0), radii), 1.0);
        assert_eq!(corner_radius(Vec2::new(1.0, -1.0), radii), 2.0);
        assert_eq!(corner_radius(Vec2::new(1.0, 1.0), radii), 3.0);
        assert_eq!(corner_radius(Vec2::new(-1.0, 1.0), radii), 4.0);
    }

    #[test]
    fn corner_lookup_ties_default_to_top_left() {
        let radii = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(corner_radius(Vec2::new(0.0, 5.0), radii), 1.0);
        assert_eq!(corner_radius(Vec2::new(5.0, 0.0), radii), 1.0);
        assert_eq!(corner_radius(Vec2::ZERO, radii), 1.0);
    }

    #[test]
    fn rounded_corner_is_cut() {
        // Square corner point of a 10×10 box with a radius-4 bottom-right corner.
        let d = sd_rounded_rect(Vec2::new(5.0, 5.0), Vec2::splat(5.0), [0.0, 0.0, 4.0, 0.0]);
        assert!(d > 0.0);
        let d_square = sd_rounded_rect(Vec2::new(-4.9, -4.9), Vec2::splat(5.0), [0.0, 0.0, 4.0, 0.0]);
        assert!(d_square < 0.0);
    }

    #[test]
    fn pattern_modes_round_trip() {
        for p in [PanelPattern::Solid, PanelPattern::Crosshatch, PanelPattern::Dotted] {
            assert_eq!(PanelPattern::from_mode(p.mode()), p);
        }
        assert_eq!(PanelPattern::from_mode(42), PanelPattern::Solid);
    }

    #[test]
    fn patterns_stay_within_contrast_band() {
        for pattern in [PanelPattern::Crosshatch, PanelPattern::Dotted] {
            for i in 0..200 {
                let pos = Vec2::new(i as f32 * 0.37, i as f32 * 0.91);
                let v = pattern_value(pattern, pos, 8.0);
                assert!((PATTERN_FLOOR..=1.0).contains(&v), "{pattern:?} at {pos} = {v}");
            }
        }
        assert_eq!(pattern_value(PanelPattern::Solid, Vec2::new(3.0, 4.0), 8.0), 1.0);
    }

    #[test]
    fn grade_lifts_black() {
        let g = color_grade(Vec3::ZERO);
        assert_relative_eq!(g.x, 0.015);
        assert_relative_eq!(g.y, 0.045);
        assert_relative_eq!(g.z, 0.045);
    }

    #[test]
    fn scanline_output_is_opaque_and_clamped() {
        let out = scanline_fragment(Vec4::new(1.0, 1.0, 1.0, 0.2), 1.5, 1.0);
        assert_eq!(out.w, 1.0);
        assert!(out.z <= 1.0);
    }

    #[test]
    fn zero_scale_factor_falls_back_to_one() {
        assert_eq!(is_dark_row(0.5, 0.0), is_dark_row(0.5, 1.0));
        assert_eq!(is_dark_row(1.5, -2.0), is_dark_row(1.5, 1.0));
    }
}
