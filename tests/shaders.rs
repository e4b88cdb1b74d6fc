use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Interpolation, ShaderStage, StorageAccess, TypeInner};

use glam::Vec3;

use jrender::renderer::shaders::PassKind;
use jrender::renderer::shading;

fn parse(kind: PassKind) -> naga::Module {
    let source = kind.wgsl();
    naga::front::wgsl::parse_str(&source)
        .unwrap_or_else(|e| panic!("{} failed to parse:\n{}", kind.label(), e.emit_to_string(&source)))
}

fn bindings(module: &naga::Module) -> Vec<(u32, u32)> {
    let mut out: Vec<(u32, u32)> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.group, b.binding)))
        .collect();
    out.sort_unstable();
    out
}

fn global_space(module: &naga::Module, name: &str) -> AddressSpace {
    module
        .global_variables
        .iter()
        .find(|(_, var)| var.name.as_deref() == Some(name))
        .map(|(_, var)| var.space)
        .unwrap_or_else(|| panic!("no global named {name}"))
}

/// Interpolation of each location-bound member of the named struct.
fn struct_interpolation(module: &naga::Module, struct_name: &str) -> Vec<(String, Option<Interpolation>)> {
    let ty = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(struct_name))
        .map(|(_, ty)| ty)
        .unwrap_or_else(|| panic!("no struct named {struct_name}"));
    let TypeInner::Struct { members, .. } = &ty.inner else {
        panic!("{struct_name} is not a struct");
    };
    members
        .iter()
        .filter_map(|m| match &m.binding {
            Some(Binding::Location { interpolation, .. }) => {
                Some((m.name.clone().unwrap_or_default(), *interpolation))
            }
            _ => None,
        })
        .collect()
}

// ── Every pass parses and validates ───────────────────────────────────────

#[test]
fn every_pass_validates() {
    for kind in PassKind::ALL {
        let module = parse(kind);
        Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{} failed validation: {:?}", kind.label(), e));
    }
}

#[test]
fn every_pass_has_vertex_and_fragment_entry_points() {
    for kind in PassKind::ALL {
        let module = parse(kind);
        let stage = |name: &str| module.entry_points.iter().find(|ep| ep.name == name).map(|ep| ep.stage);
        assert_eq!(stage("vs_main"), Some(ShaderStage::Vertex), "{kind:?}");
        assert_eq!(stage("fs_main"), Some(ShaderStage::Fragment), "{kind:?}");
    }
}

// ── Binding table ─────────────────────────────────────────────────────────

#[test]
fn bindings_match_the_pass_table() {
    let expected: [(PassKind, &[(u32, u32)]); 10] = [
        (PassKind::Tile, &[(0, 0), (1, 0), (1, 1)]),
        (PassKind::LayeredTile, &[(0, 0), (1, 0), (1, 1)]),
        (PassKind::IndexedTile, &[(0, 0), (1, 0), (1, 1), (2, 0)]),
        (PassKind::BitmapText, &[(0, 0), (1, 0), (1, 1), (2, 0)]),
        (PassKind::SdfText, &[(0, 0), (1, 0), (1, 1), (1, 2)]),
        (PassKind::Panel, &[(0, 0)]),
        (PassKind::Scanline, &[(0, 0), (0, 1), (1, 0)]),
        (PassKind::Vignette, &[(0, 0), (0, 1)]),
        (PassKind::ChromaticAberration, &[(0, 0), (0, 1)]),
        (PassKind::Bloom, &[(0, 0), (0, 1)]),
    ];
    for (kind, groups) in expected {
        assert_eq!(bindings(&parse(kind)), groups.to_vec(), "{kind:?}");
    }
}

#[test]
fn entity_offsets_are_read_only_storage() {
    let module = parse(PassKind::IndexedTile);
    assert_eq!(global_space(&module, "entity_offsets"), AddressSpace::Storage { access: StorageAccess::LOAD });
}

#[test]
fn uniform_sets_are_uniform_buffers() {
    assert_eq!(global_space(&parse(PassKind::Tile), "projection"), AddressSpace::Uniform);
    assert_eq!(global_space(&parse(PassKind::BitmapText), "tint"), AddressSpace::Uniform);
    assert_eq!(global_space(&parse(PassKind::SdfText), "params"), AddressSpace::Uniform);
    assert_eq!(global_space(&parse(PassKind::Scanline), "uniforms"), AddressSpace::Uniform);
}

// ── Interpolation ─────────────────────────────────────────────────────────

#[test]
fn panel_mode_and_clip_rect_are_flat() {
    let members = struct_interpolation(&parse(PassKind::Panel), "VertexOutput");
    for (name, interpolation) in &members {
        let flat = *interpolation == Some(Interpolation::Flat);
        let should_be_flat = name == "mode" || name == "clip_rect";
        assert_eq!(flat, should_be_flat, "panel varying `{name}`");
    }
}

#[test]
fn layer_id_is_flat_in_layered_variants() {
    for kind in [PassKind::LayeredTile, PassKind::IndexedTile] {
        let members = struct_interpolation(&parse(kind), "VertexOutput");
        let layer = members.iter().find(|(name, _)| name == "layer_id").map(|(_, i)| *i);
        assert_eq!(layer, Some(Some(Interpolation::Flat)), "{kind:?}");
    }
}

// ── Constants shared with the CPU model ───────────────────────────────────

#[test]
fn shader_thresholds_match_cpu_model() {
    use jrender::renderer::layer::{BACKGROUND_MAX, DIRECT_ANIMATED_MIN, INDEXED_ANIMATED_MIN};

    let layered = PassKind::LayeredTile.wgsl();
    assert!(layered.contains(&format!("BACKGROUND_MAX: f32 = {BACKGROUND_MAX:?};")));
    assert!(layered.contains(&format!("ANIMATED_MIN: f32 = {DIRECT_ANIMATED_MIN:?};")));

    let indexed = PassKind::IndexedTile.wgsl();
    assert!(indexed.contains(&format!("BACKGROUND_MAX: f32 = {BACKGROUND_MAX:?};")));
    assert!(indexed.contains(&format!("ANIMATED_MIN: f32 = {INDEXED_ANIMATED_MIN:?};")));
}

/// Assert that `kind`'s WGSL declares `const name: ty = value;` verbatim.
fn assert_const(kind: PassKind, name: &str, ty: &str, value: String) {
    let decl = format!("const {name}: {ty} = {value};");
    assert!(kind.wgsl().contains(&decl), "{} does not declare `{decl}`", kind.label());
}

fn f32_literal(v: f32) -> String {
    format!("{v:?}")
}

fn vec3_literal(v: Vec3) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v.x, v.y, v.z)
}

#[test]
fn text_cutoffs_match_cpu_model() {
    assert_const(PassKind::BitmapText, "ALPHA_CUTOFF", "f32", f32_literal(shading::BITMAP_ALPHA_CUTOFF));
    assert_const(PassKind::SdfText, "ALPHA_CUTOFF", "f32", f32_literal(shading::SDF_ALPHA_CUTOFF));
}

#[test]
fn panel_pattern_floor_matches_cpu_model() {
    assert_const(PassKind::Panel, "PATTERN_FLOOR", "f32", f32_literal(shading::PATTERN_FLOOR));
}

#[test]
fn scanline_grade_matches_cpu_model() {
    assert_const(PassKind::Scanline, "GRADE_GAIN", "vec3<f32>", vec3_literal(shading::GRADE_GAIN));
    assert_const(PassKind::Scanline, "GRADE_LIFT", "vec3<f32>", vec3_literal(shading::GRADE_LIFT));
    assert_const(PassKind::Scanline, "SCANLINE_DARKEN", "f32", f32_literal(shading::SCANLINE_DARKEN));
}

#[test]
fn effect_constants_match_cpu_model() {
    assert_const(PassKind::Vignette, "VIGNETTE_INNER", "f32", f32_literal(shading::VIGNETTE_INNER));
    assert_const(PassKind::Vignette, "VIGNETTE_OUTER", "f32", f32_literal(shading::VIGNETTE_OUTER));
    assert_const(PassKind::ChromaticAberration, "CHANNEL_OFFSET", "f32", f32_literal(shading::CHROMATIC_OFFSET));
    assert_const(PassKind::Bloom, "LUMA", "vec3<f32>", vec3_literal(shading::LUMA));
    assert_const(PassKind::Bloom, "BLOOM_THRESHOLD", "f32", f32_literal(shading::BLOOM_THRESHOLD));
    assert_const(PassKind::Bloom, "TAP_OFFSET", "f32", f32_literal(shading::BLOOM_TAP_OFFSET));
    assert_const(PassKind::Bloom, "BLUR_WEIGHT", "f32", f32_literal(shading::BLOOM_BLUR_WEIGHT));
    assert_const(PassKind::Bloom, "BLOOM_STRENGTH", "f32", f32_literal(shading::BLOOM_STRENGTH));
}
