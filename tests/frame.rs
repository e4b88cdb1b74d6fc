use jrender::renderer::entity_offsets::{EntityOffsetTable, NO_ENTITY};
use jrender::renderer::layer::Layer;
use jrender::renderer::panel_pipeline::{PanelQuad, PanelVertex};
use jrender::renderer::pipeline::IndexedTileVertex;
use jrender::renderer::shading::PanelPattern;
use jrender::renderer::text_pipeline::MtsdfParams;
use jrender::{CompositorConfig, DrawCall, Frame, RenderError};

// ── Frame assembly ────────────────────────────────────────────────────────

#[test]
fn frame_keeps_draws_in_submission_order() {
    let panels = {
        let mut v: Vec<PanelVertex> = Vec::new();
        PanelQuad { size: [20.0, 10.0], ..Default::default() }.push_vertices(&mut v);
        v
    };
    let mut frame = Frame::new();
    frame.push(DrawCall::Panels { vertices: &panels });
    frame.push(DrawCall::Panels { vertices: &panels[..3] });

    let counts: Vec<usize> = frame
        .draws
        .iter()
        .map(|d| match d {
            DrawCall::Panels { vertices } => vertices.len(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(counts, vec![6, 3]);
    assert!(frame.entity_offsets.is_none());
}

#[test]
fn frame_carries_the_entity_table() {
    let mut table = EntityOffsetTable::new();
    let hero = table.push([1.5, -0.5]);
    let sprite = IndexedTileVertex::new([32.0, 48.0, 0.5], [0.0, 0.0], [1.0; 4], [0.0; 4], Layer::Animated, hero);
    let vertices = [sprite; 6];

    let frame = Frame::new().with_entity_offsets(&table);
    let resolved = frame.entity_offsets.map(|t| t.resolve(vertices[0].entity_id));
    assert_eq!(resolved, Some([1.5, -0.5]));
}

#[test]
fn untracked_vertices_use_the_sentinel() {
    let v = IndexedTileVertex::new([0.0; 3], [0.0; 2], [1.0; 4], [0.0; 4], Layer::Background, NO_ENTITY);
    assert_eq!(EntityOffsetTable::new().resolve(v.entity_id), [0.0, 0.0]);
}

#[test]
fn dotted_panel_quad_spans_its_rect() {
    let quad = PanelQuad {
        origin: [5.0, 5.0],
        size: [40.0, 30.0],
        pattern: PanelPattern::Dotted,
        pattern_spacing: 6.0,
        radius: [4.0, 4.0, 0.0, 0.0],
        ..Default::default()
    };
    let mut v = Vec::new();
    quad.push_vertices(&mut v);
    let xs: Vec<f32> = v.iter().map(|p| p.position[0]).collect();
    assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 5.0);
    assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 45.0);
    assert!(v.iter().all(|p| p.mode_param == 6.0 && p.radius == [4.0, 4.0, 0.0, 0.0]));
}

// ── Configuration ─────────────────────────────────────────────────────────

#[test]
fn config_loads_from_json_file_contents() {
    let json = r#"{
        "clear_color": [0.05, 0.05, 0.08, 1.0],
        "scanlines": true,
        "vignette": true,
        "initial_entity_capacity": 64
    }"#;
    let cfg = CompositorConfig::from_json(json).unwrap();
    assert_eq!(cfg.initial_entity_capacity, 64);
    assert!(cfg.scanlines && cfg.vignette);
    assert_eq!(cfg.min_buffer_capacity, CompositorConfig::default().min_buffer_capacity);
}

#[test]
fn malformed_config_is_an_invalid_config_error() {
    let err = CompositorConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, RenderError::InvalidConfig(_)));
    assert!(err.to_string().starts_with("invalid compositor configuration"));
}

#[test]
fn msdf_atlas_gen_descriptor_supplies_params() {
    let json = r#"{"atlas":{"type":"mtsdf","distanceRange":4,"size":32,"width":512,"height":512,"yOrigin":"bottom"},"glyphs":[]}"#;
    let params = MtsdfParams::from_atlas_metadata(json).unwrap();
    assert_eq!(params.distance_range, 4.0);
    assert_eq!((params.atlas_width, params.atlas_height), (512.0, 512.0));
}
