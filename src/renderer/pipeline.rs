use crate::error::Result;
use crate::renderer::layer::Layer;
use crate::renderer::shaders::PassKind;
use crate::renderer::validation::{self, Stage};

/// Depth attachment format shared by every scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── Vertex types ──────────────────────────────────────────────────────────────

/// Single-layer tile: glyph/sprite over a solid background, screen space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub fg_color: [f32; 4],
    pub bg_color: [f32; 4],
}

impl TileVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // fg_color
        3 => Float32x4,  // bg_color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Layered tile whose animated layer carries its own offset.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LayeredTileVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub fg_color: [f32; 4],
    pub bg_color: [f32; 4],
    /// Pixel offset applied only when the vertex is in the animated band.
    pub v_offset: [f32; 2],
    /// See [`Layer::id`].
    pub layer_id: f32,
}

impl LayeredTileVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // fg_color
        3 => Float32x4,  // bg_color
        4 => Float32x2,  // v_offset
        5 => Float32,    // layer_id
    ];

    pub fn new(
        position: [f32; 2],
        uv: [f32; 2],
        fg_color: [f32; 4],
        bg_color: [f32; 4],
        layer: Layer,
        v_offset: [f32; 2],
    ) -> Self {
        Self { position, uv, fg_color, bg_color, v_offset, layer_id: layer.id() }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LayeredTileVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Layered tile whose offset is looked up in the per-frame entity table.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IndexedTileVertex {
    /// x, y in pixels; z is depth in [0, 1] (smaller draws on top).
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub fg_color: [f32; 4],
    pub bg_color: [f32; 4],
    /// Index into the entity offset table, or [`NO_ENTITY`](crate::renderer::entity_offsets::NO_ENTITY).
    pub entity_id: u32,
    pub layer_id: f32,
}

impl IndexedTileVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // fg_color
        3 => Float32x4,  // bg_color
        4 => Uint32,     // entity_id
        5 => Float32,    // layer_id
    ];

    pub fn new(
        position: [f32; 3],
        uv: [f32; 2],
        fg_color: [f32; 4],
        bg_color: [f32; 4],
        layer: Layer,
        entity_id: u32,
    ) -> Self {
        Self { position, uv, fg_color, bg_color, entity_id, layer_id: layer.id() }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<IndexedTileVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// ── Bind group layouts ────────────────────────────────────────────────────────

pub(crate) fn projection_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("projection_bgl"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX, false)],
    })
}

/// Texture + filtering sampler at bindings 0 and 1, fragment-visible.
pub(crate) fn texture_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[texture_entry(0), sampler_entry(1)],
    })
}

pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: None,
        },
        count: None,
    }
}

// ── Pipeline construction ─────────────────────────────────────────────────────

/// How a scene pass interacts with the depth attachment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DepthMode {
    /// Depth-tested and written: draws order by z.
    Ordered,
    /// Always passes, never writes: draws order by submission.
    Painter,
}

impl DepthMode {
    /// Depth handling for each pass. Only the indexed-offset tiles order by
    /// z; every other scene pass keeps submission order. Post-process passes
    /// run without a depth attachment.
    pub(crate) fn for_pass(pass: PassKind) -> Option<DepthMode> {
        match pass {
            PassKind::IndexedTile => Some(DepthMode::Ordered),
            PassKind::Tile
            | PassKind::LayeredTile
            | PassKind::BitmapText
            | PassKind::SdfText
            | PassKind::Panel => Some(DepthMode::Painter),
            PassKind::Scanline
            | PassKind::Vignette
            | PassKind::ChromaticAberration
            | PassKind::Bloom => None,
        }
    }

    fn state(self) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = match self {
            DepthMode::Ordered => (true, wgpu::CompareFunction::LessEqual),
            DepthMode::Painter => (false, wgpu::CompareFunction::Always),
        };
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Everything that varies between the compositor's render pipelines.
pub(crate) struct PipelineSpec<'a> {
    pub pass: PassKind,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
}

/// Compile the pass's shader and build its pipeline, both inside validation
/// scopes.
pub(crate) fn build_pipeline(device: &wgpu::Device, spec: &PipelineSpec<'_>) -> Result<wgpu::RenderPipeline> {
    let shader = validation::shader_module(device, spec.pass)?;
    let label = spec.pass.label();

    validation::scoped(device, spec.pass, Stage::Pipeline, || {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{}_layout", label)),
            bind_group_layouts: spec.bind_group_layouts,
            ..Default::default()
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: spec.vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: spec.format,
                    blend: spec.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: DepthMode::for_pass(spec.pass).map(DepthMode::state),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    })
}

// ── Tile pipelines ────────────────────────────────────────────────────────────

/// The three tile-family pipelines and the layouts they share.
///
/// Bind groups: 0 = projection, 1 = atlas texture + sampler, 2 = entity
/// offsets (indexed variant only).
pub struct TilePipelines {
    pub simple: wgpu::RenderPipeline,
    pub layered: wgpu::RenderPipeline,
    pub indexed: wgpu::RenderPipeline,
    pub projection_bind_group_layout: wgpu::BindGroupLayout,
    pub atlas_bind_group_layout: wgpu::BindGroupLayout,
    pub entity_offsets_bind_group_layout: wgpu::BindGroupLayout,
}

pub fn create_tile_pipelines(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<TilePipelines> {
    let projection_bind_group_layout = projection_bind_group_layout(device);
    let atlas_bind_group_layout = texture_bind_group_layout(device, "atlas_bgl");

    let entity_offsets_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("entity_offsets_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let two_groups = [&projection_bind_group_layout, &atlas_bind_group_layout];

    let simple = build_pipeline(device, &PipelineSpec {
        pass: PassKind::Tile,
        bind_group_layouts: &two_groups,
        vertex_buffers: &[TileVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    let layered = build_pipeline(device, &PipelineSpec {
        pass: PassKind::LayeredTile,
        bind_group_layouts: &two_groups,
        vertex_buffers: &[LayeredTileVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    let indexed = build_pipeline(device, &PipelineSpec {
        pass: PassKind::IndexedTile,
        bind_group_layouts: &[
            &projection_bind_group_layout,
            &atlas_bind_group_layout,
            &entity_offsets_bind_group_layout,
        ],
        vertex_buffers: &[IndexedTileVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    log::debug!("tile pipelines created for {:?}", format);

    Ok(TilePipelines {
        simple,
        layered,
        indexed,
        projection_bind_group_layout,
        atlas_bind_group_layout,
        entity_offsets_bind_group_layout,
    })
}
