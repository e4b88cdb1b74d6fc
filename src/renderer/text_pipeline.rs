use crate::error::Result;
use crate::renderer::pipeline::{
    build_pipeline, sampler_entry, texture_entry, uniform_entry, PipelineSpec,
};
use crate::renderer::shaders::PassKind;

// ── Vertex types ──────────────────────────────────────────────────────────────

/// Bitmap-font glyph corner. The color comes from the per-draw tint.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    /// Screen-space position in pixels.
    pub position: [f32; 2],
    /// Normalised atlas texture coordinates in `[0, 1]`.
    pub uv: [f32; 2],
}

impl TextVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Distance-field glyph corner with its own color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SdfTextVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SdfTextVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
        2 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SdfTextVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// ── Uniforms ──────────────────────────────────────────────────────────────────

/// Per-font parameters bound next to an MTSDF atlas (group 1, binding 2).
///
/// `distance_range` is the SDF range in atlas texels that the generator baked
/// in (`atlas.distanceRange` in msdf-atlas-gen output). The atlas size lets
/// the shader convert it to screen pixels at any scale.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MtsdfParams {
    pub distance_range: f32,
    pub atlas_width: f32,
    pub atlas_height: f32,
    pub _pad: f32,
}

impl MtsdfParams {
    pub fn new(distance_range: f32, atlas_width: u32, atlas_height: u32) -> Self {
        Self {
            distance_range,
            atlas_width: atlas_width as f32,
            atlas_height: atlas_height as f32,
            _pad: 0.0,
        }
    }
}

/// Bitmap text color, one 16-byte slot per draw in a dynamic-offset buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextTint {
    pub color: [f32; 4],
}

// ── TextPipelines ─────────────────────────────────────────────────────────────

pub struct TextPipelines {
    /// Alpha-mask glyphs: group 1 = atlas (tile atlas layout), group 2 = tint.
    pub bitmap: wgpu::RenderPipeline,
    /// MTSDF glyphs: group 1 = atlas + sampler + [`MtsdfParams`].
    pub sdf: wgpu::RenderPipeline,
    pub tint_bind_group_layout: wgpu::BindGroupLayout,
    pub font_bind_group_layout: wgpu::BindGroupLayout,
}

pub fn create_text_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    projection_bind_group_layout: &wgpu::BindGroupLayout,
    atlas_bind_group_layout: &wgpu::BindGroupLayout,
) -> Result<TextPipelines> {
    let tint_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("text_tint_bgl"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, true)],
    });

    let font_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("text_font_bgl"),
        entries: &[
            texture_entry(0),
            // Linear filtering is required for SDF reconstruction.
            sampler_entry(1),
            uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
        ],
    });

    let bitmap = build_pipeline(device, &PipelineSpec {
        pass: PassKind::BitmapText,
        bind_group_layouts: &[projection_bind_group_layout, atlas_bind_group_layout, &tint_bind_group_layout],
        vertex_buffers: &[TextVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    let sdf = build_pipeline(device, &PipelineSpec {
        pass: PassKind::SdfText,
        bind_group_layouts: &[projection_bind_group_layout, &font_bind_group_layout],
        vertex_buffers: &[SdfTextVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    log::debug!("text pipelines created for {:?}", format);

    Ok(TextPipelines { bitmap, sdf, tint_bind_group_layout, font_bind_group_layout })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_one_vec4() {
        assert_eq!(std::mem::size_of::<MtsdfParams>(), 16);
        assert_eq!(std::mem::size_of::<TextTint>(), 16);
    }

    #[test]
    fn params_take_atlas_size_as_floats() {
        let p = MtsdfParams::new(6.0, 512, 256);
        assert_eq!((p.distance_range, p.atlas_width, p.atlas_height), (6.0, 512.0, 256.0));
    }
}
