use crate::error::Result;
use crate::renderer::pipeline::{build_pipeline, PipelineSpec};
use crate::renderer::shading::PanelPattern;
use crate::renderer::shaders::PassKind;

/// Clip rect that never rejects a fragment.
pub const NO_CLIP: [f32; 4] = [-1.0e6, -1.0e6, 1.0e6, 1.0e6];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PanelVertex {
    /// Screen-space position in pixels (x, y, z).
    pub position: [f32; 3],
    /// Total width and height of the panel in pixels.
    pub rect_size: [f32; 2],
    /// Local coordinate within the quad [0, 1].
    pub rect_coord: [f32; 2],
    /// Fill color.
    pub color: [f32; 4],
    pub border_color: [f32; 4],
    /// Corner radii: [top-left, top-right, bottom-right, bottom-left].
    pub radius: [f32; 4],
    /// Thickness of the border in pixels.
    pub border_thickness: f32,
    /// Forwarded to the fragment stage; not used by the current shading.
    pub shadow_blur: f32,
    /// Pattern mode: 0=solid, 1=crosshatch, 2=dotted.
    pub mode: u32,
    /// Pattern spacing in pixels.
    pub mode_param: f32,
    /// Scissor clip rect in screen pixels: [min_x, min_y, max_x, max_y].
    /// Use [`NO_CLIP`] to disable clipping.
    pub clip_rect: [f32; 4],
}

impl PanelVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 11] = wgpu::vertex_attr_array![
        0  => Float32x3, // position (x, y, z)
        1  => Float32x2, // rect_size
        2  => Float32x2, // rect_coord
        3  => Float32x4, // color
        4  => Float32x4, // border_color
        5  => Float32x4, // radius
        6  => Float32,   // border_thickness
        7  => Float32,   // shadow_blur
        8  => Uint32,    // mode
        9  => Float32,   // mode_param
        10 => Float32x4, // clip_rect
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PanelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A panel described once, expanded into six [`PanelVertex`]es.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanelQuad {
    /// Top-left corner in screen pixels.
    pub origin: [f32; 2],
    pub size: [f32; 2],
    /// Carried to clip space. Panels are not depth-tested, so submission order decides overlap.
    pub z: f32,
    pub color: [f32; 4],
    pub border_color: [f32; 4],
    pub radius: [f32; 4],
    pub border_thickness: f32,
    pub pattern: PanelPattern,
    pub pattern_spacing: f32,
    pub clip_rect: [f32; 4],
}

impl Default for PanelQuad {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            size: [0.0, 0.0],
            z: 0.0,
            color: [1.0, 1.0, 1.0, 1.0],
            border_color: [0.0, 0.0, 0.0, 0.0],
            radius: [0.0; 4],
            border_thickness: 0.0,
            pattern: PanelPattern::Solid,
            pattern_spacing: 8.0,
            clip_rect: NO_CLIP,
        }
    }
}

impl PanelQuad {
    /// Two triangles, (tl, bl, tr) and (tr, bl, br), appended to `out`.
    pub fn push_vertices(&self, out: &mut Vec<PanelVertex>) {
        let [x, y] = self.origin;
        let [w, h] = self.size;
        let corner = |px: f32, py: f32, u: f32, v: f32| PanelVertex {
            position: [px, py, self.z],
            rect_size: self.size,
            rect_coord: [u, v],
            color: self.color,
            border_color: self.border_color,
            radius: self.radius,
            border_thickness: self.border_thickness,
            shadow_blur: 0.0,
            mode: self.pattern.mode(),
            mode_param: self.pattern_spacing,
            clip_rect: self.clip_rect,
        };
        let tl = corner(x, y, 0.0, 0.0);
        let tr = corner(x + w, y, 1.0, 0.0);
        let bl = corner(x, y + h, 0.0, 1.0);
        let br = corner(x + w, y + h, 1.0, 1.0);
        out.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }
}

pub struct PanelPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
}

pub fn create_panel_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    projection_bind_group_layout: &wgpu::BindGroupLayout,
) -> Result<PanelPipeline> {
    let render_pipeline = build_pipeline(device, &PipelineSpec {
        pass: PassKind::Panel,
        bind_group_layouts: &[projection_bind_group_layout],
        vertex_buffers: &[PanelVertex::layout()],
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    })?;

    log::debug!("panel pipeline created for {:?}", format);

    Ok(PanelPipeline { render_pipeline })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_expands_to_two_triangles_with_unit_rect_coords() {
        let quad = PanelQuad { origin: [10.0, 20.0], size: [100.0, 50.0], ..Default::default() };
        let mut out = Vec::new();
        quad.push_vertices(&mut out);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].position, [10.0, 20.0, 0.0]);
        assert_eq!(out[5].position, [110.0, 70.0, 0.0]);
        assert_eq!(out[5].rect_coord, [1.0, 1.0]);
        assert!(out.iter().all(|v| v.rect_size == [100.0, 50.0] && v.clip_rect == NO_CLIP));
    }

    #[test]
    fn pattern_is_written_as_mode() {
        let quad = PanelQuad { pattern: PanelPattern::Dotted, ..Default::default() };
        let mut out = Vec::new();
        quad.push_vertices(&mut out);
        assert!(out.iter().all(|v| v.mode == 2));
    }

    #[test]
    fn stride_covers_all_eleven_attributes() {
        assert_eq!(PanelVertex::layout().array_stride, 4 * (3 + 2 + 2 + 4 + 4 + 4 + 1 + 1 + 1 + 1 + 4));
    }
}
