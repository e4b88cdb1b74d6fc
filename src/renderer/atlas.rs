use wgpu::util::DeviceExt;

use crate::error::{RenderError, Result};

/// How an atlas's texels are stored and filtered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AtlasKind {
    /// Tile sprites and bitmap glyphs: sRGB color, nearest filtering.
    Pixel,
    /// MTSDF glyphs: distances stored linearly, bilinear filtering.
    DistanceField,
}

impl AtlasKind {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            AtlasKind::Pixel => wgpu::TextureFormat::Rgba8UnormSrgb,
            AtlasKind::DistanceField => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub fn filter(self) -> wgpu::FilterMode {
        match self {
            AtlasKind::Pixel => wgpu::FilterMode::Nearest,
            AtlasKind::DistanceField => wgpu::FilterMode::Linear,
        }
    }
}

/// An uploaded atlas texture with the sampler its pass expects.
pub struct AtlasTexture {
    pub kind: AtlasKind,
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl AtlasTexture {
    pub fn from_png(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        png_bytes: &[u8],
        kind: AtlasKind,
    ) -> Result<Self> {
        let img = image::load_from_memory(png_bytes)?.to_rgba8();
        Self::from_rgba(device, queue, &img, kind)
    }

    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::RgbaImage,
        kind: AtlasKind,
    ) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidAtlas { reason: "atlas image is empty".into() });
        }

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("atlas"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: kind.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img,
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: kind.filter(),
            min_filter: kind.filter(),
            ..Default::default()
        });

        log::debug!("uploaded {:?} atlas {}x{}", kind, width, height);

        Ok(Self { kind, texture_view, sampler, width, height })
    }
}

/// Fixed-size cells laid out row-major from the atlas's top-left corner.
///
/// Texels right of the last whole column or below the last whole row are
/// never addressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasGrid {
    pub cols: u32,
    pub rows: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub atlas_w: u32,
    pub atlas_h: u32,
}

impl AtlasGrid {
    pub fn new(atlas_w: u32, atlas_h: u32, tile_w: u32, tile_h: u32) -> Result<Self> {
        if tile_w == 0 || tile_h == 0 || tile_w > atlas_w || tile_h > atlas_h {
            return Err(RenderError::InvalidAtlas {
                reason: format!("{}x{} tiles do not fit a {}x{} atlas", tile_w, tile_h, atlas_w, atlas_h),
            });
        }
        Ok(Self { cols: atlas_w / tile_w, rows: atlas_h / tile_h, tile_w, tile_h, atlas_w, atlas_h })
    }

    pub fn tile_count(&self) -> u32 {
        self.cols * self.rows
    }

    /// Returns (uv_min, uv_max) for a given tile index (row-major order),
    /// normalized by the full texture size. Indices past the last cell wrap.
    pub fn uv_for_index(&self, index: u32) -> ([f32; 2], [f32; 2]) {
        let index = index % self.tile_count();
        let col = index % self.cols;
        let row = index / self.cols;
        let w = self.atlas_w as f32;
        let h = self.atlas_h as f32;

        let u_min = (col * self.tile_w) as f32 / w;
        let v_min = (row * self.tile_h) as f32 / h;
        let u_max = ((col + 1) * self.tile_w) as f32 / w;
        let v_max = ((row + 1) * self.tile_h) as f32 / h;

        ([u_min, v_min], [u_max, v_max])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts_whole_cells_only() {
        let grid = AtlasGrid::new(100, 64, 16, 16).unwrap();
        assert_eq!((grid.cols, grid.rows), (6, 4));
        assert_eq!(grid.tile_count(), 24);
    }

    #[test]
    fn uv_for_index_is_row_major() {
        let grid = AtlasGrid::new(64, 32, 16, 16).unwrap();
        assert_eq!(grid.uv_for_index(0), ([0.0, 0.0], [0.25, 0.5]));
        assert_eq!(grid.uv_for_index(5), ([0.25, 0.5], [0.5, 1.0]));
        assert_eq!(grid.uv_for_index(8), grid.uv_for_index(0));
    }

    #[test]
    fn uvs_use_the_real_texture_size_when_tiles_do_not_divide_it() {
        let grid = AtlasGrid::new(100, 64, 16, 16).unwrap();
        let (min, max) = grid.uv_for_index(0);
        assert_eq!(min, [0.0, 0.0]);
        assert_eq!(max, [0.16, 0.25]);

        // Last cell of the first row ends at texel 96, not at the right edge.
        let (min, max) = grid.uv_for_index(5);
        assert_eq!(min[0], 80.0 / 100.0);
        assert_eq!(max[0], 96.0 / 100.0);
    }

    #[test]
    fn oversized_or_zero_tiles_are_rejected() {
        assert!(matches!(AtlasGrid::new(8, 8, 16, 8), Err(RenderError::InvalidAtlas { .. })));
        assert!(AtlasGrid::new(8, 8, 0, 8).is_err());
    }

    #[test]
    fn kinds_pick_format_and_filter() {
        assert_eq!(AtlasKind::Pixel.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(AtlasKind::DistanceField.filter(), wgpu::FilterMode::Linear);
    }
}
