pub mod atlas;
mod buffers;
pub mod entity_offsets;
pub mod layer;
pub mod panel_pipeline;
pub mod pipeline;
pub mod post_process;
pub mod shaders;
pub mod shading;
pub mod text_pipeline;
mod validation;

use std::num::NonZeroU64;
use std::ops::Range;

use wgpu::util::DeviceExt;

use atlas::AtlasTexture;
use buffers::{FrameArena, GrowableBuffer};
use entity_offsets::{EntityOffsetBuffer, EntityOffsetTable};
use panel_pipeline::{PanelPipeline, PanelVertex, create_panel_pipeline};
use pipeline::{
    DEPTH_FORMAT, IndexedTileVertex, LayeredTileVertex, TilePipelines, TileVertex, create_tile_pipelines,
};
use post_process::{
    BloomEffect, ChromaticAberrationEffect, PostProcessStack, ScanlineEffect, VignetteEffect, create_effect,
};
use text_pipeline::{MtsdfParams, SdfTextVertex, TextPipelines, TextTint, TextVertex, create_text_pipelines};

use crate::camera::{Camera, CameraUniform};
use crate::config::CompositorConfig;
use crate::error::Result;

// ── Handles and frame description ─────────────────────────────────────────────

/// A registered tile or bitmap-font atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtlasId(u32);

/// A registered MTSDF font atlas together with its [`MtsdfParams`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontId(u32);

/// One batch of geometry for a single pipeline.
///
/// Simple tiles, text and panels are positioned in screen pixels; layered
/// and indexed tiles go through the camera.
#[derive(Clone, Debug)]
pub enum DrawCall<'a> {
    Tiles { atlas: AtlasId, vertices: &'a [TileVertex] },
    LayeredTiles { atlas: AtlasId, vertices: &'a [LayeredTileVertex] },
    /// Offsets come from the frame's [`EntityOffsetTable`].
    IndexedTiles { atlas: AtlasId, vertices: &'a [IndexedTileVertex] },
    BitmapText { font: AtlasId, tint: [f32; 4], vertices: &'a [TextVertex], indices: &'a [u16] },
    SdfText { font: FontId, vertices: &'a [SdfTextVertex], indices: &'a [u16] },
    Panels { vertices: &'a [PanelVertex] },
}

/// Everything drawn in one call to [`Compositor::render`], in painter's order.
#[derive(Clone, Debug, Default)]
pub struct Frame<'a> {
    pub draws: Vec<DrawCall<'a>>,
    /// Uploaded before any draw. When `None` the previous frame's table stays bound.
    pub entity_offsets: Option<&'a EntityOffsetTable>,
}

impl<'a> Frame<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity_offsets(mut self, table: &'a EntityOffsetTable) -> Self {
        self.entity_offsets = Some(table);
        self
    }

    pub fn push(&mut self, draw: DrawCall<'a>) -> &mut Self {
        self.draws.push(draw);
        self
    }
}

/// The color target the compositor renders into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TargetDesc {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

// ── Compositor ────────────────────────────────────────────────────────────────

struct SdfFont {
    params: MtsdfParams,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TileVariant {
    Simple,
    Layered,
    Indexed,
}

/// A [`DrawCall`] resolved against registered resources and packed arenas.
enum PreparedDraw {
    Tiles { variant: TileVariant, atlas: usize, vertices: Range<u64>, count: u32 },
    BitmapText { atlas: usize, tint_offset: u32, vertices: Range<u64>, indices: Range<u64>, count: u32 },
    SdfText { font: usize, vertices: Range<u64>, indices: Range<u64>, count: u32 },
    Panels { vertices: Range<u64>, count: u32 },
}

/// Layered 2D compositor: tiles, text and panels in one depth-backed scene
/// pass, followed by the post-process stack.
///
/// The compositor does not own a surface; the host acquires a view each frame
/// and passes it to [`render`](Self::render).
pub struct Compositor {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: CompositorConfig,
    target: TargetDesc,
    tile: TilePipelines,
    text: TextPipelines,
    panel: PanelPipeline,
    /// Static orthographic projection: simple tiles, text and panels.
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    /// Camera view-projection: layered and indexed tiles.
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    entity_offsets: EntityOffsetBuffer,
    atlases: Vec<wgpu::BindGroup>,
    fonts: Vec<SdfFont>,
    vertex_buffer: GrowableBuffer,
    index_buffer: GrowableBuffer,
    tint_buffer: GrowableBuffer,
    /// Generation of `tint_buffer` the bind group was built against.
    tint_bind_group: (u64, wgpu::BindGroup),
    vertex_arena: FrameArena,
    index_arena: FrameArena,
    tint_arena: FrameArena,
    prepared: Vec<PreparedDraw>,
    depth: DepthTarget,
    post_process: PostProcessStack,
}

impl Compositor {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: TargetDesc,
        config: CompositorConfig,
    ) -> Result<Self> {
        let tile = create_tile_pipelines(device, target.format)?;
        let text = create_text_pipelines(
            device,
            target.format,
            &tile.projection_bind_group_layout,
            &tile.atlas_bind_group_layout,
        )?;
        let panel = create_panel_pipeline(device, target.format, &tile.projection_bind_group_layout)?;

        let ortho = CameraUniform::identity_ortho(target.width as f32, target.height as f32);
        let (projection_buffer, projection_bind_group) =
            uniform_with_bind_group(device, &tile.projection_bind_group_layout, "projection", &ortho);
        let (camera_buffer, camera_bind_group) =
            uniform_with_bind_group(device, &tile.projection_bind_group_layout, "camera", &ortho);

        let entity_offsets = EntityOffsetBuffer::new(
            device,
            &tile.entity_offsets_bind_group_layout,
            config.initial_entity_capacity,
        );

        let min_elements = config.min_buffer_capacity as u64;
        let vertex_buffer = GrowableBuffer::new(
            device,
            "vertex_buffer",
            wgpu::BufferUsages::VERTEX,
            min_elements * std::mem::size_of::<PanelVertex>() as u64,
        );
        let index_buffer =
            GrowableBuffer::new(device, "index_buffer", wgpu::BufferUsages::INDEX, min_elements * 2);

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let tint_stride = alignment.max(std::mem::size_of::<TextTint>() as u64);
        let tint_buffer = GrowableBuffer::new(device, "text_tint_buffer", wgpu::BufferUsages::UNIFORM, tint_stride * 16);
        let tint_bind_group = (
            tint_buffer.generation(),
            tint_bind_group(device, &text.tint_bind_group_layout, tint_buffer.buffer()),
        );

        let depth = create_depth_target(device, target.width, target.height);

        let mut post_process = PostProcessStack::new(device, target.format, target.width, target.height);
        for name in config.enabled_effects() {
            if let Some(effect) = create_effect(device, target.format, target.scale_factor, name)? {
                post_process.add_effect(effect);
            }
        }

        log::info!(
            "compositor ready: {}x{} {:?}, effects {:?}",
            target.width,
            target.height,
            target.format,
            post_process.effect_names()
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            config,
            target,
            tile,
            text,
            panel,
            projection_buffer,
            projection_bind_group,
            camera_buffer,
            camera_bind_group,
            entity_offsets,
            atlases: Vec::new(),
            fonts: Vec::new(),
            vertex_buffer,
            index_buffer,
            tint_buffer,
            tint_bind_group,
            vertex_arena: FrameArena::new(wgpu::COPY_BUFFER_ALIGNMENT as usize),
            index_arena: FrameArena::new(wgpu::COPY_BUFFER_ALIGNMENT as usize),
            tint_arena: FrameArena::new(tint_stride as usize),
            prepared: Vec::new(),
            depth,
            post_process,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn target(&self) -> TargetDesc {
        self.target
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    // ── Resources ─────────────────────────────────────────────────────────────

    /// Register a tile or bitmap-font atlas.
    pub fn register_atlas(&mut self, atlas: &AtlasTexture) -> AtlasId {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas_bg"),
            layout: &self.tile.atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&atlas.texture_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&atlas.sampler) },
            ],
        });
        self.atlases.push(bind_group);
        AtlasId(self.atlases.len() as u32 - 1)
    }

    /// Register an MTSDF atlas with the parameters it was generated with.
    pub fn register_sdf_font(&mut self, atlas: &AtlasTexture, params: MtsdfParams) -> FontId {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mtsdf_params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("text_font_bg"),
            layout: &self.text.font_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&atlas.texture_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&atlas.sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: buffer.as_entire_binding() },
            ],
        });
        self.fonts.push(SdfFont { params, buffer, bind_group });
        FontId(self.fonts.len() as u32 - 1)
    }

    /// Register an MTSDF atlas using the configured default distance range.
    pub fn register_sdf_font_default(&mut self, atlas: &AtlasTexture) -> FontId {
        let params = MtsdfParams::new(self.config.default_distance_range, atlas.width, atlas.height);
        self.register_sdf_font(atlas, params)
    }

    /// Patch a font's distance range without touching its atlas.
    /// Returns `false` for an unknown font.
    pub fn set_mtsdf_distance_range(&mut self, font: FontId, distance_range: f32) -> bool {
        let Some(entry) = self.fonts.get_mut(font.0 as usize) else {
            log::warn!("set_mtsdf_distance_range: unknown font {:?}", font);
            return false;
        };
        entry.params.distance_range = distance_range;
        self.queue.write_buffer(&entry.buffer, 0, bytemuck::bytes_of(&entry.params));
        true
    }

    pub fn mtsdf_params(&self, font: FontId) -> Option<MtsdfParams> {
        self.fonts.get(font.0 as usize).map(|f| f.params)
    }

    // ── Target state ──────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {}x{}", width, height);
            return;
        }
        self.target.width = width;
        self.target.height = height;
        self.depth = create_depth_target(&self.device, width, height);

        let ortho = CameraUniform::identity_ortho(width as f32, height as f32);
        self.queue.write_buffer(&self.projection_buffer, 0, bytemuck::bytes_of(&ortho));
        self.post_process.resize(&self.device, &self.queue, width, height, self.target.scale_factor);

        log::info!("compositor resized to {}x{}", width, height);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.target.scale_factor = scale_factor;
        let TargetDesc { width, height, .. } = self.target;
        self.post_process.resize(&self.device, &self.queue, width, height, scale_factor);
        log::info!("scale factor set to {}", scale_factor);
    }

    /// Upload the camera's view-projection for the current target size.
    pub fn update_camera(&mut self, camera: &Camera) {
        let uniform = camera.build_view_proj(self.target.width as f32, self.target.height as f32);
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn post_process(&self) -> &PostProcessStack {
        &self.post_process
    }

    pub fn post_process_mut(&mut self) -> &mut PostProcessStack {
        &mut self.post_process
    }

    /// Switch the named effect on (appended, or replacing one of the same
    /// name) or off. Returns `false` for a name no effect answers to.
    pub fn set_effect(&mut self, name: &str, enabled: bool) -> Result<bool> {
        if !enabled {
            self.post_process.remove_effect(name);
            return Ok(true);
        }
        match create_effect(&self.device, self.target.format, self.target.scale_factor, name)? {
            Some(effect) => {
                self.post_process.add_effect(effect);
                Ok(true)
            }
            None => {
                log::warn!("set_effect: unknown effect {:?}", name);
                Ok(false)
            }
        }
    }

    pub fn set_scanlines(&mut self, enabled: bool) -> Result<()> {
        self.set_effect(ScanlineEffect::NAME, enabled).map(drop)
    }

    pub fn set_vignette(&mut self, enabled: bool) -> Result<()> {
        self.set_effect(VignetteEffect::NAME, enabled).map(drop)
    }

    pub fn set_chromatic_aberration(&mut self, enabled: bool) -> Result<()> {
        self.set_effect(ChromaticAberrationEffect::NAME, enabled).map(drop)
    }

    pub fn set_bloom(&mut self, enabled: bool) -> Result<()> {
        self.set_effect(BloomEffect::NAME, enabled).map(drop)
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Encode and submit one frame into `output`, which must match the
    /// target format and size.
    pub fn render(&mut self, frame: &Frame<'_>, output: &wgpu::TextureView) -> wgpu::SubmissionIndex {
        if let Some(table) = frame.entity_offsets {
            self.entity_offsets.upload(
                &self.device,
                &self.queue,
                &self.tile.entity_offsets_bind_group_layout,
                table,
            );
        }

        self.prepare(frame);
        self.upload_arenas();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("compositor_frame") });

        {
            let scene_target = if self.post_process.is_empty() {
                output
            } else {
                self.post_process.main_render_target()
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: scene_target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.encode_draws(&mut pass);
        }

        if !self.post_process.is_empty() {
            self.post_process.run(&self.device, &self.queue, &mut encoder, output);
        }

        self.queue.submit(std::iter::once(encoder.finish()))
    }

    /// Resolve handles and pack every draw's data into the frame arenas.
    fn prepare(&mut self, frame: &Frame<'_>) {
        self.prepared.clear();
        self.vertex_arena.clear();
        self.index_arena.clear();
        self.tint_arena.clear();

        let mut skipped = 0usize;
        for draw in &frame.draws {
            let prepared = match *draw {
                DrawCall::Tiles { atlas, vertices } => {
                    self.prepare_tiles(TileVariant::Simple, atlas, vertices)
                }
                DrawCall::LayeredTiles { atlas, vertices } => {
                    self.prepare_tiles(TileVariant::Layered, atlas, vertices)
                }
                DrawCall::IndexedTiles { atlas, vertices } => {
                    self.prepare_tiles(TileVariant::Indexed, atlas, vertices)
                }
                DrawCall::BitmapText { font, tint, vertices, indices } => {
                    match self.atlas_index(font) {
                        Some(atlas) if !vertices.is_empty() && !indices.is_empty() => {
                            let tint_offset = self.tint_arena.push(&[TextTint { color: tint }]).start as u32;
                            Some(PreparedDraw::BitmapText {
                                atlas,
                                tint_offset,
                                vertices: self.vertex_arena.push(vertices),
                                indices: self.index_arena.push(indices),
                                count: indices.len() as u32,
                            })
                        }
                        _ => None,
                    }
                }
                DrawCall::SdfText { font, vertices, indices } => {
                    let index = font.0 as usize;
                    if index >= self.fonts.len() {
                        log::warn!("skipping sdf text draw: unknown font {:?}", font);
                        None
                    } else if vertices.is_empty() || indices.is_empty() {
                        None
                    } else {
                        Some(PreparedDraw::SdfText {
                            font: index,
                            vertices: self.vertex_arena.push(vertices),
                            indices: self.index_arena.push(indices),
                            count: indices.len() as u32,
                        })
                    }
                }
                DrawCall::Panels { vertices } => (!vertices.is_empty()).then(|| PreparedDraw::Panels {
                    vertices: self.vertex_arena.push(vertices),
                    count: vertices.len() as u32,
                }),
            };

            match prepared {
                Some(p) => self.prepared.push(p),
                None => skipped += 1,
            }
        }

        log::trace!("frame: {} draws prepared, {} skipped", self.prepared.len(), skipped);
    }

    fn prepare_tiles<V: bytemuck::Pod>(
        &mut self,
        variant: TileVariant,
        atlas: AtlasId,
        vertices: &[V],
    ) -> Option<PreparedDraw> {
        let atlas = self.atlas_index(atlas)?;
        if vertices.is_empty() {
            return None;
        }
        Some(PreparedDraw::Tiles {
            variant,
            atlas,
            vertices: self.vertex_arena.push(vertices),
            count: vertices.len() as u32,
        })
    }

    fn atlas_index(&self, atlas: AtlasId) -> Option<usize> {
        let index = atlas.0 as usize;
        if index < self.atlases.len() {
            Some(index)
        } else {
            log::warn!("skipping draw: unknown atlas {:?}", atlas);
            None
        }
    }

    fn upload_arenas(&mut self) {
        self.vertex_buffer.write(&self.device, &self.queue, self.vertex_arena.finish());
        self.index_buffer.write(&self.device, &self.queue, self.index_arena.finish());
        self.tint_buffer.write(&self.device, &self.queue, self.tint_arena.finish());

        if self.tint_bind_group.0 != self.tint_buffer.generation() {
            self.tint_bind_group = (
                self.tint_buffer.generation(),
                tint_bind_group(&self.device, &self.text.tint_bind_group_layout, self.tint_buffer.buffer()),
            );
        }
    }

    fn encode_draws(&self, pass: &mut wgpu::RenderPass<'_>) {
        let vertex_buffer = self.vertex_buffer.buffer();
        let index_buffer = self.index_buffer.buffer();

        for draw in &self.prepared {
            match draw {
                PreparedDraw::Tiles { variant, atlas, vertices, count } => {
                    let (pipeline, projection) = match variant {
                        TileVariant::Simple => (&self.tile.simple, &self.projection_bind_group),
                        TileVariant::Layered => (&self.tile.layered, &self.camera_bind_group),
                        TileVariant::Indexed => (&self.tile.indexed, &self.camera_bind_group),
                    };
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, projection, &[]);
                    pass.set_bind_group(1, &self.atlases[*atlas], &[]);
                    if *variant == TileVariant::Indexed {
                        pass.set_bind_group(2, self.entity_offsets.bind_group(), &[]);
                    }
                    pass.set_vertex_buffer(0, vertex_buffer.slice(vertices.clone()));
                    pass.draw(0..*count, 0..1);
                }
                PreparedDraw::BitmapText { atlas, tint_offset, vertices, indices, count } => {
                    pass.set_pipeline(&self.text.bitmap);
                    pass.set_bind_group(0, &self.projection_bind_group, &[]);
                    pass.set_bind_group(1, &self.atlases[*atlas], &[]);
                    pass.set_bind_group(2, &self.tint_bind_group.1, &[*tint_offset]);
                    pass.set_vertex_buffer(0, vertex_buffer.slice(vertices.clone()));
                    pass.set_index_buffer(index_buffer.slice(indices.clone()), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..*count, 0, 0..1);
                }
                PreparedDraw::SdfText { font, vertices, indices, count } => {
                    pass.set_pipeline(&self.text.sdf);
                    pass.set_bind_group(0, &self.projection_bind_group, &[]);
                    pass.set_bind_group(1, &self.fonts[*font].bind_group, &[]);
                    pass.set_vertex_buffer(0, vertex_buffer.slice(vertices.clone()));
                    pass.set_index_buffer(index_buffer.slice(indices.clone()), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..*count, 0, 0..1);
                }
                PreparedDraw::Panels { vertices, count } => {
                    pass.set_pipeline(&self.panel.render_pipeline);
                    pass.set_bind_group(0, &self.projection_bind_group, &[]);
                    pass.set_vertex_buffer(0, vertex_buffer.slice(vertices.clone()));
                    pass.draw(0..*count, 0..1);
                }
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn uniform_with_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    uniform: &CameraUniform,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{}_buffer", label)),
        contents: bytemuck::bytes_of(uniform),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{}_bg", label)),
        layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });
    (buffer, bind_group)
}

/// Binds one [`TextTint`] slot; the draw's dynamic offset selects which.
fn tint_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, buffer: &wgpu::Buffer) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("text_tint_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<TextTint>() as u64),
            }),
        }],
    })
}

fn create_depth_target(device: &wgpu::Device, width: u32, height: u32) -> DepthTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene_depth"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTarget { _texture: texture, view }
}
