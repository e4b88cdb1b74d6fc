use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::renderer::pipeline::{build_pipeline, texture_bind_group_layout, uniform_entry, PipelineSpec};
use crate::renderer::shaders::PassKind;

// ── PostProcessEffect ─────────────────────────────────────────────────────────

/// The texture an effect reads from, tagged with an id that changes whenever
/// the underlying view is recreated.
#[derive(Copy, Clone)]
pub struct SourceView<'a> {
    pub view: &'a wgpu::TextureView,
    pub id: u64,
}

pub trait PostProcessEffect {
    /// Unique name used to identify the effect type for toggling (e.g. "scanline").
    fn effect_name(&self) -> &'static str;

    fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source: SourceView<'_>,
        target_view: &wgpu::TextureView,
    );

    fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, scale_factor: f32);
}

// ── PostProcessStack ──────────────────────────────────────────────────────────

/// Ordered chain of full-screen effects between the scene and the output.
///
/// The scene renders into intermediate A; effects ping-pong between A and B
/// and the last one writes to the host's output view.
pub struct PostProcessStack {
    effects: Vec<Box<dyn PostProcessEffect>>,
    targets: [IntermediateTarget; 2],
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    next_id: u64,
}

impl PostProcessStack {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let targets = [
            IntermediateTarget::new(device, format, width, height, "post_process_a", 0),
            IntermediateTarget::new(device, format, width, height, "post_process_b", 1),
        ];
        Self { effects: Vec::new(), targets, format, width, height, next_id: 2 }
    }

    /// Add an effect, replacing any existing effect with the same name.
    pub fn add_effect(&mut self, effect: Box<dyn PostProcessEffect>) {
        let name = effect.effect_name();
        self.effects.retain(|e| e.effect_name() != name);
        self.effects.push(effect);
    }

    /// Remove the effect with the given name, if present.
    pub fn remove_effect(&mut self, name: &str) {
        self.effects.retain(|e| e.effect_name() != name);
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.effect_name() == name)
    }

    pub fn effect_names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.effect_name()).collect()
    }

    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, scale_factor: f32) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            for (slot, label) in ["post_process_a", "post_process_b"].into_iter().enumerate() {
                self.targets[slot] = IntermediateTarget::new(device, self.format, width, height, label, self.next_id);
                self.next_id += 1;
            }
        }
        for effect in &mut self.effects {
            effect.resize(device, queue, width, height, scale_factor);
        }
    }

    /// The view the scene pass should render into.
    pub fn main_render_target(&self) -> &wgpu::TextureView {
        &self.targets[0].render_view
    }

    pub fn run(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        final_target_view: &wgpu::TextureView,
    ) {
        let last = self.effects.len().saturating_sub(1);
        let mut source = 0;

        for (i, effect) in self.effects.iter_mut().enumerate() {
            let target = if i == last { final_target_view } else { &self.targets[1 - source].render_view };
            effect.render(device, queue, encoder, self.targets[source].source_view(), target);
            source = 1 - source;
        }
    }
}

/// An intermediate color target. Written through a view in the target format
/// and sampled through its non-sRGB view, so effects see the stored values.
struct IntermediateTarget {
    _texture: wgpu::Texture,
    render_view: wgpu::TextureView,
    sample_view: wgpu::TextureView,
    id: u64,
}

impl IntermediateTarget {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32, label: &str, id: u64) -> Self {
        let linear = format.remove_srgb_suffix();
        let view_formats: &[wgpu::TextureFormat] = if linear == format { &[] } else { &[linear] };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats,
        });
        let render_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(linear),
            ..Default::default()
        });
        Self { _texture: texture, render_view, sample_view, id }
    }

    fn source_view(&self) -> SourceView<'_> {
        SourceView { view: &self.sample_view, id: self.id }
    }
}

// ── Shared effect plumbing ────────────────────────────────────────────────────

/// Source-texture bind groups keyed by [`SourceView::id`]. The stack only
/// ever alternates between two sources, so this stays tiny.
#[derive(Default)]
struct SourceBindGroups {
    entries: Vec<(u64, wgpu::BindGroup)>,
}

impl SourceBindGroups {
    fn get(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        source: SourceView<'_>,
    ) -> &wgpu::BindGroup {
        let index = match self.entries.iter().position(|(id, _)| *id == source.id) {
            Some(index) => index,
            None => {
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("post_process_source_bg"),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(source.view) },
                        wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
                    ],
                });
                self.entries.push((source.id, bind_group));
                self.entries.len() - 1
            }
        };
        &self.entries[index].1
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn linear_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("post_process_sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn fullscreen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target_view: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target_view,
            resolve_target: None,
            ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::BLACK), store: wgpu::StoreOp::Store },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

// ── ScanlineEffect ────────────────────────────────────────────────────────────

/// Color grade plus darkening of every other logical row. Output is opaque.
pub struct ScanlineEffect {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sources: SourceBindGroups,
}

impl ScanlineEffect {
    pub const NAME: &'static str = PassKind::Scanline.label();

    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, scale_factor: f32) -> Result<Self> {
        let bgl = texture_bind_group_layout(device, "scanline_bgl");
        let u_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scanline_uniform_bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT, false)],
        });

        let pipeline = build_pipeline(device, &PipelineSpec {
            pass: PassKind::Scanline,
            bind_group_layouts: &[&bgl, &u_bgl],
            vertex_buffers: &[],
            format,
            blend: None,
        })?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scanline_uniform"),
            contents: bytemuck::cast_slice(&scanline_params(scale_factor)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scanline_uniform_bg"),
            layout: &u_bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
        });

        Ok(Self {
            pipeline,
            bind_group_layout: bgl,
            sampler: linear_sampler(device),
            uniform_buffer,
            uniform_bind_group,
            sources: SourceBindGroups::default(),
        })
    }
}

/// `x` is the scale factor; the shader treats non-positive values as 1.
fn scanline_params(scale_factor: f32) -> [f32; 4] {
    [scale_factor, 0.0, 0.0, 0.0]
}

impl PostProcessEffect for ScanlineEffect {
    fn effect_name(&self) -> &'static str {
        Self::NAME
    }

    fn render(
        &mut self,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source: SourceView<'_>,
        target_view: &wgpu::TextureView,
    ) {
        let bind_group = self.sources.get(device, &self.bind_group_layout, &self.sampler, source);
        let mut pass = fullscreen_pass(encoder, "scanline_pass", target_view);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        pass.draw(0..6, 0..1);
    }

    fn resize(&mut self, _device: &wgpu::Device, queue: &wgpu::Queue, _width: u32, _height: u32, scale_factor: f32) {
        self.sources.clear();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&scanline_params(scale_factor)));
    }
}

// ── Single-texture effects ────────────────────────────────────────────────────

/// Pipeline and source cache for an effect whose shader reads only the scene
/// texture at group 0.
struct SingleTextureEffect {
    pass: PassKind,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    sources: SourceBindGroups,
}

impl SingleTextureEffect {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, pass: PassKind) -> Result<Self> {
        let bgl = texture_bind_group_layout(device, &format!("{}_bgl", pass.label()));
        let pipeline = build_pipeline(device, &PipelineSpec {
            pass,
            bind_group_layouts: &[&bgl],
            vertex_buffers: &[],
            format,
            blend: None,
        })?;

        Ok(Self {
            pass,
            pipeline,
            bind_group_layout: bgl,
            sampler: linear_sampler(device),
            sources: SourceBindGroups::default(),
        })
    }

    fn render(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: SourceView<'_>,
        target_view: &wgpu::TextureView,
    ) {
        let bind_group = self.sources.get(device, &self.bind_group_layout, &self.sampler, source);
        let mut pass = fullscreen_pass(encoder, &format!("{}_pass", self.pass.label()), target_view);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}

macro_rules! single_texture_effect {
    ($(#[$meta:meta])* $name:ident, $pass:expr) => {
        $(#[$meta])*
        pub struct $name(SingleTextureEffect);

        impl $name {
            pub const NAME: &'static str = $pass.label();

            pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self> {
                SingleTextureEffect::new(device, format, $pass).map(Self)
            }
        }

        impl PostProcessEffect for $name {
            fn effect_name(&self) -> &'static str {
                Self::NAME
            }

            fn render(
                &mut self,
                device: &wgpu::Device,
                _queue: &wgpu::Queue,
                encoder: &mut wgpu::CommandEncoder,
                source: SourceView<'_>,
                target_view: &wgpu::TextureView,
            ) {
                self.0.render(device, encoder, source, target_view);
            }

            fn resize(&mut self, _device: &wgpu::Device, _queue: &wgpu::Queue, _width: u32, _height: u32, _scale_factor: f32) {
                self.0.sources.clear();
            }
        }
    };
}

single_texture_effect!(
    /// Darkens toward the corners; alpha passes through.
    VignetteEffect,
    PassKind::Vignette
);

single_texture_effect!(
    /// Splits red and blue horizontally around the unshifted green channel.
    ChromaticAberrationEffect,
    PassKind::ChromaticAberration
);

single_texture_effect!(
    /// Bright-pass plus 3x3 blur glow added over the scene.
    BloomEffect,
    PassKind::Bloom
);

// ── Effect registry ───────────────────────────────────────────────────────────

/// Names of every effect [`create_effect`] can build, in the order the
/// compositor stacks them from its config.
pub const EFFECT_NAMES: [&str; 4] = [
    ScanlineEffect::NAME,
    VignetteEffect::NAME,
    ChromaticAberrationEffect::NAME,
    BloomEffect::NAME,
];

/// Build the effect registered under `name`, or `None` for an unknown name.
pub fn create_effect(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    scale_factor: f32,
    name: &str,
) -> Result<Option<Box<dyn PostProcessEffect>>> {
    let effect: Box<dyn PostProcessEffect> = match name {
        ScanlineEffect::NAME => Box::new(ScanlineEffect::new(device, format, scale_factor)?),
        VignetteEffect::NAME => Box::new(VignetteEffect::new(device, format)?),
        ChromaticAberrationEffect::NAME => Box::new(ChromaticAberrationEffect::new(device, format)?),
        BloomEffect::NAME => Box::new(BloomEffect::new(device, format)?),
        _ => return Ok(None),
    };
    Ok(Some(effect))
}
