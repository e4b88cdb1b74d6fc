use std::num::NonZeroU64;

/// Reserved `entity_id` meaning "this vertex has no entity".
pub const NO_ENTITY: u32 = u32::MAX;

/// Ids at or above this are rejected by [`EntityOffsetTable::set`]. The table
/// is dense, so a sparse id would allocate every slot below it; 2^22 entries
/// is 64 MiB, inside wgpu's default storage binding limit.
pub const MAX_ENTITIES: u32 = 1 << 22;

/// One table slot as laid out in the storage buffer: `xy` is the offset in
/// pixels, `zw` is padding so each entry is 16-byte aligned.
pub type OffsetEntry = [f32; 4];

const ENTRY_SIZE: u64 = std::mem::size_of::<OffsetEntry>() as u64;

// ── EntityOffsetTable ─────────────────────────────────────────────────────────

/// Dense, frame-scoped array of per-entity visual offsets indexed by entity id.
///
/// The host rewrites it between frames; the indexed tile pass reads it.
/// Lookups are bounds-checked: [`NO_ENTITY`] and any id past the end resolve
/// to a zero offset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityOffsetTable {
    entries: Vec<OffsetEntry>,
}

impl EntityOffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append an offset and return the id it is stored under.
    pub fn push(&mut self, offset: [f32; 2]) -> u32 {
        let id = self.entries.len() as u32;
        self.entries.push([offset[0], offset[1], 0.0, 0.0]);
        id
    }

    /// Store `offset` at `id`, zero-filling any gap below it.
    ///
    /// Ids are expected to be dense. Writing to [`NO_ENTITY`] or to any id
    /// at or above [`MAX_ENTITIES`] is ignored and returns `false`.
    pub fn set(&mut self, id: u32, offset: [f32; 2]) -> bool {
        if id == NO_ENTITY {
            return false;
        }
        if id >= MAX_ENTITIES {
            log::warn!("entity id {} exceeds the offset table limit of {}", id, MAX_ENTITIES);
            return false;
        }
        let index = id as usize;
        if index >= self.entries.len() {
            self.entries.resize(index + 1, [0.0; 4]);
        }
        self.entries[index] = [offset[0], offset[1], 0.0, 0.0];
        true
    }

    /// Offset for `id`, or `[0.0, 0.0]` for the sentinel and any id past the end.
    pub fn resolve(&self, id: u32) -> [f32; 2] {
        if id == NO_ENTITY {
            return [0.0, 0.0];
        }
        match self.entries.get(id as usize) {
            Some(e) => [e[0], e[1]],
            None => [0.0, 0.0],
        }
    }

    pub fn as_slice(&self) -> &[OffsetEntry] {
        &self.entries
    }
}

// ── EntityOffsetBuffer ────────────────────────────────────────────────────────

/// GPU mirror of an [`EntityOffsetTable`] bound at group 2 of the indexed
/// tile pass.
///
/// The binding covers exactly the table's length (at least one entry, since
/// storage bindings cannot be empty), so `arrayLength` in the shader is the
/// logical length and the shader's bounds check rejects stale slots.
pub(crate) struct EntityOffsetBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    bound_len: u64,
    bind_group: wgpu::BindGroup,
}

impl EntityOffsetBuffer {
    pub(crate) fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let capacity = (capacity as u64).max(1);
        let buffer = create_storage(device, capacity);
        let bind_group = create_bind_group(device, layout, &buffer, 1);
        Self { buffer, capacity, bound_len: 1, bind_group }
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Upload `table`, growing the buffer and rebinding when needed.
    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        table: &EntityOffsetTable,
    ) {
        let len = (table.len() as u64).max(1);
        let mut rebind = len != self.bound_len;

        if len > self.capacity {
            let capacity = len.next_power_of_two();
            log::debug!("entity offset buffer grows {} -> {} entries", self.capacity, capacity);
            self.buffer = create_storage(device, capacity);
            self.capacity = capacity;
            rebind = true;
        }

        if table.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[[0.0f32; 4]]));
        } else {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(table.as_slice()));
        }

        if rebind {
            self.bind_group = create_bind_group(device, layout, &self.buffer, len);
            self.bound_len = len;
        }
    }
}

fn create_storage(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("entity_offsets_buffer"),
        size: capacity * ENTRY_SIZE,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    len: u64,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("entity_offsets_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(len * ENTRY_SIZE),
            }),
        }],
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
