use std::ops::Range;

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// FNV-1a over `bytes`. Used to skip re-uploading unchanged frame data.
pub(crate) fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET_BASIS, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

/// Capacity for `needed` elements: the next power of two, never below `min`.
pub(crate) fn grown_capacity(needed: u64, min: u64) -> u64 {
    needed.next_power_of_two().max(min)
}

// ── GrowableBuffer ────────────────────────────────────────────────────────────

/// A persistent GPU buffer that doubles when a frame outgrows it and skips
/// writes whose contents hash the same as the last upload.
pub(crate) struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    capacity: u64,
    min_capacity: u64,
    last_hash: Option<u64>,
    /// Bumped whenever `buffer` is replaced, so dependents can rebind.
    generation: u64,
}

impl GrowableBuffer {
    pub(crate) fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, min_capacity: u64) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let min_capacity = align4(min_capacity.max(4));
        let buffer = allocate(device, label, usage, min_capacity);
        Self { label, usage, buffer, capacity: min_capacity, min_capacity, last_hash: None, generation: 0 }
    }

    pub(crate) fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Upload `bytes` at offset 0. Returns whether anything was written.
    pub(crate) fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            let capacity = align4(grown_capacity(needed, self.min_capacity));
            log::debug!("{} grows {} -> {} bytes", self.label, self.capacity, capacity);
            self.buffer = allocate(device, self.label, self.usage, capacity);
            self.capacity = capacity;
            self.generation += 1;
            self.last_hash = None;
        }

        let hash = fnv1a_64(bytes);
        if self.last_hash == Some(hash) {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_hash = Some(hash);
        true
    }
}

fn allocate(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

fn align4(n: u64) -> u64 {
    n.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

// ── FrameArena ────────────────────────────────────────────────────────────────

/// CPU staging for one frame's worth of a buffer: every draw's data packed
/// back to back, each slice starting at a multiple of `align`.
pub(crate) struct FrameArena {
    bytes: Vec<u8>,
    align: usize,
}

impl FrameArena {
    pub(crate) fn new(align: usize) -> Self {
        Self { bytes: Vec::new(), align: align.max(1) }
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append `items` and return their byte range.
    pub(crate) fn push<T: bytemuck::Pod>(&mut self, items: &[T]) -> Range<u64> {
        self.pad_to(self.align);
        let start = self.bytes.len();
        self.bytes.extend_from_slice(bytemuck::cast_slice(items));
        start as u64..self.bytes.len() as u64
    }

    /// The packed bytes, padded so the length is a valid copy size.
    pub(crate) fn finish(&mut self) -> &[u8] {
        self.pad_to(wgpu::COPY_BUFFER_ALIGNMENT as usize);
        &self.bytes
    }

    fn pad_to(&mut self, align: usize) {
        let len = self.bytes.len().next_multiple_of(align);
        self.bytes.resize(len, 0);
    }
}
