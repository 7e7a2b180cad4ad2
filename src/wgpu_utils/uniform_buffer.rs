use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Typed uniform buffer holding exactly one `Content`
///
/// Remembers the bytes it last uploaded so per-frame updates with unchanged
/// content cost nothing.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    uploaded: Vec<u8>,
    _content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    fn label() -> String {
        let type_name = std::any::type_name::<Content>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        format!("UniformBuffer: {short}")
    }

    /// Zero-initialized buffer
    pub fn new(device: &wgpu::Device) -> Self {
        Self::new_with_data(device, &bytemuck::Zeroable::zeroed())
    }

    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let bytes = bytemuck::bytes_of(initial_content);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&Self::label()),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            uploaded: bytes.to_vec(),
            _content: PhantomData,
        }
    }

    /// Writes `content`, skipping the upload when nothing changed
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let bytes = bytemuck::bytes_of(&content);
        if self.uploaded != bytes {
            queue.write_buffer(&self.buffer, 0, bytes);
            self.uploaded.copy_from_slice(bytes);
        }
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
