//! GPU-side copies of drawable surfaces
//!
//! Each surface of the attached model becomes one [`DrawItem`]: uploaded
//! buffers plus its own transform and material uniforms. The geometry is
//! uploaded once; the uniforms are refreshed every frame from the node tree.

use std::ops::Range;

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::gfx::{
    resources::material::{MaterialBindings, MaterialUBO, MaterialUniform},
    scene::mesh::MeshData,
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Per-draw model and normal matrices
///
/// MUST match the `Transform` struct in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_world(world: Matrix4<f32>) -> Self {
        let normal = world
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: world.into(),
            normal: normal.into(),
        }
    }
}

pub type TransformUBO = UniformBuffer<TransformUniform>;

pub struct TransformBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl TransformBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group");
        Self { bind_group_layout }
    }

    pub fn create_bind_group(&self, device: &wgpu::Device, ubo: &TransformUBO) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Transform Bind Group")
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

pub struct DrawItem {
    pub label: String,
    mesh: GpuMesh,
    transform_ubo: TransformUBO,
    transform_bind_group: wgpu::BindGroup,
    material_ubo: MaterialUBO,
    material_bind_group: wgpu::BindGroup,
    pub cast_shadow: bool,
    pub translucent: bool,
}

impl DrawItem {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        mesh: &MeshData,
        transforms: &TransformBindings,
        materials: &MaterialBindings,
    ) -> Self {
        let transform_ubo = TransformUBO::new_with_data(
            device,
            &TransformUniform::from_world(Matrix4::identity()),
        );
        let transform_bind_group = transforms.create_bind_group(device, &transform_ubo);

        let material_ubo = MaterialUBO::new(device);
        let material_bind_group = materials.create_bind_group(device, &material_ubo);

        Self {
            label: label.to_string(),
            mesh: GpuMesh::upload(device, mesh, label),
            transform_ubo,
            transform_bind_group,
            material_ubo,
            material_bind_group,
            cast_shadow: false,
            translucent: false,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, world: Matrix4<f32>, material: MaterialUniform) {
        self.translucent = material.transmission > 0.0;
        self.transform_ubo
            .update_content(queue, TransformUniform::from_world(world));
        self.material_ubo.update_content(queue, material);
    }
}

pub trait DrawItems<'a> {
    /// Draws with transform in group 1 and material in group 2
    fn draw_item(&mut self, item: &'a DrawItem);
    /// Depth-only draw; only the transform is bound
    fn draw_item_shadow(&mut self, item: &'a DrawItem);
    fn draw_gpu_mesh(&mut self, mesh: &'a GpuMesh, instances: Range<u32>);
}

impl<'a, 'b> DrawItems<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_item(&mut self, item: &'b DrawItem) {
        self.set_bind_group(1, &item.transform_bind_group, &[]);
        self.set_bind_group(2, &item.material_bind_group, &[]);
        self.draw_gpu_mesh(&item.mesh, 0..1);
    }

    fn draw_item_shadow(&mut self, item: &'b DrawItem) {
        self.set_bind_group(1, &item.transform_bind_group, &[]);
        self.draw_gpu_mesh(&item.mesh, 0..1);
    }

    fn draw_gpu_mesh(&mut self, mesh: &'b GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    #[test]
    fn uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = TransformUniform::from_world(world);
        let normal = Matrix4::from(uniform.normal);

        // A slanted normal stays perpendicular to the scaled surface
        let n = normal * Vector4::new(1.0, 1.0, 0.0, 0.0);
        let tangent = world * Vector4::new(1.0, -1.0, 0.0, 0.0);
        assert!(n.truncate().dot(tangent.truncate()).abs() < 1e-6);
    }

    #[test]
    fn singular_world_falls_back_to_identity_normals() {
        let uniform = TransformUniform::from_world(Matrix4::from_scale(0.0));
        assert_eq!(Matrix4::from(uniform.normal), Matrix4::identity());
    }
}
