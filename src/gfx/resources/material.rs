//! Surface materials for PBR rendering
//!
//! A [`SurfaceMaterial`] is the instance assigned to a drawable node; it is built
//! fresh from a catalog preset every time the viewer applies one. The render
//! engine turns it into a [`MaterialUniform`] each frame.

use wgpu::Device;

use crate::viewer::catalog::{MaterialPreset, Rgb};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// GPU uniform data for materials
///
/// MUST match the `Material` struct in `pbr.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub transmission: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub ior: f32,
    pub reflectivity: f32,
    pub receive_shadow: f32,
    _padding: f32,
}

pub type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Material instance bound to a surface
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial {
    /// Name of the preset this instance was built from
    pub name: String,
    pub base_color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub transmission: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub ior: f32,
    pub reflectivity: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: Rgb::new(0.8, 0.8, 0.8),
            roughness: 0.5,
            metalness: 0.0,
            transmission: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            ior: 1.5,
            reflectivity: 0.5,
        }
    }
}

impl SurfaceMaterial {
    /// Builds a new instance carrying every parameter of `preset`
    pub fn from_preset(preset: &MaterialPreset) -> Self {
        Self {
            name: preset.name.clone(),
            base_color: preset.base_color,
            roughness: preset.roughness,
            metalness: preset.metalness,
            transmission: preset.transmission,
            clearcoat: preset.clearcoat,
            clearcoat_roughness: preset.clearcoat_roughness,
            ior: preset.ior,
            reflectivity: preset.reflectivity,
        }
    }

    /// Opaque matte material, used for the ground plane
    pub fn matte(name: &str, base_color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            roughness: 1.0,
            ..Default::default()
        }
    }

    /// Whether this material has the same visual parameters as `preset`
    pub fn matches(&self, preset: &MaterialPreset) -> bool {
        *self == Self::from_preset(preset)
    }

    pub fn to_uniform(&self, receive_shadow: bool) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color.to_linear(),
            roughness: self.roughness,
            metalness: self.metalness,
            transmission: self.transmission,
            clearcoat: self.clearcoat,
            clearcoat_roughness: self.clearcoat_roughness,
            ior: self.ior,
            reflectivity: self.reflectivity,
            receive_shadow: if receive_shadow { 1.0 } else { 0.0 },
            _padding: 0.0,
        }
    }
}

/// Material bind group management
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Material Bind Group");

        MaterialBindings { bind_group_layout }
    }

    pub fn create_bind_group(&self, device: &Device, ubo: &MaterialUBO) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Material Bind Group")
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
    }

    #[test]
    fn instance_carries_every_preset_parameter() {
        let preset = MaterialPreset::new("Ruby", Rgb::from_hex(0xe0115f), 0.1, 0.0)
            .with_transmission(0.6)
            .with_ior(1.77)
            .with_clearcoat(1.0, 0.05);

        let material = SurfaceMaterial::from_preset(&preset);
        assert_eq!(material.name, "Ruby");
        assert_eq!(material.transmission, 0.6);
        assert_eq!(material.ior, 1.77);
        assert_eq!(material.clearcoat_roughness, 0.05);
        assert!(material.matches(&preset));
        assert!(!SurfaceMaterial::default().matches(&preset));
    }

    #[test]
    fn uniform_is_linear_and_flags_shadows() {
        let material = SurfaceMaterial::matte("Ground", Rgb::from_hex(0x555555));
        let uniform = material.to_uniform(true);
        assert!(uniform.base_color[0] < 0.1);
        assert_eq!(uniform.receive_shadow, 1.0);
        assert_eq!(material.to_uniform(false).receive_shadow, 0.0);
    }
}
