//! Global uniform bindings for camera and scene data
//!
//! Everything shared by all draws in a frame: the camera and the single
//! shadow-casting spotlight. Bound to slot 0 in every pipeline.

use cgmath::{perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::{
    config::SpotLightConfig,
    gfx::camera::{camera_utils::CameraUniform, orbit_camera::OPENGL_TO_WGPU_MATRIX},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],

    light_position: [f32; 3],
    light_range: f32,
    light_color: [f32; 3],
    light_intensity: f32,
    light_direction: [f32; 3],
    light_cos_outer: f32,
    light_cos_inner: f32,
    shadow_bias: f32,
    light_decay: f32,
    ambient: f32,
    light_view_proj: [[f32; 4]; 4],
}
// Total: 16 + 64 + 16 * 4 + 64 = 208 bytes

impl GlobalUBOContent {
    pub fn new(camera: CameraUniform, light: &SpotLightConfig) -> Self {
        let position = Vector3::from(light.position);
        let direction = (Vector3::from(light.target) - position).normalize();
        let (cos_outer, cos_inner) = cone_cosines(light);

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_position: light.position,
            light_range: light.distance,
            light_color: light.color.to_linear(),
            light_intensity: light.intensity,
            light_direction: direction.into(),
            light_cos_outer: cos_outer,
            light_cos_inner: cos_inner,
            shadow_bias: light.shadow_bias,
            light_decay: light.decay,
            ambient: light.ambient,
            light_view_proj: light_view_proj(light).into(),
        }
    }
}

/// Cosines of the outer cone edge and of the start of the penumbra
pub fn cone_cosines(light: &SpotLightConfig) -> (f32, f32) {
    let penumbra = light.penumbra.clamp(0.0, 1.0);
    (light.angle.cos(), (light.angle * (1.0 - penumbra)).cos())
}

/// Perspective shadow camera covering the spotlight cone
pub fn light_view_proj(light: &SpotLightConfig) -> Matrix4<f32> {
    let eye = Point3::from(light.position);
    let target = Point3::from(light.target);
    let direction = (target - eye).normalize();

    // Any up vector not parallel to the light direction works
    let up = if direction.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };

    let far = if light.distance > 0.0 {
        light.distance
    } else {
        (target.to_vec() - eye.to_vec()).magnitude() * 2.0
    };

    let view = Matrix4::look_at_rh(eye, target, up);
    let proj = perspective(Rad(light.angle * 2.0), 1.0, 0.5, far);
    OPENGL_TO_WGPU_MATRIX * proj * view
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: &SpotLightConfig,
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, light));
}

/// Bind group layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn layout_matches_shader() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 208);
    }

    #[test]
    fn penumbra_of_one_fades_across_the_whole_cone() {
        let light = SpotLightConfig::default();
        let (outer, inner) = cone_cosines(&light);
        assert!((outer - 0.22f32.cos()).abs() < 1e-6);
        assert_eq!(inner, 1.0);

        let hard = SpotLightConfig {
            penumbra: 0.0,
            ..SpotLightConfig::default()
        };
        let (outer, inner) = cone_cosines(&hard);
        assert_eq!(outer, inner);
    }

    #[test]
    fn light_matrix_sees_the_floor_under_the_light() {
        let m = light_view_proj(&SpotLightConfig::default());
        let clip = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);

        // Outside the cone
        let clip = m * Vector4::new(15.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() > 1.0 || (clip.y / clip.w).abs() > 1.0);
    }

    #[test]
    fn content_points_the_light_at_its_target() {
        let content = GlobalUBOContent::new(CameraUniform::default(), &SpotLightConfig::default());
        assert_eq!(content.light_direction, [0.0, -1.0, 0.0]);
        assert_eq!(content.light_color, [1.0, 1.0, 1.0]);
    }
}
