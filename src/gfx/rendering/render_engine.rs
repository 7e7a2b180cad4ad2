//! WGPU-based rendering engine for the showroom
//!
//! Draws the floor and the attached model under one shadow-casting spotlight:
//! a depth-only shadow pass from the light, then the main PBR pass, then an
//! optional UI overlay.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use cgmath::{Matrix4, SquareMatrix};
use wgpu::{Device, TextureFormat};

use crate::config::{GroundConfig, SpotLightConfig};
use crate::gfx::{
    camera::camera_utils::CameraUniform,
    geometry::generate_plane,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        material::{MaterialBindings, SurfaceMaterial},
        texture_resource::TextureResource,
    },
    scene::node::ModelHandle,
};
use crate::viewer::lifecycle::RenderScene;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder},
    binding_types,
};

use super::draw_item::{DrawItem, DrawItems, TransformBindings};
use super::pipeline_manager::{PipelineConfig, PipelineManager};

const SHADOW_PIPELINE: &str = "Shadow";
const PBR_PIPELINE: &str = "PBR";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_bindings: TransformBindings,
    material_bindings: MaterialBindings,

    // Shadow mapping resources
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,

    light: SpotLightConfig,
    ground: DrawItem,
    model_items: Vec<DrawItem>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, creates the depth buffer and shadow map, and builds
    /// the shadow and PBR pipelines.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        light: SpotLightConfig,
        ground: &GroundConfig,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        // Gamma is applied in the shader, so prefer a linear surface format
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let shadow_map_size = light.shadow_map_size.clamp(256, 4096);
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_map_size);
        let (shadow_w, shadow_h) = shadow_map.size();
        log::debug!("Shadow map {shadow_w}x{shadow_h}");

        let shadow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_depth_2d())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Comparison,
            ))
            .create(&device, "Shadow Bind Group");
        let shadow_bind_group = BindGroupBuilder::new(&shadow_layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(&device, "Shadow Bind Group");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let transform_bindings = TransformBindings::new(&device);
        let material_bindings = MaterialBindings::new(&device);

        let mut ground_item = DrawItem::new(
            &device,
            "Ground",
            &generate_plane(ground.size, ground.size, ground.segments, ground.segments),
            &transform_bindings,
            &material_bindings,
        );
        ground_item.update(
            &queue,
            Matrix4::identity(),
            SurfaceMaterial::matte("Ground", ground.color).to_uniform(true),
        );

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));

        // Shadow depth pass - no culling so thin parts still cast
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    transform_bindings.bind_group_layout().clone(),
                ])
                .with_vertex_only(),
        );

        // Imported models are not guaranteed to be closed, so draw both faces
        pipeline_manager.register_pipeline(
            PBR_PIPELINE,
            PipelineConfig::default()
                .with_label("PBR")
                .with_shader("pbr")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_cull_mode(None)
                .with_color_target(format, wgpu::BlendState::ALPHA_BLENDING)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    transform_bindings.bind_group_layout().clone(),
                    material_bindings.bind_group_layout().clone(),
                    shadow_layout.layout.clone(),
                ]),
        );

        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| anyhow!(errors.join("; ")))?;

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            format,
            depth_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_bindings,
            material_bindings,
            shadow_map,
            shadow_bind_group,
            light,
            ground: ground_item,
            model_items: Vec::new(),
        })
    }

    /// Renders a frame with an optional UI overlay
    pub fn render_frame<F>(&mut self, ui_callback: Option<F>) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Shadow map from the spotlight
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.pipeline(SHADOW_PIPELINE) {
                shadow_pass.set_pipeline(pipeline);
                shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                for item in self.model_items.iter().filter(|item| item.cast_shadow) {
                    shadow_pass.draw_item_shadow(item);
                }
            }
        }

        // PASS 2: Main rendering with shadows, translucent surfaces last
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.pipeline(PBR_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(3, &self.shadow_bind_group, &[]);

                render_pass.draw_item(&self.ground);
                for item in self.model_items.iter().filter(|item| !item.translucent) {
                    render_pass.draw_item(item);
                }
                for item in self.model_items.iter().filter(|item| item.translucent) {
                    render_pass.draw_item(item);
                }
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Updates camera and light uniform buffers
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform, &self.light);
    }

    /// Copies transforms, materials and shadow flags of the model to the GPU.
    ///
    /// Surfaces are matched to draw items by visiting order, which is the
    /// same order [`RenderScene::attach_model`] created them in.
    pub fn sync_model(&mut self, model: &ModelHandle) {
        let queue = &self.queue;
        let items = &mut self.model_items;
        let mut index = 0;

        model.visit_surfaces(&mut |surface, world| {
            if let Some(item) = items.get_mut(index) {
                item.cast_shadow = surface.cast_shadow;
                item.update(
                    queue,
                    world,
                    surface.material.to_uniform(surface.receive_shadow),
                );
            }
            index += 1;
        });
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored. The shadow map
    /// keeps its fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface after it was lost or became outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl RenderScene for RenderEngine {
    fn attach_model(&mut self, model: &ModelHandle) {
        let device = &self.device;
        let transforms = &self.transform_bindings;
        let materials = &self.material_bindings;

        let mut items = Vec::with_capacity(model.surface_count());
        model.visit_surfaces(&mut |surface, _| {
            let label = format!("Surface {}", items.len());
            items.push(DrawItem::new(
                device,
                &label,
                &surface.mesh,
                transforms,
                materials,
            ));
        });

        log::info!("Attached model with {} draw items", items.len());
        self.model_items = items;
        self.sync_model(model);
    }
}
