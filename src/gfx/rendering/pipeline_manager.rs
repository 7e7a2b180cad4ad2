//! Render pipeline management for wgpu
//!
//! Shaders are compiled and pipelines registered by name; everything
//! registered is built in one go by [`PipelineManager::create_all_pipelines`],
//! which reports validation errors instead of letting them reach the device's
//! uncaptured-error handler. Every pipeline uses the [`Vertex3D`] layout.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Configuration for creating a render pipeline
///
/// A pipeline without a color target has no fragment stage (depth only).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub cull_mode: Option<Face>,
    pub depth_stencil: Option<DepthStencilState>,
    pub color_target: Option<ColorTargetState>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Pipeline".to_string(),
            shader: String::new(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(Face::Back),
            depth_stencil: None,
            color_target: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Name the shader was loaded under with [`PipelineManager::load_shader`]
    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_vertex_only(mut self) -> Self {
        self.color_target = None;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Depth test `Less` with writes against a target of `format`
    pub fn with_depth_stencil(mut self, format: TextureFormat) -> Self {
        self.depth_stencil = Some(DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });
        self
    }

    /// Slope-scaled bias; only meaningful after [`Self::with_depth_stencil`]
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        if let Some(depth) = self.depth_stencil.as_mut() {
            depth.bias = DepthBiasState {
                constant,
                slope_scale,
                clamp: 0.0,
            };
        }
        self
    }

    pub fn with_color_target(mut self, format: TextureFormat, blend: BlendState) -> Self {
        self.color_target = Some(ColorTargetState {
            format,
            blend: Some(blend),
            write_mask: ColorWrites::ALL,
        });
        self
    }
}

/// Named render pipelines and the shader modules they use
pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    configs: Vec<(String, PipelineConfig)>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            configs: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL shader module under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_string(), module);
    }

    /// Registers a pipeline; it is built by the next [`Self::create_all_pipelines`]
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.configs.retain(|(existing, _)| existing != name);
        self.configs.push((name.to_string(), config));
    }

    /// A built pipeline
    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Builds every registered pipeline that does not exist yet.
    ///
    /// Returns one message per pipeline that failed.
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, config) in &self.configs {
            if self.pipelines.contains_key(name) {
                continue;
            }
            match self.build(name, config) {
                Ok(pipeline) => {
                    log::debug!("Created pipeline '{name}'");
                    self.pipelines.insert(name.clone(), pipeline);
                }
                Err(e) => errors.push(format!("Pipeline '{name}': {e}")),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Result<RenderPipeline, String> {
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| format!("shader '{}' not loaded", config.shader))?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let targets = [config.color_target.clone()];

        self.device.push_error_scope(ErrorFilter::Validation);

        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{name} Layout")),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: config.color_target.as_ref().map(|_| FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: config.depth_stencil.clone(),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(error.to_string()),
            None => Ok(pipeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_only_drops_the_color_target() {
        let config = PipelineConfig::default()
            .with_color_target(TextureFormat::Bgra8Unorm, BlendState::ALPHA_BLENDING)
            .with_vertex_only();
        assert!(config.color_target.is_none());
    }

    #[test]
    fn depth_bias_applies_to_the_depth_state() {
        let config = PipelineConfig::default()
            .with_depth_stencil(TextureFormat::Depth32Float)
            .with_depth_bias(2, 2.0);
        let depth = config.depth_stencil.unwrap();
        assert_eq!(depth.bias.constant, 2);
        assert_eq!(depth.bias.slope_scale, 2.0);
        assert_eq!(depth.depth_compare, CompareFunction::Less);

        // Without a depth target there is nothing to bias
        let config = PipelineConfig::default().with_depth_bias(2, 2.0);
        assert!(config.depth_stencil.is_none());
    }
}
