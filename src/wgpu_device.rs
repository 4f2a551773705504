use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::device::{FrameParams, RenderDevice, ResourceId, TargetId};
use crate::error::RenderError;
use crate::strategy::{RenderStrategy, StrategyResources};

const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const QUAD_TEXTURE_SIZE: u32 = 8;

/// Per-frame uniform shared by both strategy pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    transform: [[f32; 4]; 4],
    time: f32,
    _pad: [f32; 3],
}

/// Quad vertex for the direct path
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { position: [0.5, -0.5], uv: [1.0, 1.0] },
    QuadVertex { position: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { position: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { position: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { position: [-0.5, 0.5], uv: [0.0, 0.0] },
];

/// wgpu-backed implementation of the render device seam
///
/// Holds a registry of host-owned output targets (offscreen textures or
/// window surfaces) and of renderer-owned strategy resources. Device and
/// queue are Arc'd so the handle clones cheaply.
pub struct WgpuDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    state: Mutex<DeviceState>,
}

struct DeviceState {
    targets: HashMap<TargetId, OutputTarget>,
    resources: HashMap<ResourceId, ResourceEntry>,
    next_target: u32,
    next_resource: u64,
}

enum OutputTarget {
    Offscreen {
        texture: wgpu::Texture,
        width: u32,
        height: u32,
    },
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
}

impl OutputTarget {
    fn format(&self) -> wgpu::TextureFormat {
        match self {
            Self::Offscreen { .. } => OFFSCREEN_FORMAT,
            Self::Surface { config, .. } => config.format,
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Offscreen { width, height, .. } => (*width, *height),
            Self::Surface { config, .. } => (config.width, config.height),
        }
    }
}

enum ResourceEntry {
    Buffer(wgpu::Buffer),
    Texture(LayerTexture),
    Compositor(CompositorBundle),
    Direct(DirectBundle),
}

struct LayerTexture {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl LayerTexture {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Compositing Layer Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, width, height }
    }
}

#[derive(Clone)]
struct CompositorBundle {
    layer_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    blit_group: wgpu::BindGroup,
    uniform: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    layer_texture: ResourceId,
}

#[derive(Clone)]
struct DirectBundle {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform: wgpu::Buffer,
}

/// What one frame draws into; surface frames must be presented after submit
enum TargetFrame {
    Offscreen(wgpu::TextureView),
    Surface {
        frame: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
}

impl TargetFrame {
    fn view(&self) -> &wgpu::TextureView {
        match self {
            Self::Offscreen(view) => view,
            Self::Surface { view, .. } => view,
        }
    }

    fn present(self) {
        if let Self::Surface { frame, .. } = self {
            frame.present();
        }
    }
}

impl WgpuDevice {
    /// Create a headless device, for offscreen targets only
    pub async fn new() -> Result<Self, RenderError> {
        let instance = Self::create_instance();
        let adapter = Self::request_adapter(&instance, None).await?;
        Self::from_adapter(&adapter).await
    }

    /// Create a device compatible with a window, registering its surface as
    /// an output target
    pub async fn for_window(window: Arc<Window>) -> Result<(Self, TargetId), RenderError> {
        let size = window.inner_size();
        let instance = Self::create_instance();
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Device(format!("failed to create surface: {e}")))?;
        let adapter = Self::request_adapter(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let device = Self::from_adapter(&adapter).await?;
        surface.configure(&device.device, &config);

        let target = {
            let mut state = device.state.lock().unwrap();
            state.register_target(OutputTarget::Surface { surface, config })
        };
        Ok((device, target))
    }

    /// Register an offscreen texture as an output target
    ///
    /// The target stays owned by the host side of the device, never by a
    /// renderer drawing into it.
    pub fn register_offscreen_target(&self, width: u32, height: u32) -> TargetId {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Output Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let mut state = self.state.lock().unwrap();
        state.register_target(OutputTarget::Offscreen {
            texture,
            width: width.max(1),
            height: height.max(1),
        })
    }

    /// Get reference to the device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<wgpu::Adapter, RenderError> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Device(format!("failed to find adapter: {e:?}")))
    }

    async fn from_adapter(adapter: &wgpu::Adapter) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Frame Renderer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| RenderError::Device(format!("failed to create device: {e:?}")))?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            state: Mutex::new(DeviceState {
                targets: HashMap::new(),
                resources: HashMap::new(),
                next_target: 1,
                next_resource: 1,
            }),
        })
    }

    fn build_compositor(
        &self,
        state: &mut DeviceState,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> StrategyResources {
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Compositor Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("compositor.wgsl").into()),
            });

        let uniform = self.create_uniform_buffer("Compositor Frame Uniform");
        let sampler = self.create_sampler("Compositor Layer Sampler");
        let layer = LayerTexture::new(&self.device, width, height);

        let uniform_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Compositor Uniform Layout"),
                    entries: &[uniform_layout_entry(0)],
                });
        let uniform_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compositor Uniform Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let blit_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Compositor Blit Layout"),
                entries: &[texture_layout_entry(1), sampler_layout_entry(2)],
            });
        let blit_group = Self::create_blit_group(&self.device, &blit_layout, &layer.view, &sampler);

        let layer_pipeline = self.create_pipeline(
            "Compositor Layer Pipeline",
            &shader,
            &[&uniform_layout],
            "vs_fullscreen",
            "fs_layer",
            &[],
            LAYER_FORMAT,
        );
        let blit_pipeline = self.create_pipeline(
            "Compositor Blit Pipeline",
            &shader,
            &[&blit_layout],
            "vs_fullscreen",
            "fs_blit",
            &[],
            target_format,
        );

        let layer_texture = state.register_resource(ResourceEntry::Texture(layer));
        let blit_pipeline = state.register_resource(ResourceEntry::Compositor(CompositorBundle {
            layer_pipeline,
            blit_pipeline,
            blit_layout,
            blit_group,
            uniform,
            uniform_group,
            sampler,
            layer_texture,
        }));

        StrategyResources::CompositorBacked {
            layer_texture,
            blit_pipeline,
        }
    }

    fn build_direct(
        &self,
        state: &mut DeviceState,
        target_format: wgpu::TextureFormat,
    ) -> StrategyResources {
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Direct Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("direct.wgsl").into()),
            });

        let quad = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Direct Quad Vertices"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let texture_entry = self.create_checker_texture();
        let uniform = self.create_uniform_buffer("Direct Frame Uniform");
        let sampler = self.create_sampler("Direct Quad Sampler");

        let layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Direct Bind Group Layout"),
                entries: &[
                    uniform_layout_entry(0),
                    texture_layout_entry(1),
                    sampler_layout_entry(2),
                ],
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Direct Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_entry.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
        };
        let pipeline = self.create_pipeline(
            "Direct Pipeline",
            &shader,
            &[&layout],
            "vs_main",
            "fs_main",
            &[vertex_layout],
            target_format,
        );

        let quad_buffer = state.register_resource(ResourceEntry::Buffer(quad));
        let texture = state.register_resource(ResourceEntry::Texture(texture_entry));
        let pipeline = state.register_resource(ResourceEntry::Direct(DirectBundle {
            pipeline,
            bind_group,
            uniform,
        }));

        StrategyResources::DirectTexture {
            quad_buffer,
            texture,
            pipeline,
        }
    }

    fn create_uniform_buffer(&self, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_sampler(&self, label: &str) -> wgpu::Sampler {
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }

    fn create_blit_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        layer_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compositor Blit Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(layer_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Procedural checkerboard so the direct path needs no asset loading
    fn create_checker_texture(&self) -> LayerTexture {
        let size = QUAD_TEXTURE_SIZE;
        let mut texels = vec![0u8; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                let offset = ((y * size + x) * 4) as usize;
                let value = if (x + y) % 2 == 0 { 230 } else { 40 };
                texels[offset] = value;
                texels[offset + 1] = value;
                texels[offset + 2] = value;
                texels[offset + 3] = 255;
            }
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Direct Quad Texture"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            texture.as_image_copy(),
            &texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );

        LayerTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            width: size,
            height: size,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_pipeline(
        &self,
        label: &str,
        shader: &wgpu::ShaderModule,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        vs_entry: &str,
        fs_entry: &str,
        vertex_buffers: &[wgpu::VertexBufferLayout],
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts,
                push_constant_ranges: &[],
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(vs_entry),
                    buffers: vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(fs_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    /// Acquire this frame's target view, reconfiguring surface targets whose
    /// size diverged from the viewport
    fn acquire_frame(
        &self,
        state: &mut DeviceState,
        target: TargetId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<TargetFrame, RenderError> {
        match state.targets.get_mut(&target) {
            None => Err(RenderError::UnknownTarget(target)),
            Some(OutputTarget::Offscreen { texture, .. }) => Ok(TargetFrame::Offscreen(
                texture.create_view(&wgpu::TextureViewDescriptor::default()),
            )),
            Some(OutputTarget::Surface { surface, config }) => {
                if config.width != viewport_width || config.height != viewport_height {
                    config.width = viewport_width;
                    config.height = viewport_height;
                    surface.configure(&self.device, config);
                }
                let frame = surface.get_current_texture()?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(TargetFrame::Surface { frame, view })
            }
        }
    }

    fn write_uniform(&self, buffer: &wgpu::Buffer, transform: glam::Mat4, time: f32) {
        let uniform = FrameUniform {
            transform: transform.to_cols_array_2d(),
            time,
            _pad: [0.0; 3],
        };
        self.queue
            .write_buffer(buffer, 0, bytemuck::bytes_of(&uniform));
    }

    fn draw_compositor(
        &self,
        state: &mut DeviceState,
        params: &FrameParams,
        layer_texture: ResourceId,
        bundle_id: ResourceId,
    ) -> Result<(), RenderError> {
        let bundle = match state.resources.get(&bundle_id) {
            Some(ResourceEntry::Compositor(bundle)) => bundle.clone(),
            _ => return Err(RenderError::Device("compositor bundle missing".into())),
        };

        // The layer tracks the viewport; recreate it (and the blit group)
        // after a resize
        let stale = match state.resources.get(&layer_texture) {
            Some(ResourceEntry::Texture(layer)) => {
                layer.width != params.viewport.width || layer.height != params.viewport.height
            }
            _ => return Err(RenderError::Device("compositing layer missing".into())),
        };
        if stale {
            let layer = LayerTexture::new(
                &self.device,
                params.viewport.width,
                params.viewport.height,
            );
            let blit_group =
                Self::create_blit_group(&self.device, &bundle.blit_layout, &layer.view, &bundle.sampler);
            state
                .resources
                .insert(layer_texture, ResourceEntry::Texture(layer));
            if let Some(ResourceEntry::Compositor(stored)) = state.resources.get_mut(&bundle_id) {
                stored.blit_group = blit_group;
            }
        }
        let (layer_view, blit_group) = match state.resources.get(&layer_texture) {
            Some(ResourceEntry::Texture(layer)) => {
                let group = match state.resources.get(&bundle_id) {
                    Some(ResourceEntry::Compositor(stored)) => stored.blit_group.clone(),
                    _ => bundle.blit_group.clone(),
                };
                (layer.view.clone(), group)
            }
            _ => return Err(RenderError::Device("compositing layer missing".into())),
        };

        self.write_uniform(&bundle.uniform, glam::Mat4::IDENTITY, params.time);

        let frame = self.acquire_frame(
            state,
            params.target,
            params.viewport.width,
            params.viewport.height,
        )?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compositor Encoder"),
            });

        {
            let mut pass = begin_clear_pass(&mut encoder, "Compositor Layer Pass", &layer_view);
            pass.set_pipeline(&bundle.layer_pipeline);
            pass.set_bind_group(0, &bundle.uniform_group, &[]);
            pass.draw(0..3, 0..1);
        }
        {
            let mut pass = begin_clear_pass(&mut encoder, "Compositor Blit Pass", frame.view());
            pass.set_pipeline(&bundle.blit_pipeline);
            pass.set_bind_group(0, &blit_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_direct(
        &self,
        state: &mut DeviceState,
        params: &FrameParams,
        quad_buffer: ResourceId,
        bundle_id: ResourceId,
    ) -> Result<(), RenderError> {
        let bundle = match state.resources.get(&bundle_id) {
            Some(ResourceEntry::Direct(bundle)) => bundle.clone(),
            _ => return Err(RenderError::Device("direct bundle missing".into())),
        };
        let quad = match state.resources.get(&quad_buffer) {
            Some(ResourceEntry::Buffer(buffer)) => buffer.clone(),
            _ => return Err(RenderError::Device("quad buffer missing".into())),
        };

        let transform =
            params.viewport.projection() * glam::Mat4::from_rotation_z(params.time * 0.8);
        self.write_uniform(&bundle.uniform, transform, params.time);

        let frame = self.acquire_frame(
            state,
            params.target,
            params.viewport.width,
            params.viewport.height,
        )?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Direct Encoder"),
            });

        {
            let mut pass = begin_clear_pass(&mut encoder, "Direct Pass", frame.view());
            pass.set_pipeline(&bundle.pipeline);
            pass.set_bind_group(0, &bundle.bind_group, &[]);
            pass.set_vertex_buffer(0, quad.slice(..));
            pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Degraded frame when no strategy was prepared: a bare clear
    fn draw_bare_clear(
        &self,
        state: &mut DeviceState,
        params: &FrameParams,
    ) -> Result<(), RenderError> {
        let frame = self.acquire_frame(
            state,
            params.target,
            params.viewport.width,
            params.viewport.height,
        )?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Bare Clear Encoder"),
            });
        {
            let _pass = begin_clear_pass(&mut encoder, "Bare Clear Pass", frame.view());
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl RenderDevice for WgpuDevice {
    fn prepare(
        &self,
        target: TargetId,
        strategy: RenderStrategy,
    ) -> Result<StrategyResources, RenderError> {
        let mut state = self.state.lock().unwrap();
        let (format, (width, height)) = match state.targets.get(&target) {
            Some(output) => (output.format(), output.dimensions()),
            None => return Err(RenderError::UnknownTarget(target)),
        };

        Ok(match strategy {
            RenderStrategy::CompositorBacked => {
                self.build_compositor(&mut state, format, width, height)
            }
            RenderStrategy::DirectTexture => self.build_direct(&mut state, format),
        })
    }

    fn draw(&self, params: &FrameParams) -> Result<(), RenderError> {
        let mut state = self.state.lock().unwrap();
        match params.resources {
            Some(&StrategyResources::CompositorBacked {
                layer_texture,
                blit_pipeline,
            }) => self.draw_compositor(&mut state, params, layer_texture, blit_pipeline),
            Some(&StrategyResources::DirectTexture {
                quad_buffer,
                pipeline,
                ..
            }) => self.draw_direct(&mut state, params, quad_buffer, pipeline),
            None => self.draw_bare_clear(&mut state, params),
        }
    }

    fn release(&self, id: ResourceId) {
        let mut state = self.state.lock().unwrap();
        if state.resources.remove(&id).is_none() {
            log::trace!("release of unknown resource {id:?} ignored");
        }
    }
}

impl DeviceState {
    fn register_target(&mut self, target: OutputTarget) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target += 1;
        self.targets.insert(id, target);
        id
    }

    fn register_resource(&mut self, entry: ResourceEntry) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource += 1;
        self.resources.insert(id, entry);
        id
    }
}

fn begin_clear_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

fn uniform_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}
