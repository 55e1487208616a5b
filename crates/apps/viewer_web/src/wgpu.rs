use viewer::{HostError, Renderer, SurfaceSize};

#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use scene::components::{Mesh, Side};
    use scene::matrix::mat4_mul;
    use scene::{PerspectiveCamera, Scene};
    use std::borrow::Cow;
    use viewer::HostError;
    use wasm_bindgen::prelude::*;

    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub double_sided_pipeline: ::wgpu::RenderPipeline,
        pub front_pipeline: ::wgpu::RenderPipeline,
        pub back_pipeline: ::wgpu::RenderPipeline,
        pub point_pipeline: ::wgpu::RenderPipeline,
        pub mesh_bind_group_layout: ::wgpu::BindGroupLayout,
        pub depth_view: ::wgpu::TextureView,
        /// GPU copies of `Scene::meshes`, same order. Scenes only grow.
        pub meshes: Vec<GpuMesh>,
    }

    pub struct GpuMesh {
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: Option<::wgpu::Buffer>,
        draw_count: u32,
        points: bool,
        side: Side,
        uniform_buffer: ::wgpu::Buffer,
        bind_group: ::wgpu::BindGroup,
    }

    // Unlit: fragments take the interpolated vertex color as-is.
    const MESH_SHADER: &str = r#"
struct MeshUniforms {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> mesh: MeshUniforms;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VsOut {
    return VsOut(mesh.mvp * vec4<f32>(position, 1.0), color);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(fs_in.color, 1.0);
}
"#;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Vertex {
        position: [f32; 3],
        color: [f32; 3],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct MeshUniforms {
        mvp: [[f32; 4]; 4],
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("viewer-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        shader: &::wgpu::ShaderModule,
        format: ::wgpu::TextureFormat,
        label: &str,
        topology: ::wgpu::PrimitiveTopology,
        cull_mode: Option<::wgpu::Face>,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(::wgpu::BlendState::REPLACE),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: ::wgpu::CompareFunction::Less,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    pub async fn init_wgpu_from_canvas(
        canvas_elem: web_sys::HtmlCanvasElement,
    ) -> Result<WgpuContext, JsValue> {
        let width = canvas_elem.width();
        let height = canvas_elem.height();

        // `wgpu::Surface` must not outlive its `wgpu::Instance`; the instance
        // lives for the rest of the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas_elem.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("viewer-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        // PLY vertex colors are already display-encoded, so skip sRGB targets.
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("viewer-mesh-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(MESH_SHADER)),
        });

        let mesh_bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("viewer-mesh-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("viewer-mesh-pipeline-layout"),
            bind_group_layouts: &[&mesh_bind_group_layout],
            immediate_size: 0,
        });

        let triangles = |label, cull_mode| {
            create_pipeline(
                &device,
                &pipeline_layout,
                &shader,
                config.format,
                label,
                ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
            )
        };
        let double_sided_pipeline = triangles("viewer-double-sided-pipeline", None);
        let front_pipeline = triangles("viewer-front-pipeline", Some(::wgpu::Face::Back));
        let back_pipeline = triangles("viewer-back-pipeline", Some(::wgpu::Face::Front));
        let point_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "viewer-point-pipeline",
            ::wgpu::PrimitiveTopology::PointList,
            None,
        );

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas_elem,
            double_sided_pipeline,
            front_pipeline,
            back_pipeline,
            point_pipeline,
            mesh_bind_group_layout,
            depth_view,
            meshes: Vec::new(),
        })
    }

    fn upload_mesh(ctx: &WgpuContext, mesh: &Mesh) -> GpuMesh {
        let geometry = &mesh.geometry;
        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                color: geometry
                    .colors
                    .as_ref()
                    .filter(|_| mesh.material.vertex_colors)
                    .and_then(|c| c.get(i).copied())
                    .unwrap_or([1.0, 1.0, 1.0]),
            })
            .collect();

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                label: Some("viewer-mesh-vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: ::wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = geometry.indices.as_ref().map(|indices| {
            ctx.device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("viewer-mesh-indices"),
                    contents: bytemuck::cast_slice(indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                })
        });
        let draw_count = geometry
            .indices
            .as_ref()
            .map_or(vertices.len(), |indices| indices.len()) as u32;

        let uniform_buffer = ctx.device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("viewer-mesh-uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("viewer-mesh-bg"),
            layout: &ctx.mesh_bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::debug!(
            "uploaded mesh: {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        GpuMesh {
            vertex_buffer,
            index_buffer,
            draw_count,
            points: geometry.is_point_cloud(),
            side: mesh.material.side,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    pub fn render_scene(
        ctx: &mut WgpuContext,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), HostError> {
        while ctx.meshes.len() < scene.mesh_count() {
            let mesh = &scene.meshes()[ctx.meshes.len()];
            let gpu = upload_mesh(ctx, mesh);
            ctx.meshes.push(gpu);
        }

        let frame = ctx
            .surface
            .get_current_texture()
            .map_err(|e| HostError::new(format!("surface acquire failed: {e}")))?;
        let view = frame
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        let view_proj = camera.view_projection();
        for (gpu, mesh) in ctx.meshes.iter().zip(scene.meshes()) {
            let uniforms = MeshUniforms {
                mvp: mat4_mul(view_proj, mesh.transform.matrix()),
            };
            ctx.queue
                .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("viewer-mesh-encoder"),
            });

        {
            let [r, g, b] = scene.background.to_array();
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("viewer-mesh-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for gpu in &ctx.meshes {
                let pipeline = match (gpu.points, gpu.side) {
                    (true, _) => &ctx.point_pipeline,
                    (false, Side::Double) => &ctx.double_sided_pipeline,
                    (false, Side::Front) => &ctx.front_pipeline,
                    (false, Side::Back) => &ctx.back_pipeline,
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &gpu.bind_group, &[]);
                rpass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                match (&gpu.index_buffer, gpu.points) {
                    (Some(indices), false) => {
                        rpass.set_index_buffer(indices.slice(..), ::wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..gpu.draw_count, 0, 0..1);
                    }
                    _ => rpass.draw(0..gpu.draw_count, 0..1),
                }
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use scene::{PerspectiveCamera, Scene};
    use viewer::HostError;
    use wasm_bindgen::prelude::JsValue;

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu_from_canvas(
        _canvas: web_sys::HtmlCanvasElement,
    ) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_scene(
        _ctx: &mut WgpuContext,
        _scene: &Scene,
        _camera: &PerspectiveCamera,
    ) -> Result<(), HostError> {
        Err(HostError::new(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{WgpuContext, init_wgpu_from_canvas, render_scene, resize_wgpu};

/// Backing-store size in device pixels for a client area in CSS pixels.
pub fn backing_size(size: SurfaceSize, pixel_ratio: f64) -> (u32, u32) {
    let scale = |v: f64| (v.max(0.0) * pixel_ratio).round() as u32;
    (scale(size.width), scale(size.height))
}

/// [`Renderer`] backed by a canvas-bound wgpu surface.
pub struct WgpuRenderer {
    ctx: WgpuContext,
    pixel_ratio: f64,
}

impl WgpuRenderer {
    pub fn new(ctx: WgpuContext, pixel_ratio: f64) -> Self {
        Self { ctx, pixel_ratio }
    }
}

impl Renderer for WgpuRenderer {
    fn set_size(&mut self, size: SurfaceSize) {
        let (width, height) = backing_size(size, self.pixel_ratio);
        resize_wgpu(&mut self.ctx, width, height);
    }

    fn render(
        &mut self,
        scene: &scene::Scene,
        camera: &scene::PerspectiveCamera,
    ) -> Result<(), HostError> {
        render_scene(&mut self.ctx, scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::backing_size;
    use viewer::SurfaceSize;

    #[test]
    fn backing_size_scales_by_pixel_ratio() {
        assert_eq!(backing_size(SurfaceSize::new(400.0, 300.0), 2.0), (800, 600));
        assert_eq!(backing_size(SurfaceSize::new(401.0, 0.0), 1.5), (602, 0));
    }

    #[test]
    fn negative_client_size_clamps_to_zero() {
        assert_eq!(backing_size(SurfaceSize::new(-10.0, 20.0), 1.0), (0, 20));
    }
}
