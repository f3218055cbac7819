use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat4, Vec3};
use log::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::common::{toggle_mask, CameraParams, LightParams, MaterialParams};
use crate::obj::Mesh;
use crate::sphere::SphereMesh;

/// GPU renderer backed by wgpu that draws the loaded mesh and the light marker.
pub struct Renderer {
    // Declared before `window` so the surface is dropped first.
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    mesh_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_object: ObjectBinding,
    marker_object: ObjectBinding,
    mesh: Option<MeshBuffers>,
    marker: MeshBuffers,
    marker_radius: f32,
    window: Arc<Window>,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window and uploads both meshes.
    pub async fn new(window: Arc<Window>, mesh: &Mesh, marker: &SphereMesh) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        // SAFETY: the window is kept alive in `self.window` and outlives the surface.
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| matches!(mode, wgpu::PresentMode::Mailbox))
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let frame_layout = uniform_layout::<FrameUniform>(&device, "frame-bind-layout");
        let object_layout = uniform_layout::<ObjectUniform>(&device, "object-bind-layout");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "fs_phong",
            "mesh-pipeline",
        );
        let marker_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "fs_marker",
            "marker-pipeline",
        );

        let mesh_object = ObjectBinding::create(&device, &object_layout, "mesh");
        let marker_object = ObjectBinding::create(&device, &object_layout, "marker");
        let marker_buffers =
            MeshBuffers::from_slices(&device, &marker.vertices, &marker.indices, "light-marker");

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            size,
            depth,
            mesh_pipeline,
            marker_pipeline,
            frame_buffer,
            frame_bind_group,
            mesh_object,
            marker_object,
            mesh: None,
            marker: marker_buffers,
            marker_radius: marker.radius,
            window,
        };
        renderer.upload_mesh(mesh);
        Ok(renderer)
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn aspect(&self) -> f32 {
        if self.size.height == 0 {
            1.0
        } else {
            self.size.width as f32 / self.size.height as f32
        }
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Replaces the vertex and index buffers of the main mesh.
    pub fn upload_mesh(&mut self, mesh: &Mesh) {
        if mesh.is_empty() {
            debug!("mesh is empty; nothing will be drawn");
            self.mesh = None;
            return;
        }
        self.mesh = Some(MeshBuffers::from_slices(
            &self.device,
            &mesh.interleaved_vertices(),
            mesh.indices(),
            "mesh",
        ));
    }

    /// Rewrites the interleaved vertex data after a normal-mode toggle.
    pub fn update_mesh_vertices(&mut self, vertices: &[f32]) {
        let Some(buffers) = self.mesh.as_mut() else {
            return;
        };
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() as u64 != buffers.vertex.size() {
            warn!(
                "vertex data changed size ({} -> {} bytes); recreating buffer",
                buffers.vertex.size(),
                bytes.len()
            );
            buffers.vertex = create_vertex_buffer(&self.device, bytes, "mesh");
            return;
        }
        self.queue.write_buffer(&buffers.vertex, 0, bytes);
    }

    /// Updates the camera, light and material uniforms before rendering.
    pub fn update_frame(
        &self,
        camera: &CameraParams,
        light: &LightParams,
        material: &MaterialParams,
    ) {
        let frame = FrameUniform {
            view_proj: camera.view_proj.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            light_position: light.position.extend(1.0).into(),
            light_ambient: light.ambient.extend(0.0).into(),
            light_diffuse: light.diffuse.extend(0.0).into(),
            light_specular: light.specular.extend(0.0).into(),
            material: [material.shininess, 0.0, 0.0, 0.0],
            toggles: toggle_mask(material.toggles),
        };
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytes_of(&frame));

        let mesh = ObjectUniform {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: material.color.extend(1.0).into(),
        };
        self.queue
            .write_buffer(&self.mesh_object.buffer, 0, bytes_of(&mesh));

        let marker = ObjectUniform {
            model: marker_model_matrix(light.position, self.marker_radius).to_cols_array_2d(),
            color: light.marker_color.extend(1.0).into(),
        };
        self.queue
            .write_buffer(&self.marker_object.buffer, 0, bytes_of(&marker));
    }

    /// Draws the mesh followed by the light marker and presents the frame.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        if let Some(mesh) = self.mesh.as_ref() {
            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(1, &self.mesh_object.bind_group, &[]);
            mesh.draw(&mut pass);
        }

        pass.set_pipeline(&self.marker_pipeline);
        pass.set_bind_group(1, &self.marker_object.bind_group, &[]);
        self.marker.draw(&mut pass);

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn marker_model_matrix(position: Vec3, radius: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(radius))
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    fragment_entry: &str,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: (6 * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: (3 * std::mem::size_of::<f32>()) as u64,
                        shader_location: 1,
                    },
                ],
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

fn create_vertex_buffer(device: &wgpu::Device, contents: &[u8], label: &str) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-vertices")),
        contents,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

struct ObjectBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ObjectBinding {
    fn create(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}-object-uniform")),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-object-bind-group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_slices(device: &wgpu::Device, vertices: &[f32], indices: &[u32], label: &str) -> Self {
        let vertex = create_vertex_buffer(device, bytemuck::cast_slice(vertices), label);
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: indices.len() as u32,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_position: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
    // x: shininess
    material: [f32; 4],
    // x/y/z: ambient, diffuse, specular enabled (1.0) or disabled (0.0)
    toggles: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

const SHADER: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_position: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    light_specular: vec4<f32>,
    material: vec4<f32>,
    toggles: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = frame.view_proj * world_position;
    out.world_pos = world_position.xyz;
    out.normal = (object.model * vec4<f32>(input.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_phong(input: VertexOutput) -> @location(0) vec4<f32> {
    var normal = input.normal;
    if (length(normal) > 0.0) {
        normal = normalize(normal);
    }
    let light_dir = normalize(frame.light_position.xyz - input.world_pos);
    let view_dir = normalize(frame.camera_position.xyz - input.world_pos);
    let reflect_dir = reflect(-light_dir, normal);

    let ambient = frame.light_ambient.rgb * frame.toggles.x;
    let diffuse = frame.light_diffuse.rgb * max(dot(normal, light_dir), 0.0) * frame.toggles.y;
    let highlight = pow(max(dot(view_dir, reflect_dir), 0.0), frame.material.x);
    let specular = frame.light_specular.rgb * highlight * frame.toggles.z;

    let color = (ambient + diffuse) * object.color.rgb + specular;
    return vec4<f32>(color, object.color.a);
}

@fragment
fn fs_marker(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(object.color.rgb, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_respect_wgsl_alignment() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 176);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
    }

    #[test]
    fn marker_sits_on_light_at_radius_scale() {
        let model = marker_model_matrix(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let top = model.transform_point3(Vec3::Y);
        assert!((top - Vec3::new(1.0, 2.5, 3.0)).length() < 1e-6);
    }

    #[test]
    fn shader_declares_all_entry_points() {
        for entry in ["fn vs_main", "fn fs_phong", "fn fs_marker"] {
            assert!(SHADER.contains(entry), "missing {entry}");
        }
    }
}
