use std::borrow::Cow;

use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::render::context::DEPTH_FORMAT;

/// Shadow map edge length in texels.
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Half-extent of the sun's orthographic frustum, in world units. Sized to
/// cover a character plus the ground around it.
pub const SHADOW_FRUSTUM_EXTENT: f32 = 200.0;

/// View-projection of the scene from the sun. `direction` is the direction
/// the light travels; the frustum is centered on the origin.
#[must_use]
pub fn sun_view_proj(direction: Vec3) -> Mat4 {
    let dir = direction.normalize_or(Vec3::NEG_Y);
    // look_at_rh degenerates when the light is parallel to the up axis.
    let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let eye = -dir * 2.0 * SHADOW_FRUSTUM_EXTENT;
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
    let proj = Mat4::orthographic_rh(
        -SHADOW_FRUSTUM_EXTENT,
        SHADOW_FRUSTUM_EXTENT,
        -SHADOW_FRUSTUM_EXTENT,
        SHADOW_FRUSTUM_EXTENT,
        1.0,
        4.0 * SHADOW_FRUSTUM_EXTENT,
    );
    proj * view
}

/// Per-frame shared shading state, mirrored by `GlobalUniforms` in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniforms {
    pub view_proj: Mat4,
    pub sun_view_proj: Mat4,
    pub camera_pos: Vec4,
    /// rgb = sky color, a = intensity.
    pub hemi_sky: Vec4,
    pub hemi_ground: Vec4,
    pub hemi_up: Vec4,
    /// rgb = color, a = intensity.
    pub sun_color: Vec4,
    /// xyz = direction the light travels, w = 1.0 when the shadow map holds
    /// this frame's depths.
    pub sun_direction: Vec4,
    /// rgb = color, a = 1.0 when fog is enabled.
    pub fog_color: Vec4,
    /// x = near, y = far.
    pub fog_params: Vec4,
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            sun_view_proj: Mat4::IDENTITY,
            camera_pos: Vec4::W,
            hemi_sky: Vec4::new(1.0, 1.0, 1.0, 1.0),
            hemi_ground: Vec4::new(0.2, 0.2, 0.2, 0.0),
            hemi_up: Vec4::Y,
            sun_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            sun_direction: Vec4::new(0.0, -1.0, 0.0, 0.0),
            fog_color: Vec4::ZERO,
            fog_params: Vec4::new(1.0, 1000.0, 0.0, 0.0),
        }
    }
}

/// Per-draw state, mirrored by `ObjectUniforms` in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: Mat4,
    pub color: Vec4,
    /// x = 1.0 for unlit materials.
    pub params: Vec4,
}

/// Interleaved vertex layout shared by all meshes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Forward pipelines (triangles, blended lines), the depth-only shadow
/// pipeline with its map, the global uniform buffer, and the bind group
/// layouts (group 0 globals, group 1 per-object).
pub struct MeshPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub line_pipeline: wgpu::RenderPipeline,
    pub shadow_pipeline: wgpu::RenderPipeline,
    pub shadow_view: wgpu::TextureView,
    pub globals_buffer: wgpu::Buffer,
    pub globals_bind_group: wgpu::BindGroup,
    /// Uniform-only group 0 for the shadow pass, where the shadow map is the
    /// depth attachment and must not also be bound for sampling.
    pub shadow_globals_bind_group: wgpu::BindGroup,
    pub object_layout: wgpu::BindGroupLayout,
}

impl MeshPipeline {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let shadow_globals_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Globals Layout"),
                entries: &[uniform_entry(0)],
            });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[uniform_entry(0)],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniforms"),
            contents: bytemuck::bytes_of(&GlobalUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals BindGroup"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });
        let shadow_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Globals BindGroup"),
            layout: &shadow_globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            immediate_size: 0,
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&shadow_globals_layout, &object_layout],
                immediate_size: 0,
            });

        let forward_pipeline = |label, topology, blend, depth_write| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let pipeline = forward_pipeline(
            "Mesh Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::BlendState::REPLACE,
            true,
        );
        // Lines blend over already-drawn geometry and never occlude it.
        let line_pipeline = forward_pipeline(
            "Line Pipeline",
            wgpu::PrimitiveTopology::LineList,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_shadow"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            line_pipeline,
            shadow_pipeline,
            shadow_view,
            globals_buffer,
            globals_bind_group,
            shadow_globals_bind_group,
            object_layout,
        }
    }
}
