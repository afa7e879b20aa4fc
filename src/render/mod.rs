//! Forward renderer: one pipeline, CPU-posed vertices, per-mesh uniform
//! buffers. GPU resources are derived lazily from the scene and dropped
//! wholesale on [`Renderer::release`].

pub mod context;
pub mod pipeline;

pub use context::WgpuContext;
pub use pipeline::{
    sun_view_proj, GlobalUniforms, MeshPipeline, ObjectUniforms, Vertex, SHADOW_FRUSTUM_EXTENT,
    SHADOW_MAP_SIZE,
};

use glam::{Mat4, Vec3, Vec4};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::resources::{Geometry, Topology};
use crate::scene::{Camera, LightKind, MeshKey, Scene};

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_count: u32,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    /// Skinned or morphed: vertices are re-posed and re-uploaded per frame.
    dynamic: bool,
    topology: Topology,
    casts_shadows: bool,
}

struct GpuState {
    ctx: WgpuContext,
    pipeline: MeshPipeline,
    meshes: SecondaryMap<MeshKey, GpuMesh>,
}

/// GPU-free at construction; [`init`](Self::init) creates the surface and
/// pipeline once a window exists.
pub struct Renderer {
    state: Option<GpuState>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let ctx = WgpuContext::new(window, width, height).await?;
        let pipeline = MeshPipeline::new(&ctx.device, ctx.color_format());
        self.state = Some(GpuState {
            ctx,
            pipeline,
            meshes: SecondaryMap::new(),
        });
        Ok(())
    }

    /// Surface aspect ratio, for camera updates on resize.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f32> {
        let state = self.state.as_ref()?;
        let (width, height) = state.ctx.size();
        if height == 0 {
            return None;
        }
        Some(width as f32 / height as f32)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(state) = &mut self.state {
            state.ctx.resize(width, height);
        }
    }

    /// Drops every GPU resource. Rendering afterwards is a no-op until
    /// [`init`](Self::init) runs again.
    pub fn release(&mut self) {
        if self.state.take().is_some() {
            log::info!("Renderer released");
        }
    }

    /// Draws the scene. World and joint matrices must already be current
    /// (the caller runs `scene.update()` first).
    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };

        state
            .meshes
            .retain(|key, _| scene.meshes.contains_key(key));

        let shadows_enabled = upload_globals(state, scene);
        let draws = prepare_meshes(state, scene);

        let frame = match state.ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = state.ctx.size();
                state.ctx.resize(width, height);
                return Ok(());
            }
            Err(err) => {
                log::error!("Failed to acquire surface frame: {err}");
                return Ok(());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bg = scene.background;
        let mut encoder = state
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if shadows_enabled {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.pipeline.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&state.pipeline.shadow_pipeline);
            pass.set_bind_group(0, &state.pipeline.shadow_globals_bind_group, &[]);

            for &key in &draws {
                let Some(gpu_mesh) = state.meshes.get(key) else {
                    continue;
                };
                if !gpu_mesh.casts_shadows || gpu_mesh.topology != Topology::TriangleList {
                    continue;
                }
                pass.set_bind_group(1, &gpu_mesh.object_bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                match &gpu_mesh.index_buffer {
                    Some(indices) => {
                        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..gpu_mesh.draw_count, 0, 0..1);
                    }
                    None => pass.draw(0..gpu_mesh.draw_count, 0..1),
                }
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.x),
                            g: f64::from(bg.y),
                            b: f64::from(bg.z),
                            a: f64::from(bg.w),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.ctx.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &state.pipeline.globals_bind_group, &[]);

            for key in draws {
                let Some(gpu_mesh) = state.meshes.get(key) else {
                    continue;
                };
                match gpu_mesh.topology {
                    Topology::TriangleList => pass.set_pipeline(&state.pipeline.pipeline),
                    Topology::LineList => pass.set_pipeline(&state.pipeline.line_pipeline),
                }
                pass.set_bind_group(1, &gpu_mesh.object_bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                match &gpu_mesh.index_buffer {
                    Some(indices) => {
                        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..gpu_mesh.draw_count, 0, 0..1);
                    }
                    None => pass.draw(0..gpu_mesh.draw_count, 0..1),
                }
            }
        }

        state.ctx.queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(())
    }
}

/// Uploads per-frame uniforms; returns whether the shadow pass should run
/// this frame (a shadow-casting directional light exists).
fn upload_globals(state: &mut GpuState, scene: &Scene) -> bool {
    let mut globals = GlobalUniforms::default();
    let mut shadows_enabled = false;

    if let Some(handle) = scene.active_camera {
        if let Some(node) = scene.get_node(handle) {
            if let Some(camera) = node.camera.and_then(|key| scene.cameras.get(key)) {
                let world = node.transform.world_matrix();
                globals.view_proj = camera.projection_matrix() * Camera::view_matrix(world);
                globals.camera_pos = Vec3::from(world.translation).extend(1.0);
            }
        }
    }

    // First hemisphere and first directional light win; extra lights are
    // ignored by this forward pass.
    let mut have_hemi = false;
    let mut have_sun = false;
    for (_, node) in &scene.nodes {
        if !node.visible {
            continue;
        }
        let Some(light) = node.light.and_then(|key| scene.lights.get(key)) else {
            continue;
        };
        match &light.kind {
            LightKind::Hemisphere { ground_color } if !have_hemi => {
                globals.hemi_sky = light.color.extend(light.intensity);
                globals.hemi_ground = ground_color.extend(0.0);
                let up = Vec3::from(node.transform.world_matrix().matrix3.y_axis);
                globals.hemi_up = up.normalize_or(Vec3::Y).extend(0.0);
                have_hemi = true;
            }
            LightKind::Directional if !have_sun => {
                globals.sun_color = light.color.extend(light.intensity);
                let forward = -Vec3::from(node.transform.world_matrix().matrix3.z_axis);
                let direction = forward.normalize_or(Vec3::NEG_Y);
                shadows_enabled = light.cast_shadows;
                if shadows_enabled {
                    globals.sun_view_proj = sun_view_proj(direction);
                }
                globals.sun_direction = direction.extend(f32::from(u8::from(shadows_enabled)));
                have_sun = true;
            }
            _ => {}
        }
    }
    if !have_hemi {
        globals.hemi_sky = Vec4::new(1.0, 1.0, 1.0, 1.0);
        globals.hemi_ground = Vec4::new(0.2, 0.2, 0.2, 0.0);
    }

    if let Some(fog) = scene.fog {
        globals.fog_color = fog.color.extend(1.0);
        globals.fog_params = Vec4::new(fog.near, fog.far, 0.0, 0.0);
    }

    state
        .ctx
        .queue
        .write_buffer(&state.pipeline.globals_buffer, 0, bytemuck::bytes_of(&globals));

    shadows_enabled
}

/// Ensures GPU buffers exist for every visible mesh, re-poses dynamic ones,
/// and uploads object uniforms. Returns the draw list.
fn prepare_meshes(state: &mut GpuState, scene: &Scene) -> Vec<MeshKey> {
    let mut draws = Vec::new();

    for (_, node) in &scene.nodes {
        if !node.visible {
            continue;
        }
        let Some(key) = node.mesh else {
            continue;
        };
        let Some(mesh) = scene.meshes.get(key) else {
            continue;
        };
        let geometry = &mesh.geometry;
        if geometry.vertex_count() == 0 {
            continue;
        }

        let joint_matrices = node
            .skin
            .and_then(|binding| scene.skins.get(binding.skeleton))
            .map(crate::scene::Skeleton::joint_matrices);

        if !state.meshes.contains_key(key) {
            let vertices = pose_vertices(geometry, &node.morph_weights, joint_matrices);
            let gpu_mesh = create_gpu_mesh(
                &state.ctx.device,
                &state.pipeline.object_layout,
                geometry,
                &vertices,
                mesh.cast_shadows,
            );
            state.meshes.insert(key, gpu_mesh);
        } else if state.meshes[key].dynamic {
            let vertices = pose_vertices(geometry, &node.morph_weights, joint_matrices);
            state.ctx.queue.write_buffer(
                &state.meshes[key].vertex_buffer,
                0,
                bytemuck::cast_slice(&vertices),
            );
        }

        let object = ObjectUniforms {
            model: node.transform.world_matrix_as_mat4(),
            color: mesh.material.color,
            params: Vec4::new(f32::from(u8::from(mesh.material.unlit)), 0.0, 0.0, 0.0),
        };
        state.ctx.queue.write_buffer(
            &state.meshes[key].object_buffer,
            0,
            bytemuck::bytes_of(&object),
        );

        draws.push(key);
    }

    draws
}

fn create_gpu_mesh(
    device: &wgpu::Device,
    object_layout: &wgpu::BindGroupLayout,
    geometry: &Geometry,
    vertices: &[Vertex],
    casts_shadows: bool,
) -> GpuMesh {
    let dynamic = geometry.is_dynamic();
    let mut usage = wgpu::BufferUsages::VERTEX;
    if dynamic {
        usage |= wgpu::BufferUsages::COPY_DST;
    }

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Vertices", geometry.name)),
        contents: bytemuck::cast_slice(vertices),
        usage,
    });

    let (index_buffer, draw_count) = match &geometry.indices {
        Some(indices) => {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Indices", geometry.name)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (Some(buffer), indices.len() as u32)
        }
        None => (None, vertices.len() as u32),
    };

    let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Object Uniforms", geometry.name)),
        contents: bytemuck::bytes_of(&ObjectUniforms {
            model: Mat4::IDENTITY,
            color: Vec4::ONE,
            params: Vec4::ZERO,
        }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object BindGroup"),
        layout: object_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: object_buffer.as_entire_binding(),
        }],
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        draw_count,
        object_buffer,
        object_bind_group,
        dynamic,
        topology: geometry.topology,
        casts_shadows,
    }
}

/// Evaluates morph targets and skinning on the CPU, producing the posed
/// vertex stream in mesh-local space.
fn pose_vertices(
    geometry: &Geometry,
    morph_weights: &[f32],
    joint_matrices: Option<&[Mat4]>,
) -> Vec<Vertex> {
    let count = geometry.vertex_count();
    let mut vertices = Vec::with_capacity(count);

    for i in 0..count {
        let mut position = geometry.positions[i];
        let mut normal = geometry.normals.get(i).copied().unwrap_or(Vec3::Y);

        for (target, &weight) in geometry.morph_targets.iter().zip(morph_weights) {
            if weight == 0.0 {
                continue;
            }
            if let Some(delta) = target.position_deltas.get(i) {
                position += *delta * weight;
            }
            if let Some(delta) = target.normal_deltas.get(i) {
                normal += *delta * weight;
            }
        }

        if let (Some(matrices), Some(joints), Some(weights)) =
            (joint_matrices, &geometry.joints, &geometry.weights)
        {
            let indices = joints[i];
            let influence = weights[i];

            let mut skinned_position = Vec3::ZERO;
            let mut skinned_normal = Vec3::ZERO;
            for (j, &joint) in indices.iter().enumerate() {
                let weight = influence[j];
                if weight == 0.0 {
                    continue;
                }
                let Some(matrix) = matrices.get(joint as usize) else {
                    continue;
                };
                skinned_position += matrix.transform_point3(position) * weight;
                skinned_normal += matrix.transform_vector3(normal) * weight;
            }
            position = skinned_position;
            normal = skinned_normal;
        }

        vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.normalize_or(Vec3::Y).to_array(),
        });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MorphTarget;
    use glam::Quat;

    fn unit_triangle() -> Geometry {
        Geometry::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
        )
    }

    #[test]
    fn static_geometry_passes_through() {
        let geometry = unit_triangle();
        let vertices = pose_vertices(&geometry, &[], None);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn morph_weights_displace_positions() {
        let mut geometry = unit_triangle();
        geometry.morph_targets.push(MorphTarget {
            position_deltas: vec![Vec3::new(0.0, 0.0, 2.0); 3],
            normal_deltas: vec![Vec3::ZERO; 3],
        });

        let vertices = pose_vertices(&geometry, &[0.5], None);
        assert_eq!(vertices[0].position, [0.0, 0.0, 1.0]);

        // Zero weight leaves the base pose.
        let vertices = pose_vertices(&geometry, &[0.0], None);
        assert_eq!(vertices[0].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn single_joint_translation_moves_vertices() {
        let mut geometry = unit_triangle();
        geometry.joints = Some(vec![[0, 0, 0, 0]; 3]);
        geometry.weights = Some(vec![Vec4::new(1.0, 0.0, 0.0, 0.0); 3]);

        let joint = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let vertices = pose_vertices(&geometry, &[], Some(&[joint]));
        assert_eq!(vertices[0].position, [0.0, 5.0, 0.0]);
        // Translation must not bend normals.
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn joint_rotation_rotates_normals() {
        let mut geometry = unit_triangle();
        geometry.joints = Some(vec![[0, 0, 0, 0]; 3]);
        geometry.weights = Some(vec![Vec4::new(1.0, 0.0, 0.0, 0.0); 3]);

        let joint = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let vertices = pose_vertices(&geometry, &[], Some(&[joint]));
        let normal = Vec3::from_array(vertices[0].normal);
        assert!((normal - Vec3::X).length() < 1e-5);
    }
}
