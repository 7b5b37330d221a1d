use crate::camera::CameraMatrices;
use crate::scene::{AnalyticScene, SceneBuffers, SceneTextures};
use crate::shader;
use crate::wgpu_ctx::WgpuContext;
use crate::wgpu_utils::color_target;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Per-frame uniform for the ray tracer. Positions and directions are in
/// view space so the shader can trace from the origin.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RaytraceUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub box_matrix: [[f32; 4]; 4],
    pub inv_box_matrix: [[f32; 4]; 4],
    pub sphere_center: [f32; 4],
    pub sphere_color: [f32; 4],
    pub sphere_surface: [f32; 4],
    pub box_size: [f32; 4],
    pub box_color: [f32; 4],
    pub box_surface: [f32; 4],
    pub light_color: [f32; 4],
    pub light_center: [f32; 4],
    pub light_u: [f32; 4],
    pub light_v: [f32; 4],
    pub frame_count: u32,
    pub width: u32,
    pub height: u32,
    pub _pad: u32,
}

impl RaytraceUniform {
    pub fn new(
        camera: &CameraMatrices,
        scene: &AnalyticScene,
        frame_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let view = camera.view;
        let box_matrix = view * scene.cuboid.transform;
        let sphere_center = view.transform_point3(scene.sphere.center);

        let light = &scene.light;
        let light_center = view.transform_point3(Vec3::new(0.0, light.height, 0.0));
        let light_u = view.transform_vector3(Vec3::new(light.size.x * 0.5, 0.0, 0.0));
        let light_v = view.transform_vector3(Vec3::new(0.0, 0.0, light.size.y * 0.5));

        Self {
            view: view.to_cols_array_2d(),
            proj: camera.proj.to_cols_array_2d(),
            inv_proj: camera.inv_proj.to_cols_array_2d(),
            box_matrix: box_matrix.to_cols_array_2d(),
            inv_box_matrix: box_matrix.inverse().to_cols_array_2d(),
            sphere_center: sphere_center.extend(scene.sphere.radius).to_array(),
            sphere_color: scene.sphere.color.extend(1.0).to_array(),
            sphere_surface: [scene.sphere.roughness, scene.sphere.metalness, 0.0, 0.0],
            box_size: scene.cuboid.size.extend(0.0).to_array(),
            box_color: scene.cuboid.color.extend(1.0).to_array(),
            box_surface: [scene.cuboid.roughness, scene.cuboid.metalness, 0.0, 0.0],
            light_color: light.color.extend(light.intensity).to_array(),
            light_center: light_center.extend(1.0).to_array(),
            light_u: light_u.extend(0.0).to_array(),
            light_v: light_v.extend(0.0).to_array(),
            frame_count,
            width,
            height,
            _pad: 0,
        }
    }
}

/// Full-screen pass that traces one sample per pixel and blends it into the
/// HDR target with weight `1 / frame_count`.
pub struct RaytracePass {
    pub pipeline: wgpu::RenderPipeline,
    pub scene_bind_group: wgpu::BindGroup,
    pub texture_bind_group: wgpu::BindGroup,
}

impl RaytracePass {
    pub fn new(
        ctx: &WgpuContext,
        buffers: &SceneBuffers,
        textures: &SceneTextures,
        uniform_buffer: &wgpu::Buffer,
        max_bounces: u32,
    ) -> Self {
        let shader = shader::compose(
            &ctx.device,
            "Raytrace Shader",
            &[shader::COMMON, shader::FULLSCREEN, shader::RAYTRACE],
        );

        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bgl0 = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Raytrace Scene Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Triangles / Transforms / Materials
                    storage_entry(1),
                    storage_entry(2),
                    storage_entry(3),
                ],
            });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bgl1 = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Raytrace Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    // Wall / Floor / Picture
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                ],
            });

        // 累積: out = src * (1/N) + dst * (1 - 1/N)
        let accumulate = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::Zero,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let constants = [("MAX_BOUNCES", max_bounces as f64)];
        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Raytrace Pipeline"),
                layout: Some(&ctx.device.create_pipeline_layout(
                    &wgpu::PipelineLayoutDescriptor {
                        label: None,
                        bind_group_layouts: &[&bgl0, &bgl1],
                        immediate_size: 0,
                    },
                )),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions {
                        constants: &constants,
                        ..Default::default()
                    },
                    targets: &[Some(color_target(HDR_FORMAT, Some(accumulate)))],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let scene_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raytrace Scene Bind Group"),
            layout: &bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.triangle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.material_buffer.as_entire_binding(),
                },
            ],
        });

        let texture_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raytrace Texture Bind Group"),
            layout: &bgl1,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(&textures.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&textures.wall.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&textures.floor.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&textures.picture.view),
                },
            ],
        });

        Self {
            pipeline,
            scene_bind_group,
            texture_bind_group,
        }
    }

    /// Draws into `target` without clearing it; the blend state does the
    /// averaging. On the first frame after a reset the weight is 1, so the
    /// previous contents are discarded.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Raytrace Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, Some(&self.scene_bind_group), &[]);
        rpass.set_bind_group(1, Some(&self.texture_bind_group), &[]);
        rpass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec4};
    use crate::config::AppConfig;

    fn camera() -> CameraMatrices {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, -1.0), Vec3::Y);
        let proj = Mat4::perspective_rh(1.57, 1.0, 0.1, 100.0);
        CameraMatrices {
            view,
            proj,
            inv_proj: proj.inverse(),
        }
    }

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<RaytraceUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<RaytraceUniform>(), 5 * 64 + 10 * 16 + 16);
        assert_eq!(std::mem::offset_of!(RaytraceUniform, frame_count), 480);
    }

    #[test]
    fn analytic_objects_are_moved_to_view_space() {
        let scene = AppConfig::default().analytic_scene();
        let u = RaytraceUniform::new(&camera(), &scene, 1, 64, 64);

        // eye (0,2,0) looking down -Z: world (0,4,4) is up 2 and behind 4
        assert!(
            Vec4::from_array(u.sphere_center)
                .abs_diff_eq(Vec4::new(0.0, 2.0, 4.0, 1.25), 1e-5)
        );

        let box_matrix = Mat4::from_cols_array_2d(&u.box_matrix);
        let box_center = box_matrix.transform_point3(Vec3::ZERO);
        assert!(box_center.abs_diff_eq(Vec3::new(3.0, -2.0, 0.0), 1e-5));

        let inv = Mat4::from_cols_array_2d(&u.inv_box_matrix);
        assert!((box_matrix * inv).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn light_faces_down_in_view_space() {
        let scene = AppConfig::default().analytic_scene();
        let u = RaytraceUniform::new(&camera(), &scene, 1, 64, 64);
        let lu = Vec3::from_slice(&u.light_u[..3]);
        let lv = Vec3::from_slice(&u.light_v[..3]);
        // camera is level, so view-space down is world down
        assert!(lu.cross(lv).normalize().abs_diff_eq(Vec3::NEG_Y, 1e-5));
        assert_eq!(u.light_color[3], scene.light.intensity);
    }

    #[test]
    fn frame_count_is_passed_through() {
        let scene = AppConfig::default().analytic_scene();
        let u = RaytraceUniform::new(&camera(), &scene, 7, 800, 600);
        assert_eq!((u.frame_count, u.width, u.height), (7, 800, 600));
        assert!(Mat4::from_cols_array_2d(&u.view).abs_diff_eq(camera().view, 1e-6));
    }
}
