use super::packer::{PackError, PackedScene};
use crate::wgpu_utils::create_buffer_init;

/// The three storage buffers the ray tracer reads. Written once at
/// creation and never resized or updated afterwards.
pub struct SceneBuffers {
    pub triangle_buffer: wgpu::Buffer,
    pub transform_buffer: wgpu::Buffer,
    pub material_buffer: wgpu::Buffer,
    pub triangle_count: u32,
}

impl SceneBuffers {
    pub fn upload(device: &wgpu::Device, scene: &PackedScene) -> Result<Self, PackError> {
        scene.check_limits(&device.limits())?;

        let triangle_buffer = create_buffer_init(
            device,
            "Triangle Buffer",
            &scene.triangles,
            wgpu::BufferUsages::STORAGE,
        );
        let transform_buffer = create_buffer_init(
            device,
            "Transform Buffer",
            &scene.transforms,
            wgpu::BufferUsages::STORAGE,
        );
        let material_buffer = create_buffer_init(
            device,
            "Material Buffer",
            &scene.materials,
            wgpu::BufferUsages::STORAGE,
        );

        log::info!(
            "uploaded scene: {} triangles ({} KiB), {} transforms, {} materials",
            scene.triangles.len(),
            scene.triangle_bytes().len() / 1024,
            scene.transforms.len(),
            scene.materials.len()
        );

        Ok(Self {
            triangle_buffer,
            transform_buffer,
            material_buffer,
            triangle_count: scene.triangles.len() as u32,
        })
    }
}
