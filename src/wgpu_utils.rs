use wgpu::util::DeviceExt;

pub fn create_buffer(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

pub fn create_buffer_init<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &[T],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage,
    })
}

/// RGBA8 pixels of a single color.
pub fn solid_texture_data(dim: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat((dim * dim) as usize)
}

/// RGBA8 checkerboard with `tiles` squares per side; the top-left square
/// uses `light`.
pub fn checkerboard_texture_data(dim: u32, tiles: u32, light: [u8; 4], dark: [u8; 4]) -> Vec<u8> {
    let tile_size = (dim / tiles.max(1)).max(1);
    let mut data = Vec::with_capacity((dim * dim * 4) as usize);
    for y in 0..dim {
        for x in 0..dim {
            let even = ((x / tile_size) + (y / tile_size)) % 2 == 0;
            data.extend_from_slice(if even { &light } else { &dark });
        }
    }
    data
}

/// Full-screen color target state, optionally with the accumulation blend.
pub fn color_target(
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    }
}
