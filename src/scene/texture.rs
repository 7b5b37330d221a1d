use crate::error::LoadError;
use crate::wgpu_utils::{checkerboard_texture_data, solid_texture_data};
use image::RgbaImage;
use std::path::Path;

pub const FALLBACK_TEXTURE_DIM: u32 = 512;

/// Decode an image file into RGBA8, flipped so that row 0 is the bottom of
/// the picture (UV origin bottom-left, as the meshes expect).
pub fn load_texture(path: impl AsRef<Path>) -> Result<RgbaImage, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.flipv().to_rgba8())
}

pub fn white_image() -> RgbaImage {
    let dim = FALLBACK_TEXTURE_DIM;
    RgbaImage::from_raw(dim, dim, solid_texture_data(dim, [255; 4]))
        .unwrap_or_else(|| RgbaImage::new(dim, dim))
}

pub fn checker_image(tiles: u32) -> RgbaImage {
    let dim = FALLBACK_TEXTURE_DIM;
    let data = checkerboard_texture_data(dim, tiles, [255, 255, 255, 255], [0, 0, 0, 255]);
    RgbaImage::from_raw(dim, dim, data)
        .unwrap_or_else(|| RgbaImage::new(dim, dim))
}

/// Load `path` if given, otherwise use `fallback`.
pub fn load_or(path: Option<&Path>, fallback: impl FnOnce() -> RgbaImage) -> Result<RgbaImage, LoadError> {
    match path {
        Some(p) => load_texture(p),
        None => Ok(fallback()),
    }
}

/// Both sides must fit `limits.max_texture_dimension_2d`.
pub fn check_texture_size(
    name: &str,
    img: &RgbaImage,
    limits: &wgpu::Limits,
) -> Result<(), LoadError> {
    let (width, height) = img.dimensions();
    let max = limits.max_texture_dimension_2d;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(LoadError::TextureTooLarge {
            name: name.to_string(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

pub struct SceneTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Wall, floor and picture textures, selected in the shader by material id
/// 1, 2 and 3 respectively.
pub struct SceneTextures {
    pub wall: SceneTexture,
    pub floor: SceneTexture,
    pub picture: SceneTexture,
    pub sampler: wgpu::Sampler,
}

impl SceneTextures {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        wall: &RgbaImage,
        floor: &RgbaImage,
        picture: &RgbaImage,
    ) -> Result<Self, LoadError> {
        let limits = device.limits();
        check_texture_size("wall", wall, &limits)?;
        check_texture_size("floor", floor, &limits)?;
        check_texture_size("picture", picture, &limits)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            wall: upload_image(device, queue, "Wall Texture", wall),
            floor: upload_image(device, queue, "Floor Texture", floor),
            picture: upload_image(device, queue, "Picture Texture", picture),
            sampler,
        })
    }
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    img: &RgbaImage,
) -> SceneTexture {
    let (width, height) = img.dimensions();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        img.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&Default::default());
    SceneTexture { texture, view }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_images_have_expected_size() {
        assert_eq!(white_image().dimensions(), (512, 512));
        let checker = checker_image(8);
        assert_eq!(checker.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(checker.get_pixel(64, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn load_or_uses_fallback_without_path() {
        let img = load_or(None, white_image).unwrap();
        assert_eq!(img.get_pixel(10, 10).0, [255; 4]);
    }

    #[test]
    fn texture_larger_than_device_limit_is_rejected() {
        let limits = wgpu::Limits {
            max_texture_dimension_2d: 256,
            ..Default::default()
        };
        let err = check_texture_size("floor", &checker_image(8), &limits).unwrap_err();
        assert!(matches!(
            err,
            LoadError::TextureTooLarge { width: 512, height: 512, max: 256, .. }
        ));
        assert!(err.to_string().contains("floor"));

        check_texture_size("picture", &RgbaImage::new(256, 16), &limits).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_texture("does/not/exist.png").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn texture_is_flipped_vertically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.png");
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let loaded = load_texture(&path).unwrap();
        assert_eq!(loaded.get_pixel(0, 1).0, [255, 0, 0, 255]);
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn garbage_file_is_a_texture_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            load_texture(&path),
            Err(LoadError::Texture { .. })
        ));
    }
}
