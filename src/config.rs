//! Start-up configuration.
//!
//! Everything has a default that reproduces the stock demo scene, so the
//! config file is optional and may be partial.

use crate::error::LoadError;
use crate::scene::{AnalyticScene, BoxParams, LightParams, RaytracingMaterial, SphereParams};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "RAYTRACE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub sphere: SphereConfig,
    #[serde(rename = "box")]
    pub cuboid: BoxConfig,
    pub light: LightConfig,
    pub textures: TextureConfig,
    pub materials: Vec<MaterialConfig>,
    /// Build the walls/floor/ceiling/picture room from procedural quads.
    pub room: bool,
    /// Extra models packed after the room, in order.
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub move_speed: f32,
    /// Radians per pixel of pointer motion.
    pub mouse_sensitivity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxConfig {
    pub transform: TransformConfig,
    pub size: [f32; 3],
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: [f32; 3],
    pub intensity: f32,
    pub size: [f32; 2],
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub wall: Option<PathBuf>,
    pub floor: Option<PathBuf>,
    pub picture: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub albedo: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub ior: f32,
    pub emissive: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub source: ModelSource,
    pub material: u32,
    #[serde(default)]
    pub transform: TransformConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Plane,
    Cube,
    Gltf(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub translation: [f32; 3],
    /// XYZ euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            sphere: SphereConfig::default(),
            cuboid: BoxConfig::default(),
            light: LightConfig::default(),
            textures: TextureConfig::default(),
            materials: default_materials(),
            room: true,
            models: Vec::new(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            title: "Ray-tracing demo".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 2.0, 0.0],
            target: [0.0, 2.3, -7.0],
            fov: 1.57,
            near: 0.1,
            far: 100.0,
            move_speed: 2.0,
            mouse_sensitivity: 0.003,
        }
    }
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 4.0, 4.0],
            radius: 1.25,
            color: [1.0, 1.0, 1.0],
            roughness: 0.0,
            metalness: 1.0,
        }
    }
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            transform: TransformConfig {
                translation: [3.0, 0.0, 0.0],
                ..Default::default()
            },
            size: [1.0, 1.0, 1.0],
            color: [1.0, 0.0, 0.0],
            roughness: 1.0,
            metalness: 0.5,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 4.0,
            size: [3.0, 3.0],
            height: crate::scene::scenes::FLOOR_Y + crate::scene::scenes::ROOM_HEIGHT - 0.01,
        }
    }
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            albedo: [1.0, 1.0, 1.0, 1.0],
            roughness: 1.0,
            metallic: 0.0,
            ior: 0.0,
            emissive: [0.0; 4],
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// 0: red glossy dielectric, 1: wall, 2: floor (mirror-like metal),
/// 3: picture.
pub fn default_materials() -> Vec<MaterialConfig> {
    vec![
        MaterialConfig {
            albedo: [1.0, 0.0, 0.0, 0.0],
            roughness: 0.5,
            metallic: 0.0,
            ior: 1.35,
            ..Default::default()
        },
        MaterialConfig {
            roughness: 1.0,
            ..Default::default()
        },
        MaterialConfig {
            roughness: 0.0,
            metallic: 1.0,
            ..Default::default()
        },
        MaterialConfig {
            roughness: 1.0,
            metallic: 0.0,
            ..Default::default()
        },
    ]
}

impl AppConfig {
    /// Config path from the first CLI argument, else from `RAYTRACE_CONFIG`.
    pub fn path_from_env() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .or_else(|| std::env::var_os(CONFIG_ENV))
            .map(PathBuf::from)
    }

    /// Defaults when `path` is `None`, otherwise the parsed file. Relative
    /// asset paths in the file are resolved against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self, LoadError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&text).map_err(|source| LoadError::Config {
                path: path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| LoadError::InvalidConfig {
                path: path.to_path_buf(),
                reason,
            })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::info!("loaded config {}", path.display());
        Ok(config)
    }

    /// Rejects values that would put NaN or infinity into the GPU uniform.
    pub fn validate(&self) -> Result<(), String> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if self.window.width == 0 || self.window.height == 0 {
            return Err(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            ));
        }

        let cam = &self.camera;
        if !(positive(cam.fov) && cam.fov < std::f32::consts::PI) {
            return Err(format!("camera.fov {} must lie in (0, pi)", cam.fov));
        }
        if !(positive(cam.near) && cam.far.is_finite() && cam.near < cam.far) {
            return Err(format!(
                "camera.near {} and camera.far {} need 0 < near < far",
                cam.near, cam.far
            ));
        }
        if Vec3::from(cam.eye) == Vec3::from(cam.target) {
            return Err("camera.eye and camera.target coincide".to_string());
        }

        if !positive(self.sphere.radius) {
            return Err(format!("sphere.radius {} must be positive", self.sphere.radius));
        }

        if !self.cuboid.size.iter().all(|&v| positive(v)) {
            return Err(format!("box.size {:?} must be positive", self.cuboid.size));
        }
        let det = self.cuboid.transform.matrix().determinant();
        if !det.is_finite() || det.abs() < f32::EPSILON {
            return Err(format!(
                "box.transform is not invertible (scale {:?})",
                self.cuboid.transform.scale
            ));
        }

        if !self.light.size.iter().all(|&v| positive(v)) {
            return Err(format!("light.size {:?} must be positive", self.light.size));
        }
        if !(self.light.intensity.is_finite() && self.light.intensity >= 0.0) {
            return Err(format!(
                "light.intensity {} must be non-negative",
                self.light.intensity
            ));
        }
        Ok(())
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for p in [
            &mut self.textures.wall,
            &mut self.textures.floor,
            &mut self.textures.picture,
        ]
        .into_iter()
        .flatten()
        {
            fix(p);
        }
        for model in &mut self.models {
            if let ModelSource::Gltf(p) = &mut model.source {
                fix(p);
            }
        }
    }

    pub fn raytracing_materials(&self) -> Vec<RaytracingMaterial> {
        self.materials.iter().map(MaterialConfig::to_gpu).collect()
    }

    pub fn analytic_scene(&self) -> AnalyticScene {
        AnalyticScene {
            sphere: SphereParams {
                center: Vec3::from(self.sphere.center),
                radius: self.sphere.radius,
                color: Vec3::from(self.sphere.color),
                roughness: self.sphere.roughness,
                metalness: self.sphere.metalness,
            },
            cuboid: BoxParams {
                transform: self.cuboid.transform.matrix(),
                size: Vec3::from(self.cuboid.size),
                color: Vec3::from(self.cuboid.color),
                roughness: self.cuboid.roughness,
                metalness: self.cuboid.metalness,
            },
            light: LightParams {
                color: Vec3::from(self.light.color),
                intensity: self.light.intensity,
                size: Vec2::from(self.light.size),
                height: self.light.height,
            },
        }
    }
}

impl MaterialConfig {
    pub fn to_gpu(&self) -> RaytracingMaterial {
        RaytracingMaterial::new(self.albedo)
            .roughness(self.roughness)
            .metallic(self.metallic)
            .ior(self.ior)
            .emissive(self.emissive)
    }
}

impl TransformConfig {
    pub fn matrix(&self) -> Mat4 {
        let [rx, ry, rz] = self.rotation.map(f32::to_radians);
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            Vec3::from(self.translation),
        )
    }
}
