pub mod loader;
pub mod material;
pub mod mesh;
pub mod packer;
pub mod resources;
pub mod scenes;
pub mod texture;

pub use material::RaytracingMaterial;
pub use mesh::{MeshData, Triangle};
pub use packer::{MaterialId, PackError, PackedScene, ScenePacker, TransformId};
pub use resources::SceneBuffers;
pub use texture::SceneTextures;

// 解析的に扱うオブジェクト (球・箱・面光源) はストレージバッファではなく
// uniform で毎フレーム送る
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticScene {
    pub sphere: SphereParams,
    pub cuboid: BoxParams,
    pub light: LightParams,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SphereParams {
    pub center: glam::Vec3,
    pub radius: f32,
    pub color: glam::Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoxParams {
    pub transform: glam::Mat4,
    pub size: glam::Vec3,
    pub color: glam::Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightParams {
    pub color: glam::Vec3,
    pub intensity: f32,
    /// Extent of the rectangular ceiling light.
    pub size: glam::Vec2,
    /// Height of the light plane in world space.
    pub height: f32,
}
