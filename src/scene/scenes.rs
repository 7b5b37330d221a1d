use super::loader::load_model;
use super::{MaterialId, PackedScene, ScenePacker};
use crate::config::{AppConfig, ModelSource};
use crate::geometry;
use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

pub const ROOM_HALF_WIDTH: f32 = 6.0;
pub const ROOM_HALF_DEPTH: f32 = 8.0;
pub const ROOM_HEIGHT: f32 = 6.0;
pub const FLOOR_Y: f32 = -0.5;

pub const WALL_MATERIAL: u32 = 1;
pub const FLOOR_MATERIAL: u32 = 2;
pub const PICTURE_MATERIAL: u32 = 3;

/// Load every model named by the config, assign transforms and materials,
/// and flatten the result into the three GPU arrays.
pub fn build_scene(config: &AppConfig) -> Result<PackedScene> {
    let mut packer = ScenePacker::new();

    for mat in config.raytracing_materials() {
        packer.add_material(mat);
    }

    if config.room {
        add_room(&mut packer);
    }

    for model in &config.models {
        let mesh = match &model.source {
            ModelSource::Plane => geometry::plane().triangulate(),
            ModelSource::Cube => geometry::cube().triangulate(),
            ModelSource::Gltf(path) => {
                load_model(path).with_context(|| format!("loading model {}", path.display()))?
            }
        };
        packer.add_model(mesh, MaterialId(model.material), model.transform.matrix());
    }

    log::info!(
        "scene: {} models, {} triangles, {} materials",
        packer.model_count(),
        packer.triangle_count(),
        packer.material_count()
    );

    packer.pack().context("packing scene")
}

// 部屋: 四方の壁・天井・床・絵 (それぞれ別のモデルとして変換スロットを持つ)
fn add_room(packer: &mut ScenePacker) {
    let quad = || geometry::plane().triangulate();
    let mid_y = FLOOR_Y + ROOM_HEIGHT * 0.5;
    let width = ROOM_HALF_WIDTH * 2.0;
    let depth = ROOM_HALF_DEPTH * 2.0;

    // 平面は+Yを向いているので、内側を向くように回転させる
    let walls: [(Vec3, Quat, Vec3); 4] = [
        // East (+X), normal -X
        (
            Vec3::new(ROOM_HALF_WIDTH, mid_y, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::new(ROOM_HEIGHT, 1.0, depth),
        ),
        // West (-X), normal +X
        (
            Vec3::new(-ROOM_HALF_WIDTH, mid_y, 0.0),
            Quat::from_rotation_z(-FRAC_PI_2),
            Vec3::new(ROOM_HEIGHT, 1.0, depth),
        ),
        // South (+Z), normal -Z
        (
            Vec3::new(0.0, mid_y, ROOM_HALF_DEPTH),
            Quat::from_rotation_x(-FRAC_PI_2),
            Vec3::new(width, 1.0, ROOM_HEIGHT),
        ),
        // North (-Z), normal +Z
        (
            Vec3::new(0.0, mid_y, -ROOM_HALF_DEPTH),
            Quat::from_rotation_x(FRAC_PI_2),
            Vec3::new(width, 1.0, ROOM_HEIGHT),
        ),
    ];
    for (translation, rotation, scale) in walls {
        packer.add_model(
            quad(),
            MaterialId(WALL_MATERIAL),
            Mat4::from_scale_rotation_translation(scale, rotation, translation),
        );
    }

    // Ceiling, facing down
    packer.add_model(
        quad(),
        MaterialId(WALL_MATERIAL),
        Mat4::from_translation(Vec3::new(0.0, FLOOR_Y + ROOM_HEIGHT, 0.0))
            * Mat4::from_rotation_x(PI)
            * Mat4::from_scale(Vec3::new(width, 1.0, depth)),
    );

    // Floor
    packer.add_model(
        quad(),
        MaterialId(FLOOR_MATERIAL),
        Mat4::from_translation(Vec3::new(0.0, FLOOR_Y, 0.0))
            * Mat4::from_scale(Vec3::new(width, 1.0, depth)),
    );

    // Picture on the north wall, just in front of it
    packer.add_model(
        quad(),
        MaterialId(PICTURE_MATERIAL),
        Mat4::from_translation(Vec3::new(0.0, mid_y, -ROOM_HALF_DEPTH + 0.01))
            * Mat4::from_rotation_x(FRAC_PI_2)
            * Mat4::from_scale(Vec3::new(3.0, 1.0, 4.0)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_only() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn default_room_packs_seven_models() {
        let scene = build_scene(&room_only()).unwrap();
        assert_eq!(scene.transforms.len(), 7);
        assert_eq!(scene.triangles.len(), 14);
        assert_eq!(scene.materials.len(), 4);
    }

    #[test]
    fn walls_face_into_the_room() {
        let scene = build_scene(&room_only()).unwrap();
        for tri in &scene.triangles {
            let m = Mat4::from_cols_array_2d(&scene.transforms[tri.transform_id as usize]);
            let center = tri.positions().iter().fold(Vec3::ZERO, |acc, p| acc + *p) / 3.0;
            let world = m.transform_point3(center);
            let normal = m
                .inverse()
                .transpose()
                .transform_vector3(Vec3::from_slice(&tri.normal0[..3]));
            let room_center = Vec3::new(0.0, FLOOR_Y + ROOM_HEIGHT * 0.5, 0.0);
            assert!(
                normal.dot(room_center - world) > 0.0,
                "triangle on transform {} faces outwards",
                tri.transform_id
            );
        }
    }

    #[test]
    fn picture_uses_picture_material() {
        let scene = build_scene(&room_only()).unwrap();
        let last = scene.triangles.last().unwrap();
        assert_eq!(last.material_id, PICTURE_MATERIAL);
        assert_eq!(last.transform_id, 6);
    }

    #[test]
    fn bad_model_material_fails_packing() {
        let mut config = room_only();
        config.models.push(crate::config::ModelConfig {
            source: ModelSource::Cube,
            material: 42,
            transform: Default::default(),
        });
        assert!(build_scene(&config).is_err());
    }

    #[test]
    fn missing_gltf_fails_with_context() {
        let mut config = room_only();
        config.models.push(crate::config::ModelConfig {
            source: ModelSource::Gltf("nope/missing.gltf".into()),
            material: 0,
            transform: Default::default(),
        });
        let err = build_scene(&config).unwrap_err();
        assert!(format!("{err:#}").contains("missing.gltf"));
    }
}
