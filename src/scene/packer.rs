use super::material::RaytracingMaterial;
use super::mesh::{MeshData, Triangle};
use glam::Mat4;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransformId(pub u32);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackError {
    #[error("triangle {triangle} references material {index} but only {count} materials exist")]
    MaterialOutOfRange {
        triangle: usize,
        index: u32,
        count: usize,
    },

    #[error("triangle {triangle} references transform {index} but only {count} transforms exist")]
    TransformOutOfRange {
        triangle: usize,
        index: u32,
        count: usize,
    },

    #[error("scene contains no triangles")]
    EmptyScene,

    #[error("{buffer} buffer needs {bytes} bytes but the device binds at most {max}")]
    BufferTooLarge {
        buffer: &'static str,
        bytes: u64,
        max: u64,
    },
}

/// The three parallel arrays the ray tracer reads: triangles, per-model
/// transforms and materials. Produced once per scene load.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedScene {
    pub triangles: Vec<Triangle>,
    pub transforms: Vec<[[f32; 4]; 4]>,
    pub materials: Vec<RaytracingMaterial>,
}

impl PackedScene {
    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    pub fn material_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    /// Each array must fit in a single storage binding on `limits`.
    pub fn check_limits(&self, limits: &wgpu::Limits) -> Result<(), PackError> {
        let max = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        for (buffer, bytes) in [
            ("triangle", self.triangle_bytes()),
            ("transform", self.transform_bytes()),
            ("material", self.material_bytes()),
        ] {
            let bytes = bytes.len() as u64;
            if bytes > max {
                return Err(PackError::BufferTooLarge { buffer, bytes, max });
            }
        }
        Ok(())
    }
}

/// Collects models and materials, then flattens them into a [`PackedScene`].
///
/// Each model gets its own transform slot. Triangles keep model insertion
/// order, so the packed sequence is the concatenation of the inputs.
#[derive(Default)]
pub struct ScenePacker {
    materials: Vec<RaytracingMaterial>,
    transforms: Vec<[[f32; 4]; 4]>,
    models: Vec<MeshData>,
}

impl ScenePacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, mut mat: RaytracingMaterial) -> MaterialId {
        let id = self.materials.len() as u32;
        mat.material_id = id;
        self.materials.push(mat);
        MaterialId(id)
    }

    pub fn add_model(
        &mut self,
        mut mesh: MeshData,
        material: MaterialId,
        transform: Mat4,
    ) -> TransformId {
        let id = self.transforms.len() as u32;
        self.transforms.push(transform.to_cols_array_2d());

        mesh.set_material_id(material.0);
        mesh.set_transform_id(id);
        self.models.push(mesh);

        TransformId(id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.models.iter().map(MeshData::len).sum()
    }

    pub fn pack(self) -> Result<PackedScene, PackError> {
        let mut triangles = Vec::with_capacity(self.triangle_count());
        for mesh in self.models {
            triangles.extend(mesh.into_triangles());
        }

        if triangles.is_empty() {
            return Err(PackError::EmptyScene);
        }

        let packed = PackedScene {
            triangles,
            transforms: self.transforms,
            materials: self.materials,
        };
        validate(&packed)?;

        log::debug!(
            "packed {} triangles, {} transforms, {} materials",
            packed.triangles.len(),
            packed.transforms.len(),
            packed.materials.len()
        );
        Ok(packed)
    }
}

/// Every triangle index must resolve into the other two arrays.
pub fn validate(scene: &PackedScene) -> Result<(), PackError> {
    for (i, tri) in scene.triangles.iter().enumerate() {
        if tri.material_id as usize >= scene.materials.len() {
            return Err(PackError::MaterialOutOfRange {
                triangle: i,
                index: tri.material_id,
                count: scene.materials.len(),
            });
        }
        if tri.transform_id as usize >= scene.transforms.len() {
            return Err(PackError::TransformOutOfRange {
                triangle: i,
                index: tri.transform_id,
                count: scene.transforms.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn mesh(n: usize, tag: f32) -> MeshData {
        let tri = Triangle::flat(
            [Vec3::splat(tag), Vec3::X + tag, Vec3::Y + tag],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
        );
        MeshData::new(vec![tri; n])
    }

    #[test]
    fn material_ids_match_slots() {
        let mut packer = ScenePacker::new();
        let a = packer.add_material(RaytracingMaterial {
            material_id: 9,
            ..Default::default()
        });
        let b = packer.add_material(RaytracingMaterial::default());
        assert_eq!((a, b), (MaterialId(0), MaterialId(1)));

        packer.add_model(mesh(1, 0.0), a, Mat4::IDENTITY);
        let packed = packer.pack().unwrap();
        assert_eq!(packed.materials[0].material_id, 0);
        assert_eq!(packed.materials[1].material_id, 1);
    }

    #[test]
    fn each_model_gets_own_transform_slot() {
        let mut packer = ScenePacker::new();
        let mat = packer.add_material(RaytracingMaterial::default());
        let t0 = packer.add_model(mesh(2, 0.0), mat, Mat4::IDENTITY);
        let t1 = packer.add_model(
            mesh(3, 1.0),
            mat,
            Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
        );
        assert_eq!((t0, t1), (TransformId(0), TransformId(1)));

        let packed = packer.pack().unwrap();
        assert_eq!(packed.transforms.len(), 2);
        assert_eq!(packed.transforms[1][3], [3.0, 0.0, 0.0, 1.0]);
        assert!(packed.triangles[..2].iter().all(|t| t.transform_id == 0));
        assert!(packed.triangles[2..].iter().all(|t| t.transform_id == 1));
    }

    #[test]
    fn oversized_triangle_buffer_is_rejected() {
        let mut packer = ScenePacker::new();
        let mat = packer.add_material(RaytracingMaterial::default());
        packer.add_model(mesh(4, 0.0), mat, Mat4::IDENTITY);
        let packed = packer.pack().unwrap();

        let tight = wgpu::Limits {
            max_storage_buffer_binding_size: 3 * 128,
            ..Default::default()
        };
        assert_eq!(
            packed.check_limits(&tight),
            Err(PackError::BufferTooLarge {
                buffer: "triangle",
                bytes: 4 * 128,
                max: 3 * 128
            })
        );
        assert_eq!(packed.check_limits(&wgpu::Limits::default()), Ok(()));
    }

    #[test]
    fn empty_scene_is_rejected() {
        let mut packer = ScenePacker::new();
        packer.add_material(RaytracingMaterial::default());
        assert_eq!(packer.pack(), Err(PackError::EmptyScene));
    }

    #[test]
    fn unknown_material_is_rejected() {
        let mut packer = ScenePacker::new();
        packer.add_material(RaytracingMaterial::default());
        packer.add_model(mesh(1, 0.0), MaterialId(4), Mat4::IDENTITY);
        assert_eq!(
            packer.pack(),
            Err(PackError::MaterialOutOfRange {
                triangle: 0,
                index: 4,
                count: 1
            })
        );
    }

    #[test]
    fn validate_catches_bad_transform_index() {
        let mut tri = mesh(1, 0.0).into_triangles();
        tri[0].transform_id = 2;
        let scene = PackedScene {
            triangles: tri,
            transforms: vec![Mat4::IDENTITY.to_cols_array_2d()],
            materials: vec![RaytracingMaterial::default()],
        };
        assert!(matches!(
            validate(&scene),
            Err(PackError::TransformOutOfRange { index: 2, .. })
        ));
    }
}
