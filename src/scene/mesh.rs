use glam::{Vec2, Vec3};

// 三角形1枚分のGPUデータ (128バイト, std430)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Triangle {
    pub v0: [f32; 4],
    pub v1: [f32; 4],
    pub v2: [f32; 4],

    pub normal0: [f32; 4],
    pub normal1: [f32; 4],
    pub normal2: [f32; 4],

    pub uv0: [f32; 2],
    pub uv1: [f32; 2],
    pub uv2: [f32; 2],

    pub material_id: u32,
    pub transform_id: u32,
}

impl Triangle {
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            v0: positions[0].extend(1.0).to_array(),
            v1: positions[1].extend(1.0).to_array(),
            v2: positions[2].extend(1.0).to_array(),
            normal0: normals[0].extend(0.0).to_array(),
            normal1: normals[1].extend(0.0).to_array(),
            normal2: normals[2].extend(0.0).to_array(),
            uv0: uvs[0].to_array(),
            uv1: uvs[1].to_array(),
            uv2: uvs[2].to_array(),
            material_id: 0,
            transform_id: 0,
        }
    }

    /// Flat-shaded triangle: every corner gets the geometric normal.
    pub fn flat(positions: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        let normal = face_normal(positions);
        Self::new(positions, [normal; 3], uvs)
    }

    pub fn positions(&self) -> [Vec3; 3] {
        [
            Vec3::from_slice(&self.v0[..3]),
            Vec3::from_slice(&self.v1[..3]),
            Vec3::from_slice(&self.v2[..3]),
        ]
    }
}

pub fn face_normal(p: [Vec3; 3]) -> Vec3 {
    (p[1] - p[0]).cross(p[2] - p[0]).normalize_or(Vec3::Y)
}

/// Triangle data for one loaded model, before it is assigned a slot in the
/// packed scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    triangles: Vec<Triangle>,
}

impl MeshData {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn set_material_id(&mut self, id: u32) {
        for tri in &mut self.triangles {
            tri.material_id = id;
        }
    }

    pub fn set_transform_id(&mut self, id: u32) {
        for tri in &mut self.triangles {
            tri.transform_id = id;
        }
    }

    pub fn extend(&mut self, other: MeshData) {
        self.triangles.extend(other.triangles);
    }
}
