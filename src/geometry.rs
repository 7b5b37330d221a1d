use crate::scene::{MeshData, Triangle};
use glam::{Vec2, Vec3};
use rayon::prelude::*;

/// Indexed triangle list as it comes out of a mesh source, before it is
/// expanded into self-contained [`Triangle`] records.
#[derive(Clone, Debug, Default)]
pub struct IndexedMesh {
    pub positions: Vec<Vec3>,
    /// Per-vertex normals. Empty means "compute from faces".
    pub normals: Vec<Vec3>,
    /// Per-vertex UVs. Empty means zero UVs.
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    /// Expand into one record per triangle. Trailing indices that do not form
    /// a full triangle, and triangles referencing missing vertices, are skipped.
    pub fn triangulate(&self) -> MeshData {
        let vertex_count = self.positions.len();
        let has_normals = self.normals.len() == vertex_count;
        let has_uvs = self.uvs.len() == vertex_count;

        // par_chunks + collect keeps the input order
        let triangles: Vec<Triangle> = self
            .indices
            .par_chunks_exact(3)
            .filter_map(|idx| {
                let [a, b, c] = [idx[0] as usize, idx[1] as usize, idx[2] as usize];
                if a >= vertex_count || b >= vertex_count || c >= vertex_count {
                    return None;
                }
                let positions = [self.positions[a], self.positions[b], self.positions[c]];
                let uvs = if has_uvs {
                    [self.uvs[a], self.uvs[b], self.uvs[c]]
                } else {
                    [Vec2::ZERO; 3]
                };
                Some(if has_normals {
                    Triangle::new(
                        positions,
                        [self.normals[a], self.normals[b], self.normals[c]],
                        uvs,
                    )
                } else {
                    Triangle::flat(positions, uvs)
                })
            })
            .collect();

        MeshData::new(triangles)
    }
}

// --- 平面(Quad): 1x1, XZ平面, 中心0,0, 法線+Y ---
pub fn plane() -> IndexedMesh {
    IndexedMesh {
        positions: vec![
            Vec3::new(-0.5, 0.0, 0.5),  // 左手前
            Vec3::new(0.5, 0.0, 0.5),   // 右手前
            Vec3::new(-0.5, 0.0, -0.5), // 左奥
            Vec3::new(0.5, 0.0, -0.5),  // 右奥
        ],
        normals: vec![Vec3::Y; 4],
        uvs: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ],
        indices: vec![0, 1, 2, 2, 1, 3],
    }
}

// --- 立方体(Cube): 1x1x1, 中心0,0,0, 面ごとに頂点を分ける ---
pub fn cube() -> IndexedMesh {
    let sides: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ), // Front
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ), // Back
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ), // Top
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ), // Bottom
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ), // Right
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ), // Left
    ];
    let corner_uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut mesh = IndexedMesh::default();
    for (normal, corners) in sides {
        let base = mesh.positions.len() as u32;
        for (corner, uv) in corners.iter().zip(corner_uvs) {
            mesh.positions.push(Vec3::from(*corner));
            mesh.normals.push(Vec3::from(normal));
            mesh.uvs.push(uv);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_faces_up() {
        let mesh = plane().triangulate();
        assert_eq!(mesh.len(), 2);
        for tri in mesh.triangles() {
            let [a, b, c] = tri.positions();
            // winding agrees with the stored normal
            assert!((b - a).cross(c - a).dot(Vec3::Y) > 0.0);
            assert_eq!(tri.normal0, [0.0, 1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn cube_winding_matches_normals() {
        let mesh = cube().triangulate();
        assert_eq!(mesh.len(), 12);
        for tri in mesh.triangles() {
            let [a, b, c] = tri.positions();
            let n = Vec3::from_slice(&tri.normal0[..3]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn triangulate_preserves_order() {
        let mut mesh = cube();
        mesh.normals.clear();
        let a = mesh.triangulate();
        let b = mesh.triangulate();
        assert_eq!(a, b);
        assert_eq!(a.triangles()[0].positions()[0], Vec3::new(-0.5, -0.5, 0.5));
    }

    #[test]
    fn missing_normals_are_computed() {
        let mut mesh = plane();
        mesh.normals.clear();
        let tri = mesh.triangulate().triangles()[0];
        assert_eq!(tri.normal0, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let mut mesh = plane();
        mesh.indices.extend_from_slice(&[0, 1, 99, 3]);
        assert_eq!(mesh.indices.len() / 3, 3);
        assert_eq!(mesh.triangulate().len(), 2);
    }
}
