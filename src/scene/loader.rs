use crate::error::LoadError;
use crate::geometry::IndexedMesh;
use crate::scene::MeshData;
use glam::{Mat3, Mat4, Vec2, Vec3};
use gltf::mesh::util::ReadIndices;
use std::path::Path;

/// Import every triangle primitive of a glTF file as one mesh.
///
/// Node transforms are baked into the vertices, so the result lives in the
/// file's scene space; the per-model transform from the packer goes on top.
pub fn load_model(path: impl AsRef<Path>) -> Result<MeshData, LoadError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| LoadError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let mut mesh = MeshData::default();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                visit_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
        // シーン無しのファイル: メッシュをそのまま並べる
        None => {
            for m in document.meshes() {
                append_mesh(&m, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
    }

    if mesh.is_empty() {
        return Err(LoadError::EmptyModel(path.to_path_buf()));
    }

    log::info!("loaded {} ({} triangles)", path.display(), mesh.len());
    Ok(mesh)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshData,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(m) = node.mesh() {
        append_mesh(&m, world, buffers, out);
    }
    for child in node.children() {
        visit_node(&child, world, buffers, out);
    }
}

fn append_mesh(mesh: &gltf::Mesh, world: Mat4, buffers: &[gltf::buffer::Data], out: &mut MeshData) {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "skipping primitive {} of mesh {}: mode {:?}",
                primitive.index(),
                mesh.index(),
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = match reader.read_positions() {
            Some(iter) => iter
                .map(|p| world.transform_point3(Vec3::from(p)))
                .collect(),
            None => continue,
        };

        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| {
                iter.map(|n| (normal_matrix * Vec3::from(n)).normalize_or(Vec3::Y))
                    .collect()
            })
            .unwrap_or_default();

        let uvs: Vec<Vec2> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().map(Vec2::from).collect())
            .unwrap_or_default();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(ReadIndices::U8(iter)) => iter.map(u32::from).collect(),
            Some(ReadIndices::U16(iter)) => iter.map(u32::from).collect(),
            Some(ReadIndices::U32(iter)) => iter.collect(),
            // Non-indexed: generate sequential indices
            None => (0..positions.len() as u32).collect(),
        };

        let indexed = IndexedMesh {
            positions,
            normals,
            uvs,
            indices,
        };
        out.extend(indexed.triangulate());
    }
}
