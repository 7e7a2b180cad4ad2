use std::path::Path;

use cgmath::Quaternion;

use crate::error::LoadError;
use crate::gfx::scene::{
    mesh::MeshData,
    node::{Node, Surface, Transform},
};

/// Parses a glTF (JSON or binary) document.
///
/// External buffers are resolved relative to `base_dir`. The default scene is
/// used, falling back to the first one.
pub fn parse_gltf(bytes: &[u8], base_dir: &Path) -> Result<Node, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::Gltf(e.to_string()))?;
    let buffers = gltf::import_buffers(&gltf.document, Some(base_dir), gltf.blob)
        .map_err(|e| LoadError::Gltf(e.to_string()))?;

    let document = &gltf.document;
    log::debug!(
        "glTF document: {} scenes, {} meshes, {} nodes",
        document.scenes().len(),
        document.meshes().len(),
        document.nodes().len()
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::EmptyModel)?;

    let mut root = Node::new(scene.name().unwrap_or("model"));
    for node in scene.nodes() {
        root.add_child(convert_node(&node, &buffers)?);
    }
    Ok(root)
}

fn convert_node(node: &gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> Result<Node, LoadError> {
    let (translation, [x, y, z, w], scale) = node.transform().decomposed();
    let transform = Transform {
        translation: translation.into(),
        rotation: Quaternion::new(w, x, y, z),
        scale: scale.into(),
    };

    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let mut out = Node::new(name).with_transform(transform);

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("mesh");
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping {:?} primitive in mesh '{mesh_name}'",
                    primitive.mode()
                );
                continue;
            }

            let data = extract_primitive(&primitive, buffers)?;
            if data.is_empty() {
                continue;
            }
            let child = Node::new(format!("{mesh_name}.{}", primitive.index()));
            out.add_child(child.with_surface(Surface::new(data)));
        }
    }

    for child in node.children() {
        out.add_child(convert_node(&child, buffers)?);
    }
    Ok(out)
}

fn extract_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, LoadError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<f32> = reader
        .read_positions()
        .ok_or_else(|| LoadError::Gltf("primitive missing positions".into()))?
        .flatten()
        .collect();

    let normals: Vec<f32> = reader
        .read_normals()
        .map(|iter| iter.flatten().collect())
        .unwrap_or_default();

    // Non-indexed primitives draw their vertices in order
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..(positions.len() / 3) as u32).collect(),
    };

    Ok(MeshData::from_flat(&positions, &normals, indices))
}
