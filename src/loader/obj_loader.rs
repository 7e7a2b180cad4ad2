use std::io::Cursor;

use crate::error::LoadError;
use crate::gfx::scene::{
    mesh::MeshData,
    node::{Node, Surface},
};

/// Parses an OBJ file into one child node per object.
///
/// Materials are replaced by the catalog anyway, so `mtllib` references are not
/// followed.
pub fn parse_obj(bytes: &[u8]) -> Result<Node, LoadError> {
    let (models, _materials) = tobj::load_obj_buf(
        &mut Cursor::new(bytes),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|e| LoadError::Obj(e.to_string()))?;

    log::debug!("OBJ contains {} objects", models.len());

    let mut root = Node::new("model");
    for (i, model) in models.into_iter().enumerate() {
        let mesh = model.mesh;
        let data = MeshData::from_flat(&mesh.positions, &mesh.normals, mesh.indices);
        if data.is_empty() {
            log::warn!("Skipping empty OBJ object '{}'", model.name);
            continue;
        }

        let name = if model.name.is_empty() {
            format!("object_{i}")
        } else {
            model.name
        };
        root.add_child(Node::new(name).with_surface(Surface::new(data)));
    }

    Ok(root)
}
