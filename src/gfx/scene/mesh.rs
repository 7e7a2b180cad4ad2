//! CPU-side triangle meshes
//!
//! Meshes stay on the CPU as part of the node hierarchy; the render engine
//! uploads them once when the model is attached.

use super::vertex::Vertex3D;

/// Indexed triangle list
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Builds a mesh from flat position/normal arrays.
    ///
    /// Normals are computed from the faces when `normals` is empty or does not
    /// match the position count.
    pub fn from_flat(positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let computed;
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals
        } else {
            computed = Self::calculate_face_normals(positions, &indices);
            &computed
        };

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect();

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Averages the normals of every face touching a vertex
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; vertex_count * 3];

        let vertex = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

        for triangle in indices.chunks_exact(3) {
            let ids = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if ids.iter().any(|&i| i >= vertex_count) {
                continue;
            }

            let v0 = vertex(ids[0]);
            let v1 = vertex(ids[1]);
            let v2 = vertex(ids[2]);

            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            for &i in &ids {
                normals[i * 3] += face_normal[0];
                normals[i * 3 + 1] += face_normal[1];
                normals[i * 3 + 2] += face_normal[2];
            }
        }

        for n in normals.chunks_exact_mut(3) {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if length > 0.0 {
                n[0] /= length;
                n[1] /= length;
                n[2] /= length;
            } else {
                n[1] = 1.0;
            }
        }

        normals
    }
}
