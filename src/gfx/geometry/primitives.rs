use crate::gfx::scene::{mesh::MeshData, vertex::Vertex3D};

/// Generate a plane in the XZ plane (horizontal in a Y-up coordinate system)
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `depth` - Depth of the plane (Z direction)
/// * `width_segments` - Number of subdivisions along width
/// * `depth_segments` - Number of subdivisions along depth
///
/// Returns a plane centered at the origin with normal pointing up (positive Y).
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> MeshData {
    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    let mut vertices = Vec::with_capacity(((w_segs + 1) * (d_segs + 1)) as usize);
    for z in 0..=d_segs {
        let pos_z = (z as f32 / d_segs as f32 - 0.5) * depth;
        for x in 0..=w_segs {
            let pos_x = (x as f32 / w_segs as f32 - 0.5) * width;
            vertices.push(Vertex3D {
                position: [pos_x, 0.0, pos_z],
                normal: [0.0, 1.0, 0.0],
            });
        }
    }

    // Counter-clockwise when viewed from above
    let mut indices = Vec::with_capacity((w_segs * d_segs * 6) as usize);
    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            indices.extend_from_slice(&[i, next_row, i + 1]);
            indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(20.0, 20.0, 32, 32);
        assert_eq!(plane.vertices.len(), 33 * 33);
        assert_eq!(plane.triangle_count(), 32 * 32 * 2);
        assert!(plane.vertices.iter().all(|v| v.position[1] == 0.0));

        let xs = plane.vertices.iter().map(|v| v.position[0]);
        let (min, max) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        assert_eq!((min, max), (-10.0, 10.0));
    }

    #[test]
    fn test_plane_faces_up() {
        let plane = generate_plane(2.0, 2.0, 1, 1);
        let normals = MeshData::calculate_face_normals(
            &plane
                .vertices
                .iter()
                .flat_map(|v| v.position)
                .collect::<Vec<_>>(),
            &plane.indices,
        );
        for n in normals.chunks_exact(3) {
            assert!(n[1] > 0.99, "{n:?}");
        }
    }

    #[test]
    fn test_zero_segments_still_produce_a_quad() {
        let plane = generate_plane(1.0, 1.0, 0, 0);
        assert_eq!(plane.triangle_count(), 2);
    }
}
