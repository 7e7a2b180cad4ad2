//! Node hierarchy of a loaded model
//!
//! A model is a tree of [`Node`]s. Any node may carry a [`Surface`]: that is
//! what makes it drawable. Loaders build the tree; the viewer owns it through a
//! [`ModelHandle`] and only ever mutates it in place.

use cgmath::{Matrix4, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use crate::config::Placement;
use crate::gfx::resources::material::SurfaceMaterial;

use super::mesh::MeshData;

/// Translation / rotation / scale of a node relative to its parent
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Rotation given as XYZ Euler angles in radians
    pub fn from_euler(translation: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        let rotation = Quaternion::from_angle_x(Rad(rotation[0]))
            * Quaternion::from_angle_y(Rad(rotation[1]))
            * Quaternion::from_angle_z(Rad(rotation[2]));
        Self {
            translation: translation.into(),
            rotation,
            scale: scale.into(),
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translation);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }
}

/// Drawable capability of a node
#[derive(Clone, Debug)]
pub struct Surface {
    pub mesh: MeshData,
    pub material: SurfaceMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Surface {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            material: SurfaceMaterial::default(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<Node>,
    pub surface: Option<Surface>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Collects every surface in this subtree, depth first
    pub fn collect_surfaces_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Surface>) {
        if let Some(surface) = self.surface.as_mut() {
            out.push(surface);
        }
        for child in self.children.iter_mut() {
            child.collect_surfaces_mut(out);
        }
    }

    /// Visits every surface with its world matrix, depth first.
    ///
    /// The visiting order matches [`Node::collect_surfaces_mut`].
    pub fn visit_surfaces<'a, F>(&'a self, parent: Matrix4<f32>, f: &mut F)
    where
        F: FnMut(&'a Surface, Matrix4<f32>),
    {
        let world = parent * self.transform.matrix();
        if let Some(surface) = &self.surface {
            f(surface, world);
        }
        for child in &self.children {
            child.visit_surfaces(world, f);
        }
    }

    pub fn surface_count(&self) -> usize {
        usize::from(self.surface.is_some())
            + self.children.iter().map(Node::surface_count).sum::<usize>()
    }
}

/// Exclusive ownership of the loaded model
#[derive(Clone, Debug)]
pub struct ModelHandle {
    root: Node,
}

impl ModelHandle {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Places the whole model in the world
    pub fn apply_placement(&mut self, placement: &Placement) {
        self.root.transform =
            Transform::from_euler(placement.position, placement.rotation, placement.scale);
    }

    pub fn surfaces_mut(&mut self) -> Vec<&mut Surface> {
        let mut surfaces = Vec::new();
        self.root.collect_surfaces_mut(&mut surfaces);
        surfaces
    }

    pub fn visit_surfaces<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Surface, Matrix4<f32>),
    {
        self.root.visit_surfaces(Matrix4::identity(), f);
    }

    pub fn surfaces(&self) -> Vec<&Surface> {
        let mut surfaces = Vec::new();
        self.visit_surfaces(&mut |surface, _| surfaces.push(surface));
        surfaces
    }

    pub fn surface_count(&self) -> usize {
        self.root.surface_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces()
            .iter()
            .map(|s| s.mesh.triangle_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    fn triangle() -> MeshData {
        MeshData::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[],
            vec![0, 1, 2],
        )
    }

    fn sample_tree() -> Node {
        let mut root = Node::new("root");
        let mut group = Node::new("group");
        group.add_child(Node::new("seat").with_surface(Surface::new(triangle())));
        group.add_child(Node::new("empty"));
        root.add_child(group);
        root.add_child(Node::new("legs").with_surface(Surface::new(triangle())));
        root
    }

    #[test]
    fn collects_only_drawable_nodes() {
        let mut model = ModelHandle::new(sample_tree());
        assert_eq!(model.surface_count(), 2);
        assert_eq!(model.surfaces_mut().len(), 2);
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn world_matrices_compose_parent_transforms() {
        let mut root = Node::new("root").with_transform(Transform::from_euler(
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [2.0, 2.0, 2.0],
        ));
        root.add_child(
            Node::new("child")
                .with_transform(Transform::from_euler([0.0, 1.0, 0.0], [0.0; 3], [1.0; 3]))
                .with_surface(Surface::new(triangle())),
        );

        let model = ModelHandle::new(root);
        let mut worlds = Vec::new();
        model.visit_surfaces(&mut |_, world| worlds.push(world));

        assert_eq!(worlds.len(), 1);
        let origin = worlds[0] * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.truncate() - Vector3::new(1.0, 2.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn placement_rotates_about_x_first() {
        let mut model = ModelHandle::new(Node::new("root"));
        model.apply_placement(&Placement {
            position: [-1.0, 2.4, -1.0],
            rotation: [-std::f32::consts::FRAC_PI_2, 0.0, 0.0],
            scale: [0.005, 0.005, 0.005],
        });

        // +Z in model space ends up pointing +Y in the world
        let m = model.root().transform.matrix();
        let up = m * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((up.truncate().normalize() - Vector3::unit_y()).magnitude() < 1e-5);
        assert!((m.w.truncate() - Vector3::new(-1.0, 2.4, -1.0)).magnitude() < 1e-6);
    }
}
