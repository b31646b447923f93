use std::path::PathBuf;

use glam::Mat4;

use crate::core::Transform;
use crate::types::{MaterialData, MeshData};

/// Drawable payload of a mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub mesh: MeshData,
    /// Index into the owning asset's material list
    pub material: usize,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshPart {
    pub fn new(mesh: MeshData, material: usize) -> Self {
        Self {
            mesh,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// What a node is, known from its tag rather than inspected structurally
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Joint,
    Mesh(MeshPart),
    SkinnedMesh { part: MeshPart, joints: usize },
}

impl NodeKind {
    pub fn mesh_part(&self) -> Option<&MeshPart> {
        match self {
            NodeKind::Mesh(part) | NodeKind::SkinnedMesh { part, .. } => Some(part),
            NodeKind::Group | NodeKind::Joint => None,
        }
    }

    fn mesh_part_mut(&mut self) -> Option<&mut MeshPart> {
        match self {
            NodeKind::Mesh(part) | NodeKind::SkinnedMesh { part, .. } => Some(part),
            NodeKind::Group | NodeKind::Joint => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, transform: Transform, part: MeshPart) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Mesh(part),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first visit with each node's transform relative to this node's parent
    pub fn visit<'a>(&'a self, parent: Mat4, f: &mut dyn FnMut(&'a SceneNode, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    pub fn mesh_count(&self) -> usize {
        let own = usize::from(self.kind.mesh_part().is_some());
        own + self.children.iter().map(SceneNode::mesh_count).sum::<usize>()
    }

    /// Turn on shadow casting and receiving on every mesh below this node
    pub fn enable_shadows(&mut self) {
        if let Some(part) = self.kind.mesh_part_mut() {
            part.cast_shadow = true;
            part.receive_shadow = true;
        }
        for child in &mut self.children {
            child.enable_shadows();
        }
    }
}

/// Where an asset's geometry came from
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOrigin {
    /// The authored model file
    Primary(PathBuf),
    /// Procedural stand-in after a failed load
    Fallback,
    /// Shown while the load is pending
    Placeholder,
}

impl AssetOrigin {
    pub fn label(&self) -> String {
        match self {
            AssetOrigin::Primary(path) => path.display().to_string(),
            AssetOrigin::Fallback => "fallback".to_string(),
            AssetOrigin::Placeholder => "placeholder".to_string(),
        }
    }
}

/// A scene-graph subtree plus the materials its meshes reference
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub origin: AssetOrigin,
    pub root: SceneNode,
    pub materials: Vec<MaterialData>,
}

impl ModelAsset {
    pub fn is_fallback(&self) -> bool {
        self.origin == AssetOrigin::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vertex;
    use glam::Vec3;

    fn tri() -> MeshData {
        MeshData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2],
        )
    }

    fn sample_tree() -> SceneNode {
        SceneNode::group("root", Transform::from_position(Vec3::X))
            .with_child(SceneNode::mesh("a", Transform::IDENTITY, MeshPart::new(tri(), 0)))
            .with_child(
                SceneNode::group("inner", Transform::from_position(Vec3::Y)).with_child(SceneNode {
                    name: "skinned".into(),
                    transform: Transform::IDENTITY,
                    kind: NodeKind::SkinnedMesh {
                        part: MeshPart::new(tri(), 0),
                        joints: 4,
                    },
                    children: vec![SceneNode {
                        name: "joint".into(),
                        transform: Transform::IDENTITY,
                        kind: NodeKind::Joint,
                        children: vec![],
                    }],
                }),
            )
    }

    #[test]
    fn counts_nodes_and_meshes() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.mesh_count(), 2);
    }

    #[test]
    fn shadows_only_touch_meshes() {
        let mut tree = sample_tree();
        tree.enable_shadows();
        let mut flagged = 0;
        tree.visit(Mat4::IDENTITY, &mut |node, _| {
            if let Some(part) = node.kind.mesh_part() {
                assert!(part.cast_shadow && part.receive_shadow);
                flagged += 1;
            }
        });
        assert_eq!(flagged, 2);
    }

    #[test]
    fn visit_accumulates_transforms() {
        let tree = sample_tree();
        let mut skinned_world = None;
        tree.visit(Mat4::IDENTITY, &mut |node, world| {
            if node.name == "skinned" {
                skinned_world = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        assert_eq!(skinned_world, Some(Vec3::new(1.0, 1.0, 0.0)));
    }
}
