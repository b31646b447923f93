//! Procedural stand-ins for the authored model.

use glam::Vec3;

use super::graph::{AssetOrigin, MeshPart, ModelAsset, SceneNode};
use super::primitives::{cone, cuboid, torus, uv_sphere};
use crate::core::Transform;
use crate::types::MaterialData;

const BODY: usize = 0;
const SKIN: usize = 1;
const EYE: usize = 2;
const RING: usize = 3;
const HAT: usize = 4;

/// Small character built from primitives: body, head, two eyes, a ring and a hat.
/// Used whenever the primary asset cannot be loaded.
pub fn fallback_character() -> ModelAsset {
    let materials = vec![
        MaterialData::rgb("body", [0.95, 0.55, 0.2]),
        MaterialData::rgb("skin", [0.98, 0.8, 0.6]),
        MaterialData::rgb("eye", [0.08, 0.08, 0.12]),
        MaterialData::rgb("ring", [1.0, 0.84, 0.0]),
        MaterialData::rgb("hat", [0.9, 0.3, 0.3]),
    ];

    let mut root = SceneNode::group("fallback", Transform::IDENTITY)
        .with_child(SceneNode::mesh(
            "body",
            Transform::from_position(Vec3::new(0.0, -0.6, 0.0)),
            MeshPart::new(cuboid(1.0, 1.2, 0.7), BODY),
        ))
        .with_child(SceneNode::mesh(
            "head",
            Transform::from_position(Vec3::new(0.0, 0.45, 0.0)),
            MeshPart::new(uv_sphere(0.55, 32, 16), SKIN),
        ))
        .with_child(SceneNode::mesh(
            "eye_left",
            Transform::from_position(Vec3::new(-0.2, 0.55, 0.48)),
            MeshPart::new(uv_sphere(0.09, 16, 8), EYE),
        ))
        .with_child(SceneNode::mesh(
            "eye_right",
            Transform::from_position(Vec3::new(0.2, 0.55, 0.48)),
            MeshPart::new(uv_sphere(0.09, 16, 8), EYE),
        ))
        .with_child(SceneNode::mesh(
            "ring",
            Transform::from_position(Vec3::new(0.0, 0.95, 0.0)),
            MeshPart::new(torus(0.45, 0.06, 12, 48), RING),
        ))
        .with_child(SceneNode::mesh(
            "hat",
            Transform::from_position(Vec3::new(0.0, 1.3, 0.0)),
            MeshPart::new(cone(0.4, 0.7, 32), HAT),
        ));
    root.enable_shadows();

    ModelAsset {
        origin: AssetOrigin::Fallback,
        root,
        materials,
    }
}

/// Single orange unit cube shown while the asset is loading
pub fn loading_placeholder() -> ModelAsset {
    ModelAsset {
        origin: AssetOrigin::Placeholder,
        root: SceneNode::mesh(
            "loading",
            Transform::IDENTITY,
            MeshPart::new(cuboid(1.0, 1.0, 1.0), 0),
        ),
        materials: vec![MaterialData::rgb("loading", [1.0, 0.65, 0.0])],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_fixed_parts() {
        let asset = fallback_character();
        assert!(asset.is_fallback());
        assert_eq!(asset.root.mesh_count(), 6);
        let names: Vec<&str> = asset.root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["body", "head", "eye_left", "eye_right", "ring", "hat"]);
    }

    #[test]
    fn fallback_materials_are_all_referenced() {
        let asset = fallback_character();
        let mut used = vec![false; asset.materials.len()];
        for child in &asset.root.children {
            let part = child.kind.mesh_part().expect("every fallback child is a mesh");
            used[part.material] = true;
        }
        assert!(used.into_iter().all(|u| u));
    }

    #[test]
    fn placeholder_is_one_cube() {
        let asset = loading_placeholder();
        assert_eq!(asset.origin, AssetOrigin::Placeholder);
        assert_eq!(asset.root.node_count(), 1);
        assert_eq!(asset.root.mesh_count(), 1);
        assert_eq!(asset.materials.len(), 1);
    }
}
