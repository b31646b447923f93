use std::collections::HashSet;
use std::path::Path;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::core::Transform;
use crate::error::LoadError;
use crate::scenes::{AssetOrigin, MeshPart, ModelAsset, NodeKind, SceneNode};
use crate::types::{MaterialData, MeshData, TextureData, Vertex};

/// Loads a glTF/GLB file into a scene tree wrapped in a node carrying `base`.
///
/// Skinned meshes are posed on the CPU with the skeleton's rest transforms and
/// placed directly under the wrapper, since glTF ignores a skinned node's own
/// transform. Meshes get shadow casting and receiving enabled.
pub fn load_model(path: &Path, base: &Transform) -> Result<ModelAsset, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }

    log::info!("Loading glTF file: {}", path.display());
    let (doc, buffers, images) =
        gltf::import(path).map_err(|e| LoadError::from_gltf(path.to_path_buf(), e))?;

    log::debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes, {} skins, {} materials, {} images",
        doc.scenes().count(),
        doc.nodes().count(),
        doc.meshes().count(),
        doc.skins().count(),
        doc.materials().count(),
        images.len()
    );

    let materials = load_materials(&doc, &images);
    let default_material = materials.len().saturating_sub(1);

    let joints: HashSet<usize> = doc
        .skins()
        .flat_map(|skin| skin.joints().map(|j| j.index()).collect::<Vec<_>>())
        .collect();

    let scene = doc
        .default_scene()
        .or_else(|| doc.scenes().next())
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;

    // Rest-pose scene-space matrices for every node, needed to pose skins
    let mut globals = vec![Mat4::IDENTITY; doc.nodes().count()];
    for node in scene.nodes() {
        collect_globals(&node, Mat4::IDENTITY, &mut globals);
    }

    let mut ctx = BuildContext {
        buffers: &buffers,
        globals: &globals,
        joints: &joints,
        default_material,
        skinned: Vec::new(),
    };

    let mut root = SceneNode::group("model", *base);
    for node in scene.nodes() {
        if let Some(built) = build_node(&node, &mut ctx) {
            root.children.push(built);
        }
    }
    root.children.append(&mut ctx.skinned);

    if root.mesh_count() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    root.enable_shadows();

    log::info!(
        "Model ready: {} nodes, {} meshes, {} materials",
        root.node_count(),
        root.mesh_count(),
        materials.len()
    );

    Ok(ModelAsset {
        origin: AssetOrigin::Primary(path.to_path_buf()),
        root,
        materials,
    })
}

struct BuildContext<'a> {
    buffers: &'a [gltf::buffer::Data],
    globals: &'a [Mat4],
    joints: &'a HashSet<usize>,
    default_material: usize,
    skinned: Vec<SceneNode>,
}

fn node_transform(node: &gltf::Node) -> Transform {
    let (t, r, s) = node.transform().decomposed();
    let (x, y, z) = Quat::from_array(r).to_euler(EulerRot::XYZ);
    Transform {
        position: Vec3::from_array(t),
        rotation: Vec3::new(x, y, z),
        scale: Vec3::from_array(s),
    }
}

fn collect_globals(node: &gltf::Node, parent: Mat4, globals: &mut [Mat4]) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    globals[node.index()] = world;
    for child in node.children() {
        collect_globals(&child, world, globals);
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

/// Returns None for empty leaves (no mesh, no children, not a joint)
fn build_node(node: &gltf::Node, ctx: &mut BuildContext) -> Option<SceneNode> {
    let name = node_name(node);

    if let (Some(mesh), Some(skin)) = (node.mesh(), node.skin()) {
        let joint_count = skin.joints().count();
        for (i, part) in read_skinned_parts(&mesh, &skin, node, ctx).into_iter().enumerate() {
            ctx.skinned.push(SceneNode {
                name: format!("{}_{}", name, i),
                transform: Transform::IDENTITY,
                kind: NodeKind::SkinnedMesh {
                    part,
                    joints: joint_count,
                },
                children: Vec::new(),
            });
        }
    }

    let kind = if ctx.joints.contains(&node.index()) {
        NodeKind::Joint
    } else {
        NodeKind::Group
    };

    let mut built = SceneNode {
        name: name.clone(),
        transform: node_transform(node),
        kind,
        children: Vec::new(),
    };

    if let (Some(mesh), None) = (node.mesh(), node.skin()) {
        let mut parts = read_rigid_parts(&mesh, ctx);
        if parts.len() == 1 && built.kind == NodeKind::Group {
            built.kind = NodeKind::Mesh(parts.remove(0));
        } else {
            for (i, part) in parts.into_iter().enumerate() {
                built.children.push(SceneNode::mesh(
                    format!("{}_{}", name, i),
                    Transform::IDENTITY,
                    part,
                ));
            }
        }
    }

    for child in node.children() {
        if let Some(child) = build_node(&child, ctx) {
            built.children.push(child);
        }
    }

    let keep = built.kind != NodeKind::Group || !built.children.is_empty();
    keep.then_some(built)
}

fn material_index(primitive: &gltf::Primitive, default_material: usize) -> usize {
    primitive.material().index().unwrap_or(default_material)
}

fn read_indices(reader_indices: Option<gltf::mesh::util::ReadIndices>, vertex_count: usize) -> Vec<u32> {
    match reader_indices {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertex_count as u32).collect(),
    }
}

fn read_rigid_parts(mesh: &gltf::Mesh, ctx: &BuildContext) -> Vec<MeshPart> {
    let mut parts = Vec::new();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|b| ctx.buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping primitive without positions in mesh {:?}", mesh.name());
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|n| n.collect())
            .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().collect())
            .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex::new(*p, normals[i], uvs[i]))
            .collect();
        let indices = read_indices(reader.read_indices(), positions.len());
        let data = MeshData::new(vertices, indices);
        if !data.is_empty() {
            parts.push(MeshPart::new(data, material_index(&primitive, ctx.default_material)));
        }
    }
    parts
}

fn read_skinned_parts(
    mesh: &gltf::Mesh,
    skin: &gltf::Skin,
    node: &gltf::Node,
    ctx: &BuildContext,
) -> Vec<MeshPart> {
    let joint_nodes: Vec<usize> = skin.joints().map(|j| j.index()).collect();
    let inverse_binds: Vec<Mat4> = skin
        .reader(|b| ctx.buffers.get(b.index()).map(|d| d.0.as_slice()))
        .read_inverse_bind_matrices()
        .map(|m| m.map(|c| Mat4::from_cols_array_2d(&c)).collect())
        .unwrap_or_else(|| vec![Mat4::IDENTITY; joint_nodes.len()]);

    let skin_matrices: Vec<Mat4> = joint_nodes
        .iter()
        .enumerate()
        .map(|(i, &joint)| {
            ctx.globals[joint] * inverse_binds.get(i).copied().unwrap_or(Mat4::IDENTITY)
        })
        .collect();
    let node_world = ctx.globals[node.index()];

    let mut parts = Vec::new();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|b| ctx.buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let count = positions.len();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|n| n.collect())
            .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; count]);
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().collect())
            .unwrap_or_else(|| vec![[0.0, 0.0]; count]);
        let joints: Vec<[u16; 4]> = reader
            .read_joints(0)
            .map(|j| j.into_u16().collect())
            .unwrap_or_else(|| vec![[0; 4]; count]);
        let weights: Vec<[f32; 4]> = reader
            .read_weights(0)
            .map(|w| w.into_f32().collect())
            .unwrap_or_else(|| vec![[0.0; 4]; count]);

        let vertices = (0..count)
            .map(|i| {
                let skin = blend_matrix(&skin_matrices, joints[i], weights[i]).unwrap_or(node_world);
                let position = skin.transform_point3(Vec3::from_array(positions[i]));
                let normal = skin
                    .transform_vector3(Vec3::from_array(normals[i]))
                    .normalize_or_zero();
                Vertex::new(position.to_array(), normal.to_array(), uvs[i])
            })
            .collect();
        let indices = read_indices(reader.read_indices(), count);
        let data = MeshData::new(vertices, indices);
        if !data.is_empty() {
            parts.push(MeshPart::new(data, material_index(&primitive, ctx.default_material)));
        }
    }
    parts
}

/// Weighted sum of joint matrices; None when the weights are all zero
fn blend_matrix(skin_matrices: &[Mat4], joints: [u16; 4], weights: [f32; 4]) -> Option<Mat4> {
    let total: f32 = weights.iter().sum();
    if total <= f32::EPSILON {
        return None;
    }
    let mut blended = Mat4::ZERO;
    for (joint, weight) in joints.iter().zip(weights) {
        if weight <= 0.0 {
            continue;
        }
        let matrix = skin_matrices.get(*joint as usize).copied().unwrap_or(Mat4::IDENTITY);
        blended += matrix * (weight / total);
    }
    Some(blended)
}

/// Materials in document order plus a trailing neutral default
fn load_materials(doc: &gltf::Document, images: &[gltf::image::Data]) -> Vec<MaterialData> {
    let mut materials: Vec<MaterialData> = doc
        .materials()
        .enumerate()
        .map(|(i, material)| {
            let name = material
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("material_{}", i));
            let pbr = material.pbr_metallic_roughness();
            let base_color = pbr.base_color_factor();
            let texture = pbr
                .base_color_texture()
                .and_then(|info| images.get(info.texture().source().index()))
                .map(to_rgba);
            match texture {
                Some(texture) => {
                    log::debug!("Material {} uses a {}x{} texture", name, texture.width, texture.height);
                    MaterialData::new_textured(name, base_color, texture)
                }
                None => MaterialData::new_color(name, base_color),
            }
        })
        .collect();
    materials.push(MaterialData::new_color("default", [0.7, 0.7, 0.7, 1.0]));
    materials
}

/// Expand a decoded glTF image to RGBA8
pub fn to_rgba(image: &gltf::image::Data) -> TextureData {
    use gltf::image::Format;

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        other => {
            log::warn!("Unsupported texture format {:?}, using white", other);
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    TextureData {
        width: image.width,
        height: image.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_model(Path::new("definitely/not/here.glb"), &Transform::IDENTITY).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_garbage_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("showcase-garbage-{}.glb", std::process::id()));
        std::fs::write(&path, b"not a gltf file").unwrap();
        let err = load_model(&path, &Transform::IDENTITY).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LoadError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_blend_matrix_normalises_weights() {
        let a = Mat4::from_translation(Vec3::X);
        let b = Mat4::from_translation(Vec3::Y);
        let m = blend_matrix(&[a, b], [0, 1, 0, 0], [1.0, 1.0, 0.0, 0.0]).unwrap();
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_blend_matrix_without_weights() {
        assert!(blend_matrix(&[Mat4::IDENTITY], [0; 4], [0.0; 4]).is_none());
    }

    #[test]
    fn test_rgb_expands_to_rgba() {
        let image = gltf::image::Data {
            pixels: vec![1, 2, 3, 4, 5, 6],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        assert_eq!(to_rgba(&image).data, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
