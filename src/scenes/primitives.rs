//! Procedural meshes for the placeholder and fallback models.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::types::{MeshData, Vertex};

/// Axis-aligned box centered at the origin. Each face has its own vertices for flat normals.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([ 0.0,  0.0,  1.0], [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([ 0.0,  0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([ 0.0,  1.0,  0.0], [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([ 0.0, -1.0,  0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
        ([ 1.0,  0.0,  0.0], [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0,  0.0,  0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(UVS) {
            vertices.push(Vertex::new(*corner, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    MeshData::new(vertices, indices)
}

/// UV sphere centered at the origin
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * TAU;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex::new((normal * radius).to_array(), normal.to_array(), [u, v]));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    MeshData::new(vertices, indices)
}

/// Torus lying in the XZ plane
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);

    for j in 0..=radial {
        let v = j as f32 / radial as f32;
        let phi = v * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32;
            let theta = u * TAU;
            let center = Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin());
            let position = Vec3::new(
                (radius + tube * phi.cos()) * theta.cos(),
                tube * phi.sin(),
                (radius + tube * phi.cos()) * theta.sin(),
            );
            let normal = (position - center).normalize_or_zero();
            vertices.push(Vertex::new(position.to_array(), normal.to_array(), [u, v]));
        }
    }

    let stride = tubular + 1;
    for j in 0..radial {
        for i in 0..tubular {
            let a = j * stride + i;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData::new(vertices, indices)
}

/// Cone with its base centered at `y = -height / 2` and apex at `y = height / 2`
pub fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = radius / height.max(f32::EPSILON);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side: one apex vertex per segment so normals stay smooth around the cone
    for seg in 0..segments {
        let t0 = seg as f32 / segments as f32 * TAU;
        let t1 = (seg + 1) as f32 / segments as f32 * TAU;
        let mid = (t0 + t1) * 0.5;
        let side_normal = |t: f32| Vec3::new(t.cos(), slope, t.sin()).normalize().to_array();

        let base = vertices.len() as u32;
        vertices.push(Vertex::new([0.0, half, 0.0], side_normal(mid), [0.5, 1.0]));
        vertices.push(Vertex::new(
            [radius * t0.cos(), -half, radius * t0.sin()],
            side_normal(t0),
            [seg as f32 / segments as f32, 0.0],
        ));
        vertices.push(Vertex::new(
            [radius * t1.cos(), -half, radius * t1.sin()],
            side_normal(t1),
            [(seg + 1) as f32 / segments as f32, 0.0],
        ));
        indices.extend_from_slice(&[base, base + 2, base + 1]);
    }

    // Base cap
    let center = vertices.len() as u32;
    vertices.push(Vertex::new([0.0, -half, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]));
    for seg in 0..=segments {
        let t = seg as f32 / segments as f32 * TAU;
        vertices.push(Vertex::new(
            [radius * t.cos(), -half, radius * t.sin()],
            [0.0, -1.0, 0.0],
            [0.5 + 0.5 * t.cos(), 0.5 + 0.5 * t.sin()],
        ));
    }
    for seg in 0..segments {
        let a = center + 1 + seg;
        indices.extend_from_slice(&[center, a, a + 1]);
    }
    MeshData::new(vertices, indices)
}
