use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::types::{CameraUniform, LightUniform};

/// Fixed perspective camera looking at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 6.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        let fov = self.fov_degrees.clamp(1.0, 179.0).to_radians();
        let near = self.near.max(1e-4);
        let far = self.far.max(near + 1e-3);
        Mat4::perspective_rh(fov, aspect.max(1e-4), near, far)
    }

    pub fn view_proj(&self, viewport: Viewport) -> Mat4 {
        self.projection(viewport.aspect()) * self.view()
    }

    pub fn to_uniform(&self, viewport: Viewport) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj(viewport).to_cols_array_2d(),
            position: self.position.to_array(),
            _pad: 0.0,
        }
    }
}

/// Ambient fill plus one directional and one point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRig {
    pub ambient: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_position: Vec3,
    pub directional_intensity: f32,
    pub point_position: Vec3,
    pub point_intensity: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0],
            ambient_intensity: 0.4,
            directional_position: Vec3::new(5.0, 5.0, 5.0),
            directional_intensity: 1.0,
            point_position: Vec3::new(-5.0, 5.0, 5.0),
            point_intensity: 0.5,
        }
    }
}

impl LightRig {
    pub fn to_uniform(&self) -> LightUniform {
        LightUniform {
            ambient: self.ambient,
            ambient_intensity: self.ambient_intensity,
            directional_position: self.directional_position.to_array(),
            directional_intensity: self.directional_intensity,
            point_position: self.point_position.to_array(),
            point_intensity: self.point_intensity,
        }
    }
}
