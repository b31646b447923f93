use glam::Mat4;

use crate::core::{ResourceId, Viewport};
use crate::types::{CameraUniform, LightUniform, MaterialData, MeshData};

/// One mesh draw: uploaded geometry, uploaded material, world matrix
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub model: Mat4,
}

/// Everything a device needs to draw one frame of the stage
#[derive(Debug, Clone)]
pub struct DrawList {
    pub camera: CameraUniform,
    pub lights: LightUniform,
    pub clear_color: [f32; 3],
    pub items: Vec<DrawItem>,
}

/// Graphics backend behind the render surface.
///
/// Handles come from the stage's resource ledger; a device only has to map
/// them to its own allocations and free those when asked.
pub trait GraphicsDevice {
    /// Allocate the drawing context (render targets) for a viewport
    fn create_context(&mut self, id: ResourceId, viewport: Viewport) -> anyhow::Result<()>;

    /// Resize render targets to a new viewport
    fn resize(&mut self, viewport: Viewport);

    fn upload_geometry(&mut self, id: ResourceId, mesh: &MeshData) -> anyhow::Result<()>;

    fn upload_material(&mut self, id: ResourceId, material: &MaterialData) -> anyhow::Result<()>;

    /// Free whatever `id` refers to: geometry, material or context
    fn release(&mut self, id: ResourceId);

    /// Record and submit one frame
    fn draw(&mut self, list: &DrawList) -> anyhow::Result<()>;
}

/// Builds a fresh device each time the render surface mounts
pub trait DeviceFactory {
    type Device: GraphicsDevice;

    fn create_device(&mut self) -> anyhow::Result<Self::Device>;
}
