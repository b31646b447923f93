//! The 3D stage: rendering context, attached model and animated root.
//!
//! A stage only exists while full motion is allowed. It owns every GPU
//! resource it creates and releases all of them exactly once in
//! [`Stage::dispose`], which `Drop` also calls.

use anyhow::{Context, Result};
use glam::Mat4;

use super::animation::AnimationStep;
use super::resources::{ResourceId, ResourceKind, SharedLedger};
use super::transform::Transform;
use super::viewport::Viewport;
use crate::camera::{Camera, LightRig};
use crate::config::ShowcaseConfig;
use crate::frame::FrameInfo;
use crate::loaders::{LoadTicket, Resolution};
use crate::scenes::{loading_placeholder, AssetOrigin, ModelAsset};
use crate::traits::{DrawItem, DrawList, GraphicsDevice};
use crate::types::MaterialData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// The root is animated once a model (or its fallback) is in place
    pub fn is_animatable(&self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadState::NotStarted => "idle",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "fallback",
        }
    }
}

struct StagedMesh {
    geometry: ResourceId,
    material: ResourceId,
    local: Mat4,
}

struct AttachedModel {
    origin: AssetOrigin,
    meshes: Vec<StagedMesh>,
    materials: Vec<ResourceId>,
}

impl AttachedModel {
    fn resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.meshes
            .iter()
            .map(|m| m.geometry)
            .chain(self.materials.iter().copied())
    }
}

pub struct Stage<D: GraphicsDevice> {
    device: D,
    ledger: SharedLedger,
    context: ResourceId,
    viewport: Viewport,
    camera: Camera,
    lights: LightRig,
    clear_color: [f32; 3],
    step: AnimationStep,
    root: Transform,
    model: Option<AttachedModel>,
    load_state: LoadState,
    ticket: Option<LoadTicket>,
    disposed: bool,
}

impl<D: GraphicsDevice> Stage<D> {
    /// Create the rendering context and show the loading placeholder
    pub fn mount(device: D, ledger: SharedLedger, config: &ShowcaseConfig, viewport: Viewport) -> Result<Self> {
        let context = ledger.borrow_mut().allocate(ResourceKind::Context);
        let mut device = device;
        if let Err(e) = device.create_context(context, viewport) {
            ledger.borrow_mut().release(context);
            return Err(e.context("Failed to create rendering context"));
        }

        let mut stage = Self {
            device,
            ledger,
            context,
            viewport,
            camera: config.camera,
            lights: config.lights,
            clear_color: config.clear_color,
            step: AnimationStep::new(config.motion),
            root: Transform::IDENTITY,
            model: None,
            load_state: LoadState::NotStarted,
            ticket: None,
            disposed: false,
        };
        stage
            .attach(loading_placeholder())
            .context("Failed to upload loading placeholder")?;
        log::info!("Stage mounted at {}x{}", viewport.width, viewport.height);
        Ok(stage)
    }

    /// Record the request whose result this stage is waiting for
    pub fn begin_load(&mut self, ticket: LoadTicket) {
        self.ticket = Some(ticket);
        self.load_state = LoadState::Loading;
    }

    pub fn ticket(&self) -> Option<LoadTicket> {
        self.ticket
    }

    /// Attach the result of `ticket`. Results for any other ticket are ignored.
    pub fn resolve(&mut self, ticket: LoadTicket, resolution: Resolution) -> Result<bool> {
        if self.disposed || self.ticket != Some(ticket) {
            log::debug!("Ignoring result for load #{}", ticket.generation());
            return Ok(false);
        }
        self.ticket = None;
        let failed = resolution.is_failure();
        let asset = resolution.into_asset();
        log::info!("Attaching model from {}", asset.origin.label());
        self.attach(asset)?;
        self.load_state = if failed { LoadState::Failed } else { LoadState::Loaded };
        Ok(true)
    }

    /// Upload `asset` and swap it in for the current model, which is released
    fn attach(&mut self, asset: ModelAsset) -> Result<()> {
        let mut staged = AttachedModel {
            origin: asset.origin.clone(),
            meshes: Vec::new(),
            materials: Vec::new(),
        };
        if let Err(e) = self.upload(&asset, &mut staged) {
            self.release_model(staged);
            return Err(e);
        }
        if let Some(previous) = self.model.replace(staged) {
            self.release_model(previous);
        }
        Ok(())
    }

    fn upload(&mut self, asset: &ModelAsset, staged: &mut AttachedModel) -> Result<()> {
        let default_material;
        let materials: &[MaterialData] = if asset.materials.is_empty() {
            default_material = [MaterialData::rgb("default", [0.8, 0.8, 0.8])];
            &default_material
        } else {
            &asset.materials
        };

        for material in materials {
            let id = self.ledger.borrow_mut().allocate(ResourceKind::Material);
            if let Err(e) = self.device.upload_material(id, material) {
                self.ledger.borrow_mut().release(id);
                return Err(e.context(format!("Failed to upload material '{}'", material.name)));
            }
            staged.materials.push(id);
        }

        let mut parts = Vec::new();
        asset.root.visit(Mat4::IDENTITY, &mut |node, world| {
            if let Some(part) = node.kind.mesh_part() {
                if !part.mesh.is_empty() {
                    parts.push((part, world));
                }
            }
        });

        for (part, local) in parts {
            let id = self.ledger.borrow_mut().allocate(ResourceKind::Geometry);
            if let Err(e) = self.device.upload_geometry(id, &part.mesh) {
                self.ledger.borrow_mut().release(id);
                return Err(e.context("Failed to upload geometry"));
            }
            let index = part.material.min(staged.materials.len() - 1);
            staged.meshes.push(StagedMesh {
                geometry: id,
                material: staged.materials[index],
                local,
            });
        }
        Ok(())
    }

    fn release(&mut self, id: ResourceId) {
        if self.ledger.borrow_mut().release(id) {
            self.device.release(id);
        }
    }

    fn release_model(&mut self, model: AttachedModel) {
        let ids: Vec<ResourceId> = model.resource_ids().collect();
        for id in ids {
            self.release(id);
        }
    }

    /// Write the root pose for `progress`. No-op until a model is resolved.
    pub fn animate(&mut self, progress: f32, frame: &FrameInfo) -> bool {
        if self.disposed || !self.load_state.is_animatable() {
            return false;
        }
        self.step.apply(progress, frame, Some(&mut self.root))
    }

    pub fn draw_list(&self) -> DrawList {
        let root = self.root.matrix();
        let items = self
            .model
            .iter()
            .flat_map(|m| m.meshes.iter())
            .map(|mesh| DrawItem {
                geometry: mesh.geometry,
                material: mesh.material,
                model: root * mesh.local,
            })
            .collect();
        DrawList {
            camera: self.camera.to_uniform(self.viewport),
            lights: self.lights.to_uniform(),
            clear_color: self.clear_color,
            items,
        }
    }

    pub fn draw(&mut self) -> Result<()> {
        if self.disposed || self.viewport.is_empty() {
            return Ok(());
        }
        let list = self.draw_list();
        self.device.draw(&list)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.disposed || viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.device.resize(viewport);
    }

    /// Release the model and the context. Returns false if already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            log::debug!("Stage already disposed");
            return false;
        }
        self.disposed = true;
        self.ticket = None;
        if let Some(model) = self.model.take() {
            self.release_model(model);
        }
        let context = self.context;
        self.release(context);
        log::info!("Stage disposed");
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of model roots attached under the stage (0 or 1)
    pub fn root_count(&self) -> usize {
        usize::from(self.model.is_some())
    }

    pub fn attached_origin(&self) -> Option<&AssetOrigin> {
        self.model.as_ref().map(|m| &m.origin)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn root_transform(&self) -> Transform {
        self.root
    }

    pub fn mesh_count(&self) -> usize {
        self.model.as_ref().map_or(0, |m| m.meshes.len())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: GraphicsDevice> Drop for Stage<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<D: GraphicsDevice> std::fmt::Debug for Stage<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("viewport", &self.viewport)
            .field("load_state", &self.load_state)
            .field("meshes", &self.mesh_count())
            .field("disposed", &self.disposed)
            .finish()
    }
}
