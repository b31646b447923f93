mod fallback;
mod graph;
mod primitives;

pub use fallback::{fallback_character, loading_placeholder};
pub use graph::{AssetOrigin, MeshPart, ModelAsset, NodeKind, SceneNode};
pub use primitives::{cone, cuboid, torus, uv_sphere};
