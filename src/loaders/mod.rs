pub mod asset;
pub mod gltf;

pub use asset::{AssetLoader, AssetRequest, Fetcher, LoadTicket, Resolution};
pub use gltf::load_model;
