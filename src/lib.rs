pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod gpu;
pub mod loaders;
pub mod overlay;
pub mod scenes;
pub mod traits;
pub mod types;

pub use config::ShowcaseConfig;
pub use core::{LoadState, Showcase, Stage};
pub use error::LoadError;
