//! Runtime configuration: JSON file, then CLI overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, LightRig};
use crate::cli::Cli;
use crate::core::{MotionCurve, ScrollSettings, Transform};
use crate::traits::FixedPreference;

pub const DEFAULT_ASSET: &str = "assets/ziggs.glb";

/// One narrative block of the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
    /// Title color; plain white when absent
    #[serde(default)]
    pub accent: Option<[u8; 3]>,
}

impl Section {
    pub fn new(title: &str, body: &str, accent: Option<[u8; 3]>) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            accent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub sections: Vec<Section>,
    pub show_debug: bool,
    pub poster_title: String,
    pub poster_subtitle: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                Section::new(
                    "Meet Ziggs",
                    "Ziggs is a yordle with a love for big explosions. Scroll to learn how he went \
                     from a lonely inventor to Piltover's most notorious demolitions expert.",
                    None,
                ),
                Section::new(
                    "The Spark",
                    "One late night in his workshop, Ziggs perfected the Hexplosive Charge. The \
                     device was small, elegant, and packed with enough punch to level a city block. \
                     His maniacal laughter echoed through the laboratory as sparks flew and beakers \
                     bubbled with dangerous concoctions.",
                    Some([0xFF, 0xD7, 0x00]),
                ),
                Section::new(
                    "Going Pro",
                    "Armed with his arsenal of explosive devices, Ziggs joined forces with \
                     Heimerdinger to defend Piltover Academy. His unorthodox methods and explosive \
                     personality made him both a valuable ally and a constant source of property \
                     damage insurance claims.",
                    Some([0xFF, 0x6B, 0x6B]),
                ),
            ],
            show_debug: true,
            poster_title: "Meet Ziggs".to_string(),
            poster_subtitle: "3D animations disabled due to motion preferences".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub asset: PathBuf,
    /// Pose baked under the animated root
    pub base_pose: Transform,
    pub camera: Camera,
    pub lights: LightRig,
    pub scroll: ScrollSettings,
    pub motion: MotionCurve,
    pub overlay: OverlayConfig,
    pub load_timeout_ms: u64,
    /// `None` defers to the environment
    pub reduced_motion: Option<bool>,
    pub clear_color: [f32; 3],
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            asset: PathBuf::from(DEFAULT_ASSET),
            base_pose: default_base_pose(),
            camera: Camera::default(),
            lights: LightRig::default(),
            scroll: ScrollSettings::default(),
            motion: MotionCurve::default(),
            overlay: OverlayConfig::default(),
            load_timeout_ms: 10_000,
            reduced_motion: None,
            clear_color: [0.118, 0.118, 0.118],
        }
    }
}

/// Small offset and tilt that center the character in frame
fn default_base_pose() -> Transform {
    Transform {
        position: Vec3::new(-0.021, -0.01, 0.0),
        rotation: Vec3::new(0.0, 0.0, -0.044),
        scale: Vec3::splat(1.5),
    }
}

impl ShowcaseConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid showcase configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("While parsing {}", path.display()))
    }

    /// Config file named by `--config` (or defaults), with the remaining flags applied on top
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(asset) = &cli.asset {
            self.asset = asset.clone();
        }
        if let Some(pages) = cli.pages {
            self.scroll.pages = pages;
        }
        if let Some(ms) = cli.load_timeout_ms {
            self.load_timeout_ms = ms;
        }
        if cli.reduced_motion {
            self.reduced_motion = Some(true);
        }
        if cli.no_ui {
            self.overlay.show_debug = false;
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn motion_preference(&self) -> FixedPreference {
        FixedPreference {
            name: "config",
            value: self.reduced_motion,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
