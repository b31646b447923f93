use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use scroll_showcase::cli::Cli;
use scroll_showcase::core::{Phases, ScrollSettings};
use scroll_showcase::traits::MotionPreference;
use scroll_showcase::ShowcaseConfig;

#[test]
fn defaults_describe_the_showcase() {
    let config = ShowcaseConfig::default();
    assert_eq!(config.asset, PathBuf::from("assets/ziggs.glb"));
    assert_eq!(config.scroll, ScrollSettings::default());
    assert_eq!(config.load_timeout(), Duration::from_secs(10));
    assert_eq!(config.camera.fov_degrees, 45.0);
    assert_eq!(config.base_pose.scale.x, 1.5);
    assert_eq!(config.overlay.sections[1].accent, Some([0xFF, 0xD7, 0x00]));
    assert_eq!(config.motion_preference().prefers_reduced_motion(), None);
}

#[test]
fn file_then_flags() {
    let dir = std::env::temp_dir().join(format!("scroll-showcase-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("showcase.json");
    std::fs::write(
        &file,
        r#"{
            "asset": "from-file.glb",
            "scroll": { "pages": 4 },
            "motion": { "turns": 1, "phases": { "spin": { "start": 0.0, "end": 0.5 } } },
            "reduced_motion": false
        }"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "scroll-showcase",
        "--config",
        file.to_str().unwrap(),
        "--pages",
        "6",
        "--reduced-motion",
    ])
    .unwrap();
    let config = ShowcaseConfig::resolve(&cli).unwrap();

    assert_eq!(config.asset, PathBuf::from("from-file.glb"));
    assert_eq!(config.scroll.pages, 6.0);
    assert_eq!(config.motion.turns, 1.0);
    assert_eq!(config.motion.phases.spin.end, 0.5);
    assert_eq!(config.motion.phases.hop, Phases::full_range().hop);
    assert_eq!(config.motion_preference().prefers_reduced_motion(), Some(true));
}

#[test]
fn unreadable_config_is_an_error() {
    let cli = Cli::try_parse_from(["scroll-showcase", "--config", "no/such/file.json"]).unwrap();
    let err = ShowcaseConfig::resolve(&cli).unwrap_err();
    assert!(format!("{:#}", err).contains("no/such/file.json"));
}
