// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scroll-showcase")]
#[command(about = "Scroll-driven 3D character showcase", long_about = None)]
pub struct Cli {
    /// glTF/GLB model to show
    #[arg(long)]
    pub asset: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the 3D stage and show the static poster
    #[arg(long = "reduced-motion", default_value = "false")]
    pub reduced_motion: bool,

    /// Document height in viewport heights
    #[arg(long)]
    pub pages: Option<f32>,

    /// Give up on the model after this many milliseconds
    #[arg(long = "load-timeout-ms")]
    pub load_timeout_ms: Option<u64>,

    /// Hide the debug panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "scroll-showcase",
            "--asset",
            "model.glb",
            "--reduced-motion",
            "--pages",
            "5",
            "--load-timeout-ms",
            "250",
            "--no-ui",
        ])
        .unwrap();
        assert_eq!(cli.asset, Some(PathBuf::from("model.glb")));
        assert!(cli.reduced_motion);
        assert_eq!(cli.pages, Some(5.0));
        assert_eq!(cli.load_timeout_ms, Some(250));
        assert!(cli.no_ui);
        assert!(cli.config.is_none());
    }

    #[test]
    fn defaults_are_empty() {
        let cli = Cli::try_parse_from(["scroll-showcase"]).unwrap();
        assert!(!cli.reduced_motion);
        assert!(!cli.no_ui);
        assert!(cli.asset.is_none());
    }
}
